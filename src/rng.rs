use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng};

/// Seedable random source owned by the engine, so a fixed seed replays the
/// same spawns and rotations.
#[derive(Clone, Debug)]
pub struct GameRng {
    seed: u64,
    inner: StdRng,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            inner: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in `[min, max)`; `min` when the range is empty.
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..max)
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.inner.random_range(0..len)
    }
}
