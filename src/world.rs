use crate::config::{GameConfig, SpawnPolicy};
use crate::rng::GameRng;
use crate::types::Vec2;

/// Rectangular play field with inclusive bounds `[0, width] x [0, height]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    spawn: SpawnPolicy,
}

impl Arena {
    pub fn new(width: f32, height: f32, spawn: SpawnPolicy) -> Self {
        Self {
            width,
            height,
            spawn,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.arena_width, config.arena_height, config.spawn)
    }

    pub fn accepts_x(&self, x: f32) -> bool {
        (0.0..=self.width).contains(&x)
    }

    pub fn accepts_y(&self, y: f32) -> bool {
        (0.0..=self.height).contains(&y)
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        self.accepts_x(pos.x) && self.accepts_y(pos.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2 {
            x: self.width / 2.0,
            y: self.height / 2.0,
        }
    }

    pub fn spawn_point(&self, rng: &mut GameRng) -> Vec2 {
        match self.spawn {
            SpawnPolicy::Center => self.center(),
            SpawnPolicy::Random { padding } => Vec2 {
                x: rng.range_f32(padding, self.width - padding),
                y: rng.range_f32(padding, self.height - padding),
            },
        }
    }

    /// Moves `pos` by `step` per axis, dropping any axis update that would
    /// leave the arena. The dropped axis keeps its previous value.
    pub fn step(&self, pos: Vec2, step: Vec2) -> Vec2 {
        let x = pos.x + step.x;
        let y = pos.y + step.y;
        Vec2 {
            x: if self.accepts_x(x) { x } else { pos.x },
            y: if self.accepts_y(y) { y } else { pos.y },
        }
    }
}
