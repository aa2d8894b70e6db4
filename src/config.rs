use std::time::Duration;

use crate::constants::{
    ARENA_HEIGHT, ARENA_WIDTH, CATCH_DISTANCE, OUTBOUND_QUEUE, PLAYER_SPEED, ROUND_SECONDS,
    SPAWN_PADDING, TICK_MS,
};
use crate::error::ConfigError;

/// Where players appear on join and after being caught.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnPolicy {
    Center,
    /// Uniform point inset from every arena edge by `padding`.
    Random { padding: f32 },
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self::Random {
            padding: SPAWN_PADDING,
        }
    }
}

impl SpawnPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "center" => Some(Self::Center),
            "random" => Some(Self::default()),
            _ => None,
        }
    }
}

/// Game tunables. The presentation client must be configured with matching
/// arena size, speed and round length; none of these travel over the wire.
#[derive(Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub arena_width: f32,
    pub arena_height: f32,
    pub player_speed: f32,
    pub tick_ms: u64,
    pub round_seconds: f64,
    pub catch_distance: f32,
    pub spawn: SpawnPolicy,
    pub outbound_queue: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            player_speed: PLAYER_SPEED,
            tick_ms: TICK_MS,
            round_seconds: ROUND_SECONDS,
            catch_distance: CATCH_DISTANCE,
            spawn: SpawnPolicy::default(),
            outbound_queue: OUTBOUND_QUEUE,
        }
    }
}

impl GameConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Seconds removed from the round timer on every tick.
    pub fn timer_step(&self) -> f64 {
        self.tick_ms as f64 / 1000.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("arena_width", self.arena_width as f64)?;
        positive("arena_height", self.arena_height as f64)?;
        positive("player_speed", self.player_speed as f64)?;
        positive("tick_ms", self.tick_ms as f64)?;
        positive("round_seconds", self.round_seconds)?;
        positive("catch_distance", self.catch_distance as f64)?;
        positive("outbound_queue", self.outbound_queue as f64)?;

        if let SpawnPolicy::Random { padding } = self.spawn {
            if padding < 0.0
                || padding * 2.0 >= self.arena_width
                || padding * 2.0 >= self.arena_height
            {
                return Err(ConfigError::PaddingTooLarge {
                    padding,
                    width: self.arena_width,
                    height: self.arena_height,
                });
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}
