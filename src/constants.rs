pub const ARENA_WIDTH: f32 = 1280.0;
pub const ARENA_HEIGHT: f32 = 720.0;

pub const PLAYER_SPEED: f32 = 5.0;
pub const PLAYER_RADIUS: f32 = 30.0;
pub const CATCH_DISTANCE: f32 = PLAYER_RADIUS * 2.0;
pub const SPAWN_PADDING: f32 = 50.0;

pub const TICK_MS: u64 = 30;
pub const ROUND_SECONDS: f64 = 7.0;

pub const OUTBOUND_QUEUE: usize = 64;

pub const PLAYER_ID_PREFIX: &str = "Player";

pub const PALETTE: [&str; 7] = [
    "red", "orange", "yellow", "green", "blue", "indigo", "violet",
];
