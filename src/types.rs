use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Cat,
    Mouse,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cat => "cat",
            Self::Mouse => "mouse",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerView {
    pub id: String,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "moveCounter")]
    pub move_counter: u32,
    pub role: Role,
    pub color: String,
}

/// Full world state as broadcast to every client once per tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub players: BTreeMap<String, PlayerView>,
    pub timer: f64,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    #[serde(rename = "highScoreColor")]
    pub high_score_color: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct JoinedPlayer {
    pub id: String,
    pub role: Role,
    pub color: String,
    pub position: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchEvent {
    pub cat_id: String,
    pub mouse_id: String,
    pub catches: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Rotation {
    pub previous_cat: Option<String>,
    pub new_cat: String,
    pub new_high_score: Option<u32>,
}

/// What happened during one engine step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub catches: Vec<CatchEvent>,
    pub timer_expired: bool,
    pub rotation: Option<Rotation>,
}
