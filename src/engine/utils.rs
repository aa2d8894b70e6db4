use crate::types::PlayerView;

/// Unordered pair of player ids, stored with the smaller id first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) struct PairKey(String, String);

impl PairKey {
    pub(super) fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

pub(super) fn distance(a: &PlayerView, b: &PlayerView) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}
