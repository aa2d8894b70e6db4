use std::collections::HashSet;

use crate::constants::PALETTE;
use crate::rng::GameRng;

/// Display colors checked out to players on join and returned on leave.
///
/// Once every color is taken the pool is forgotten and the first color is
/// handed out, so two live players may briefly share a color.
#[derive(Clone, Debug)]
pub struct ColorPalette {
    colors: Vec<String>,
    used: HashSet<String>,
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::new(PALETTE.iter().map(|color| color.to_string()).collect())
    }
}

impl ColorPalette {
    pub fn new(colors: Vec<String>) -> Self {
        Self {
            colors,
            used: HashSet::new(),
        }
    }

    pub fn checkout(&mut self, rng: &mut GameRng) -> String {
        let available: Vec<&String> = self
            .colors
            .iter()
            .filter(|color| !self.used.contains(*color))
            .collect();
        if available.is_empty() {
            self.used.clear();
            return self.colors.first().cloned().unwrap_or_default();
        }

        let color = available[rng.pick_index(available.len())].clone();
        self.used.insert(color.clone());
        color
    }

    pub fn release(&mut self, color: &str) {
        self.used.remove(color);
    }

    pub fn in_use(&self) -> usize {
        self.used.len()
    }
}
