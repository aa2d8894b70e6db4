use super::*;

impl GameEngine {
    /// Hands the cat role to a random mouse. The outgoing cat's catches are
    /// checked against the high score before its counter is cleared.
    ///
    /// Without mice nothing changes. Without a cat (it disconnected) a random
    /// mouse is promoted so the round keeps a pursuer.
    pub fn rotate_roles(&mut self) -> Option<Rotation> {
        let mice: Vec<String> = self
            .players
            .values()
            .filter(|player| player.role == Role::Mouse)
            .map(|player| player.id.clone())
            .collect();
        if mice.is_empty() {
            return None;
        }

        let previous_cat = self.cat_id();
        let mut new_high_score = None;
        let outgoing = match previous_cat.as_deref() {
            Some(id) => self.players.get_mut(id),
            None => None,
        };
        if let Some(cat) = outgoing {
            if cat.move_counter > self.high_score {
                self.high_score = cat.move_counter;
                self.high_score_color = cat.color.clone();
                new_high_score = Some(cat.move_counter);
                info!(
                    score = cat.move_counter,
                    color = %cat.color,
                    "new high score"
                );
            }
            cat.role = Role::Mouse;
            cat.move_counter = 0;
        }

        let new_cat = mice[self.rng.pick_index(mice.len())].clone();
        if let Some(player) = self.players.get_mut(&new_cat) {
            player.role = Role::Cat;
            player.move_counter = 0;
        }
        info!(
            new_cat = %new_cat,
            previous_cat = previous_cat.as_deref().unwrap_or("-"),
            "cat role rotated"
        );

        Some(Rotation {
            previous_cat,
            new_cat,
            new_high_score,
        })
    }
}
