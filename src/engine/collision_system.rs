use super::*;

impl GameEngine {
    /// Checks every unordered pair once. A cat/mouse pair scores only on the
    /// sweep where it enters range; it re-arms once it is seen out of range.
    pub fn sweep_collisions(&mut self) -> Vec<CatchEvent> {
        let ids: Vec<String> = self.players.keys().cloned().collect();
        let mut in_range: HashSet<PairKey> = HashSet::new();
        let mut catches = Vec::new();

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (Some(a), Some(b)) = (self.players.get(&ids[i]), self.players.get(&ids[j]))
                else {
                    continue;
                };
                let (cat_id, mouse_id) = match (a.role, b.role) {
                    (Role::Cat, Role::Mouse) => (&ids[i], &ids[j]),
                    (Role::Mouse, Role::Cat) => (&ids[j], &ids[i]),
                    _ => continue,
                };
                if distance(a, b) >= self.config.catch_distance {
                    continue;
                }

                let key = PairKey::new(&ids[i], &ids[j]);
                in_range.insert(key.clone());
                if self.active_pairs.insert(key) {
                    catches.push(self.score_catch(cat_id, mouse_id));
                }
            }
        }

        self.active_pairs.retain(|key| in_range.contains(key));
        catches
    }

    pub fn active_pair_count(&self) -> usize {
        self.active_pairs.len()
    }

    fn score_catch(&mut self, cat_id: &str, mouse_id: &str) -> CatchEvent {
        let catches = match self.players.get_mut(cat_id) {
            Some(cat) => {
                cat.move_counter += 1;
                cat.move_counter
            }
            None => 0,
        };
        self.respawn(mouse_id);
        self.timer = self.config.round_seconds;
        info!(cat_id, mouse_id, catches, "mouse caught");

        CatchEvent {
            cat_id: cat_id.to_string(),
            mouse_id: mouse_id.to_string(),
            catches,
        }
    }
}
