use super::*;

impl GameEngine {
    /// Adds a new player. The first player to find the arena without a cat
    /// becomes the cat.
    pub fn join(&mut self) -> JoinedPlayer {
        self.next_player_seq += 1;
        let id = format!("{PLAYER_ID_PREFIX}-{}", self.next_player_seq);
        let role = if self.cat_id().is_some() {
            Role::Mouse
        } else {
            Role::Cat
        };
        let position = self.arena.spawn_point(&mut self.rng);
        let color = self.palette.checkout(&mut self.rng);

        self.players.insert(
            id.clone(),
            PlayerView {
                id: id.clone(),
                x: position.x,
                y: position.y,
                move_counter: 0,
                role,
                color: color.clone(),
            },
        );
        info!(player_id = %id, role = role.as_str(), %color, "player joined");

        JoinedPlayer {
            id,
            role,
            color,
            position,
        }
    }

    /// Removes a player and returns its color to the palette. Leaving as the
    /// cat frees the role. Unknown ids are a no-op.
    pub fn leave(&mut self, player_id: &str) -> Option<PlayerView> {
        let player = self.players.remove(player_id)?;
        self.palette.release(&player.color);
        info!(
            player_id = %player.id,
            role = player.role.as_str(),
            "player left"
        );
        Some(player)
    }

    pub(super) fn respawn(&mut self, player_id: &str) {
        let spawn = self.arena.spawn_point(&mut self.rng);
        if let Some(player) = self.players.get_mut(player_id) {
            player.x = spawn.x;
            player.y = spawn.y;
        }
    }
}
