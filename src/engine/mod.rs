use std::collections::{BTreeMap, HashSet};

use tracing::info;

use crate::config::GameConfig;
use crate::constants::PLAYER_ID_PREFIX;
use crate::palette::ColorPalette;
use crate::rng::GameRng;
use crate::types::{
    CatchEvent, JoinedPlayer, PlayerView, Role, Rotation, Snapshot, TickReport, Vec2,
};
use crate::world::Arena;

mod collision_system;
mod rotation_system;
mod spawn_system;
mod utils;

use self::utils::{distance, PairKey};

/// The shared world: players, round timer, high score and the set of
/// cat/mouse pairs currently touching.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: GameConfig,

    arena: Arena,
    rng: GameRng,
    palette: ColorPalette,
    players: BTreeMap<String, PlayerView>,
    active_pairs: HashSet<PairKey>,

    timer: f64,
    high_score: u32,
    high_score_color: String,
    next_player_seq: u64,
    tick_counter: u64,
}

impl GameEngine {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, GameRng::new(seed))
    }

    pub fn with_rng(config: GameConfig, rng: GameRng) -> Self {
        Self {
            arena: Arena::from_config(&config),
            timer: config.round_seconds,
            config,
            rng,
            palette: ColorPalette::default(),
            players: BTreeMap::new(),
            active_pairs: HashSet::new(),
            high_score: 0,
            high_score_color: String::new(),
            next_player_seq: 0,
            tick_counter: 0,
        }
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// One broadcast tick: collision sweep, timer countdown, then role
    /// rotation if the round ran out.
    pub fn step(&mut self) -> TickReport {
        self.tick_counter += 1;
        let catches = self.sweep_collisions();
        let timer_expired = self.advance_timer();
        let rotation = if timer_expired {
            self.rotate_roles()
        } else {
            None
        };

        TickReport {
            catches,
            timer_expired,
            rotation,
        }
    }

    /// Returns true when the round expired; the timer is already reset.
    pub fn advance_timer(&mut self) -> bool {
        self.timer -= self.config.timer_step();
        if self.timer <= 0.0 {
            self.timer = self.config.round_seconds;
            return true;
        }
        false
    }

    /// Applies a movement intent. Each axis is reduced to its sign, scaled by
    /// the player speed, and dropped if it would leave the arena.
    pub fn apply_move(&mut self, player_id: &str, dir_x: i64, dir_y: i64) -> bool {
        let Some(player) = self.players.get_mut(player_id) else {
            return false;
        };
        let speed = self.config.player_speed;
        let next = self.arena.step(
            Vec2 {
                x: player.x,
                y: player.y,
            },
            Vec2 {
                x: dir_x.signum() as f32 * speed,
                y: dir_y.signum() as f32 * speed,
            },
        );
        player.x = next.x;
        player.y = next.y;
        true
    }

    pub fn build_snapshot(&self) -> Snapshot {
        Snapshot {
            players: self.players.clone(),
            timer: self.timer,
            high_score: self.high_score,
            high_score_color: self.high_score_color.clone(),
        }
    }

    pub fn cat_id(&self) -> Option<String> {
        self.players
            .values()
            .find(|player| player.role == Role::Cat)
            .map(|player| player.id.clone())
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerView> {
        self.players.get(player_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.contains_key(player_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn players(&self) -> impl Iterator<Item = &PlayerView> {
        self.players.values()
    }

    pub fn timer(&self) -> f64 {
        self.timer
    }

    pub fn high_score(&self) -> (u32, &str) {
        (self.high_score, &self.high_score_color)
    }

    pub fn tick_counter(&self) -> u64 {
        self.tick_counter
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{GameConfig, SpawnPolicy};
    use crate::engine::GameEngine;
    use crate::rng::GameRng;
    use crate::types::Role;

    fn make_engine(spawn: SpawnPolicy) -> GameEngine {
        GameEngine::new(
            GameConfig {
                spawn,
                ..GameConfig::default()
            },
            424_242,
        )
    }

    fn place(engine: &mut GameEngine, id: &str, x: f32, y: f32) {
        let player = engine.players.get_mut(id).expect("player exists");
        player.x = x;
        player.y = y;
    }

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn cat_count(engine: &GameEngine) -> usize {
        engine.players().filter(|p| p.role == Role::Cat).count()
    }

    #[test]
    fn first_player_is_cat_and_later_players_are_mice() {
        let mut engine = make_engine(SpawnPolicy::default());
        let first = engine.join();
        let second = engine.join();
        let third = engine.join();
        assert_eq!(first.role, Role::Cat);
        assert_eq!(second.role, Role::Mouse);
        assert_eq!(third.role, Role::Mouse);
        assert_eq!(first.id, "Player-1");
        assert_eq!(third.id, "Player-3");
    }

    #[test]
    fn player_ids_are_never_reused() {
        let mut engine = make_engine(SpawnPolicy::default());
        engine.join();
        let second = engine.join();
        engine.leave(&second.id);
        assert_eq!(engine.join().id, "Player-3");
    }

    #[test]
    fn leaving_twice_is_a_no_op() {
        let mut engine = make_engine(SpawnPolicy::default());
        let player = engine.join();
        assert!(engine.leave(&player.id).is_some());
        assert!(engine.leave(&player.id).is_none());
        assert_eq!(engine.player_count(), 0);
        assert_eq!(engine.palette.in_use(), 0);
    }

    #[test]
    fn cat_leaving_frees_the_role_for_next_join() {
        let mut engine = make_engine(SpawnPolicy::default());
        let cat = engine.join();
        let mouse = engine.join();
        engine.leave(&cat.id);
        assert_eq!(engine.cat_id(), None);

        let next = engine.join();
        assert_eq!(next.role, Role::Cat);
        assert_eq!(engine.player(&mouse.id).map(|p| p.role), Some(Role::Mouse));
    }

    #[test]
    fn rotation_promotes_a_mouse_when_cat_has_left() {
        let mut engine = make_engine(SpawnPolicy::default());
        let cat = engine.join();
        let mouse = engine.join();
        engine.leave(&cat.id);

        let rotation = engine.rotate_roles().expect("mouse should be promoted");
        assert_eq!(rotation.previous_cat, None);
        assert_eq!(rotation.new_cat, mouse.id);
        assert_eq!(engine.cat_id(), Some(mouse.id));
    }

    #[test]
    fn spawn_positions_follow_policy() {
        let mut engine = make_engine(SpawnPolicy::Center);
        let joined = engine.join();
        assert_eq!(joined.position.x, 640.0);
        assert_eq!(joined.position.y, 360.0);

        let mut engine = make_engine(SpawnPolicy::Random { padding: 50.0 });
        for _ in 0..20 {
            let joined = engine.join();
            assert!((50.0..1230.0).contains(&joined.position.x));
            assert!((50.0..670.0).contains(&joined.position.y));
        }
    }

    #[test]
    fn moves_apply_speed_per_axis_including_diagonals() {
        let mut engine = make_engine(SpawnPolicy::Center);
        let player = engine.join();
        assert!(engine.apply_move(&player.id, 1, -1));
        let view = engine.player(&player.id).expect("player");
        assert_eq!((view.x, view.y), (645.0, 355.0));

        assert!(engine.apply_move(&player.id, 7, 0));
        let view = engine.player(&player.id).expect("player");
        assert_eq!((view.x, view.y), (650.0, 355.0));
    }

    #[test]
    fn move_for_unknown_player_is_ignored() {
        let mut engine = make_engine(SpawnPolicy::Center);
        assert!(!engine.apply_move("Player-99", 1, 1));
    }

    #[test]
    fn out_of_bounds_axis_is_dropped_not_clamped() {
        let mut engine = make_engine(SpawnPolicy::Center);
        let player = engine.join();
        place(&mut engine, &player.id, 1278.0, 2.0);
        engine.apply_move(&player.id, 1, -1);
        let view = engine.player(&player.id).expect("player");
        assert_eq!((view.x, view.y), (1278.0, 2.0));
    }

    #[test]
    fn positions_stay_in_bounds_for_any_move_sequence() {
        let mut engine = make_engine(SpawnPolicy::default());
        let ids: Vec<String> = (0..4).map(|_| engine.join().id).collect();
        let mut script = GameRng::new(9);
        for _ in 0..5_000 {
            for id in &ids {
                let dx = script.pick_index(3) as i64 - 1;
                let dy = script.pick_index(3) as i64 - 1;
                engine.apply_move(id, dx, dy);
            }
            engine.step();
            for player in engine.players() {
                assert!((0.0..=1280.0).contains(&player.x));
                assert!((0.0..=720.0).contains(&player.y));
            }
        }
    }

    #[test]
    fn catch_fires_once_per_proximity_interval() {
        let mut engine = make_engine(SpawnPolicy::default());
        let cat = engine.join().id;
        let mouse = engine.join().id;
        place(&mut engine, &cat, 100.0, 100.0);
        place(&mut engine, &mouse, 165.0, 100.0);
        engine.timer = 3.0;

        engine.apply_move(&mouse, -1, 0);
        assert!(engine.step().catches.is_empty(), "distance 60 is not in range");

        engine.apply_move(&mouse, -1, 0);
        let report = engine.step();
        assert_eq!(report.catches.len(), 1);
        assert_eq!(report.catches[0].cat_id, cat);
        assert_eq!(report.catches[0].mouse_id, mouse);
        assert_eq!(engine.player(&cat).map(|p| p.move_counter), Some(1));
        assert!(approx_eq(engine.timer(), 7.0 - 0.03));
        let relocated = engine.player(&mouse).expect("mouse");
        assert_ne!((relocated.x, relocated.y), (155.0, 100.0));

        // back in range before the pair was ever observed apart
        place(&mut engine, &mouse, 120.0, 100.0);
        assert!(engine.step().catches.is_empty());
        assert!(engine.step().catches.is_empty());
        assert_eq!(engine.player(&cat).map(|p| p.move_counter), Some(1));

        place(&mut engine, &mouse, 400.0, 100.0);
        assert!(engine.step().catches.is_empty());
        assert_eq!(engine.active_pair_count(), 0);

        place(&mut engine, &mouse, 120.0, 100.0);
        assert_eq!(engine.step().catches.len(), 1);
        assert_eq!(engine.player(&cat).map(|p| p.move_counter), Some(2));
    }

    #[test]
    fn respawn_inside_range_does_not_refire() {
        let mut engine = make_engine(SpawnPolicy::Center);
        let cat = engine.join().id;
        engine.join();
        assert_eq!(engine.step().catches.len(), 1);
        for _ in 0..10 {
            assert!(engine.step().catches.is_empty());
        }
        assert_eq!(engine.player(&cat).map(|p| p.move_counter), Some(1));
    }

    #[test]
    fn mice_touching_each_other_never_score() {
        let mut engine = make_engine(SpawnPolicy::Center);
        let cat = engine.join().id;
        let a = engine.join().id;
        let b = engine.join().id;
        place(&mut engine, &cat, 10.0, 10.0);
        place(&mut engine, &a, 500.0, 500.0);
        place(&mut engine, &b, 505.0, 500.0);
        assert!(engine.step().catches.is_empty());
        assert_eq!(engine.active_pair_count(), 0);
    }

    #[test]
    fn departed_player_pairs_are_pruned_on_next_sweep() {
        let mut engine = make_engine(SpawnPolicy::Center);
        engine.join();
        let mouse = engine.join().id;
        engine.step();
        assert_eq!(engine.active_pair_count(), 1);
        engine.leave(&mouse);
        engine.step();
        assert_eq!(engine.active_pair_count(), 0);
    }

    #[test]
    fn timer_stays_within_one_tick_of_zero_and_full() {
        let mut engine = make_engine(SpawnPolicy::default());
        engine.join();
        engine.join();
        let mut expirations = 0;
        for _ in 0..2_000 {
            if engine.step().timer_expired {
                expirations += 1;
                assert!(approx_eq(engine.timer(), 7.0));
            }
            assert!(engine.timer() > -0.03 && engine.timer() <= 7.0);
        }
        assert!(expirations >= 7);
    }

    #[test]
    fn solo_cat_keeps_role_when_timer_expires() {
        let mut engine = make_engine(SpawnPolicy::default());
        let cat = engine.join().id;
        engine.players.get_mut(&cat).expect("cat").move_counter = 2;
        engine.timer = 0.01;

        let report = engine.step();
        assert!(report.timer_expired);
        assert_eq!(report.rotation, None);
        assert!(approx_eq(engine.timer(), 7.0));
        let view = engine.player(&cat).expect("cat");
        assert_eq!(view.role, Role::Cat);
        assert_eq!(view.move_counter, 2);
        assert_eq!(engine.high_score().0, 0);
    }

    #[test]
    fn expiry_records_high_score_and_swaps_roles() {
        let mut engine = make_engine(SpawnPolicy::default());
        let cat = engine.join().id;
        let mouse = engine.join().id;
        place(&mut engine, &cat, 100.0, 100.0);
        place(&mut engine, &mouse, 900.0, 600.0);
        engine.players.get_mut(&cat).expect("cat").move_counter = 3;
        engine.high_score = 1;
        engine.high_score_color = "blue".to_string();
        engine.timer = 0.01;
        let cat_color = engine.player(&cat).expect("cat").color.clone();

        let report = engine.step();
        let rotation = report.rotation.expect("rotation should happen");
        assert_eq!(rotation.previous_cat.as_deref(), Some(cat.as_str()));
        assert_eq!(rotation.new_cat, mouse);
        assert_eq!(rotation.new_high_score, Some(3));
        assert_eq!(engine.high_score(), (3, cat_color.as_str()));

        let old_cat = engine.player(&cat).expect("old cat");
        assert_eq!((old_cat.role, old_cat.move_counter), (Role::Mouse, 0));
        let new_cat = engine.player(&mouse).expect("new cat");
        assert_eq!((new_cat.role, new_cat.move_counter), (Role::Cat, 0));
    }

    #[test]
    fn high_score_color_changes_only_on_strict_increase() {
        let mut engine = make_engine(SpawnPolicy::default());
        let cat = engine.join().id;
        engine.join();
        engine.players.get_mut(&cat).expect("cat").move_counter = 2;
        engine.high_score = 2;
        engine.high_score_color = "violet".to_string();

        let rotation = engine.rotate_roles().expect("rotation");
        assert_eq!(rotation.new_high_score, None);
        assert_eq!(engine.high_score(), (2, "violet"));
    }

    #[test]
    fn random_sessions_keep_a_single_cat() {
        let mut engine = make_engine(SpawnPolicy::default());
        let mut script = GameRng::new(77);
        let mut ids: Vec<String> = Vec::new();
        let mut best = 0;
        for _ in 0..3_000 {
            match script.pick_index(10) {
                0 => ids.push(engine.join().id),
                1 if !ids.is_empty() => {
                    let id = ids.remove(script.pick_index(ids.len()));
                    engine.leave(&id);
                }
                _ => {}
            }
            for id in &ids {
                let dx = script.pick_index(3) as i64 - 1;
                let dy = script.pick_index(3) as i64 - 1;
                engine.apply_move(id, dx, dy);
            }
            engine.step();
            assert!(cat_count(&engine) <= 1);
            assert!(engine.high_score().0 >= best);
            best = engine.high_score().0;
        }
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let run = || {
            let mut engine = make_engine(SpawnPolicy::default());
            for _ in 0..4 {
                engine.join();
            }
            let ids: Vec<String> = engine.players().map(|p| p.id.clone()).collect();
            for tick in 0..600 {
                for (idx, id) in ids.iter().enumerate() {
                    let dir = if (tick / 40 + idx) % 2 == 0 { 1 } else { -1 };
                    engine.apply_move(id, dir, -dir);
                }
                engine.step();
            }
            engine.build_snapshot()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn snapshot_uses_wire_field_names() {
        let mut engine = make_engine(SpawnPolicy::Center);
        let cat = engine.join();
        let value = serde_json::to_value(engine.build_snapshot()).expect("serialize");

        let player = &value["players"][cat.id.as_str()];
        assert_eq!(player["id"], cat.id.as_str());
        assert_eq!(player["x"], 640.0);
        assert_eq!(player["moveCounter"], 0);
        assert_eq!(player["role"], "cat");
        assert_eq!(player["color"], cat.color.as_str());
        assert_eq!(value["timer"], 7.0);
        assert_eq!(value["highScore"], 0);
        assert_eq!(value["highScoreColor"], "");
    }
}
