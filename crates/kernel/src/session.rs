use joyrun_common::CharacterVariant;
use serde::{Deserialize, Serialize};

use crate::collision::{self, Sweep};
use crate::config::SimConfig;
use crate::event::{DespawnReason, GameEvent};
use crate::physics::{BodyStep, PlayerBody};
use crate::score::HighScoreStore;
use crate::spawner::{Obstacle, ObstacleSpawner};

/// Externally observable session status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Loading,
    Ready,
    Playing,
    GameOver,
}

impl GameStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::GameOver => "gameover",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// The run-scoped aggregate and single source of truth for status, score and
/// high score.
///
/// All mutations go through named operations. Transitions that are not legal
/// from the current status are silent no-ops that return `false`.
#[derive(Debug)]
pub struct GameSession {
    config: SimConfig,
    status: GameStatus,
    score: u32,
    high_score: u32,
    selected: CharacterVariant,
    ducking: bool,
    body: PlayerBody,
    obstacles: Vec<Obstacle>,
    spawner: ObstacleSpawner,
    ground_scroll: f32,
    /// Frames simulated in the current episode.
    frame: u64,
    seed: u64,
    store: Box<dyn HighScoreStore>,
    /// Append-only event log, drained by consumers.
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Create a session in `Loading`, reading the persisted high score.
    pub fn new(config: SimConfig, seed: u64, store: Box<dyn HighScoreStore>) -> Self {
        let high_score = match store.load() {
            Ok(value) => value.unwrap_or(0),
            Err(e) => {
                tracing::warn!("high score unavailable, starting from 0: {e}");
                0
            }
        };
        tracing::debug!(high_score, seed, "session created");

        Self {
            body: PlayerBody::at_rest(config.max_jumps),
            spawner: ObstacleSpawner::new(seed),
            config,
            status: GameStatus::Loading,
            score: 0,
            high_score,
            selected: CharacterVariant::default(),
            ducking: false,
            obstacles: Vec::new(),
            ground_scroll: 0.0,
            frame: 0,
            seed,
            store,
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn selected_character(&self) -> CharacterVariant {
        self.selected
    }

    pub fn is_ducking(&self) -> bool {
        self.ducking
    }

    pub fn body(&self) -> &PlayerBody {
        &self.body
    }

    /// Live obstacles in spawn order.
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn ground_scroll(&self) -> f32 {
        self.ground_scroll
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Read-only access to the pending event log.
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// `Loading → Ready` once the selected character's asset has settled,
    /// whether it loaded or failed.
    pub fn mark_loaded(&mut self) -> bool {
        if self.status != GameStatus::Loading {
            return false;
        }
        self.set_status(GameStatus::Ready);
        true
    }

    /// `Ready → Playing`: fresh score, empty field, body at rest.
    pub fn start_game(&mut self) -> bool {
        if self.status != GameStatus::Ready {
            tracing::debug!(status = %self.status, "start ignored");
            return false;
        }
        self.reset_episode();
        self.set_status(GameStatus::Playing);
        true
    }

    /// `GameOver → Ready`. The loaded character is kept.
    pub fn restart(&mut self) -> bool {
        if self.status != GameStatus::GameOver {
            tracing::debug!(status = %self.status, "restart ignored");
            return false;
        }
        self.reset_episode();
        self.set_status(GameStatus::Ready);
        true
    }

    /// Change the selected character. Refused while playing. Returns whether
    /// the selection changed, in which case the caller reloads the rig.
    pub fn select_character(&mut self, variant: CharacterVariant) -> bool {
        if self.status == GameStatus::Playing || variant == self.selected {
            return false;
        }
        self.selected = variant;
        self.events.push(GameEvent::CharacterSelected { variant });
        tracing::info!(%variant, "character selected");
        true
    }

    /// Request a jump. Ignored unless playing and budget remains.
    pub fn jump(&mut self) -> bool {
        if self.status != GameStatus::Playing {
            return false;
        }
        if !self.body.jump(self.config.jump_impulse) {
            return false;
        }
        self.events.push(GameEvent::Jumped {
            jumps_remaining: self.body.jumps_remaining(),
        });
        true
    }

    pub fn set_ducking(&mut self, ducking: bool) {
        self.ducking = ducking;
    }

    /// Advance one frame.
    ///
    /// While playing: physics, ground scroll, spawn attempt, obstacle sweep
    /// (which may end the game). In every status: trailing cleanup.
    pub fn tick(&mut self) {
        let _span = tracing::info_span!("session_tick", frame = self.frame).entered();

        if self.status == GameStatus::Playing {
            self.step_playing();
        }

        for gone in collision::remove_expired(&mut self.obstacles, self.config.despawn_cutoff) {
            self.events.push(GameEvent::ObstacleDespawned {
                id: gone.id,
                reason: DespawnReason::Expired,
            });
        }
    }

    fn step_playing(&mut self) {
        self.frame += 1;

        if self.body.integrate(self.config.gravity) == BodyStep::Landed {
            self.events.push(GameEvent::Landed);
        }

        self.ground_scroll -= self.config.ground_scroll_speed;
        if self.ground_scroll < -self.config.ground_scroll_wrap {
            self.ground_scroll = 0.0;
        }

        if let Some(obstacle) = self.spawner.tick(self.frame, &self.obstacles, &self.config) {
            tracing::trace!(
                id = %obstacle.id.short(),
                shape = ?obstacle.shape,
                tall = obstacle.is_tall(),
                speed = obstacle.speed,
                "obstacle spawned"
            );
            self.events.push(GameEvent::ObstacleSpawned {
                id: obstacle.id,
                shape: obstacle.shape,
                transform: obstacle.transform(),
            });
            self.obstacles.push(obstacle);
            self.score += self.config.score_per_spawn;
            self.events.push(GameEvent::Scored {
                delta: self.config.score_per_spawn,
                total: self.score,
            });
        }

        let player = collision::player_center(self.body.vertical_position(), &self.config);
        if let Sweep::Contact(id) = collision::advance(&mut self.obstacles, player, &self.config) {
            self.events.push(GameEvent::Collided { obstacle: id });
            self.end_game();
        }
    }

    /// `Playing → GameOver`, raising and persisting the high score.
    fn end_game(&mut self) {
        if self.status != GameStatus::Playing {
            return;
        }
        self.set_status(GameStatus::GameOver);
        tracing::info!(score = self.score, frame = self.frame, "game over");

        if self.score > self.high_score {
            self.high_score = self.score;
            self.events.push(GameEvent::HighScoreRaised {
                value: self.high_score,
            });
            if let Err(e) = self.store.save(self.high_score) {
                tracing::warn!("failed to persist high score: {e}");
            }
        }
    }

    fn reset_episode(&mut self) {
        for obstacle in self.obstacles.drain(..) {
            self.events.push(GameEvent::ObstacleDespawned {
                id: obstacle.id,
                reason: DespawnReason::Cleared,
            });
        }
        self.body = PlayerBody::at_rest(self.config.max_jumps);
        self.spawner.reset();
        self.score = 0;
        self.frame = 0;
    }

    fn set_status(&mut self, to: GameStatus) {
        let from = self.status;
        self.status = to;
        self.events.push(GameEvent::StatusChanged { from, to });
        tracing::debug!(%from, %to, "status changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::{InMemoryHighScore, StoreResult};
    use crate::spawner::{SHORT, ShapeKind};
    use joyrun_common::EntityId;

    #[derive(Debug)]
    struct BrokenStore;

    impl HighScoreStore for BrokenStore {
        fn load(&self) -> StoreResult<Option<u32>> {
            Err("storage disabled".into())
        }

        fn save(&mut self, _value: u32) -> StoreResult<()> {
            Err("quota exceeded".into())
        }
    }

    fn session_with(seed: u64) -> GameSession {
        GameSession::new(SimConfig::default(), seed, Box::new(InMemoryHighScore::new()))
    }

    fn playing(seed: u64) -> GameSession {
        let mut s = session_with(seed);
        assert!(s.mark_loaded());
        assert!(s.start_game());
        s
    }

    fn force_obstacle(session: &mut GameSession, x: f32) -> EntityId {
        let obstacle = Obstacle {
            id: EntityId::new(),
            shape: ShapeKind::Box,
            x,
            y: session.config.obstacle_base_height,
            vertical_scale: SHORT,
            speed: 0.2,
            spawn_frame: session.frame,
            spin: 0.0,
        };
        let id = obstacle.id;
        session.obstacles.push(obstacle);
        id
    }

    fn force_contact(session: &mut GameSession) -> EntityId {
        let x = session.config.player_x;
        force_obstacle(session, x)
    }

    /// Jump whenever an obstacle is about to reach the player.
    fn autopilot(session: &mut GameSession) {
        let px = session.config.player_x;
        let threat = session
            .obstacles()
            .iter()
            .any(|o| o.x > px && o.x - px < 2.0 + o.speed * 8.0);
        if threat && session.body().is_grounded() {
            session.jump();
        }
    }

    #[test]
    fn lifecycle_happy_path() {
        let mut s = session_with(1);
        assert_eq!(s.status(), GameStatus::Loading);
        assert!(!s.start_game(), "cannot start while loading");
        assert!(s.mark_loaded());
        assert_eq!(s.status(), GameStatus::Ready);
        assert!(!s.mark_loaded());
        assert!(s.start_game());
        assert_eq!(s.status(), GameStatus::Playing);
        assert!(!s.start_game());
        assert!(!s.restart(), "restart only from game over");
    }

    #[test]
    fn jump_ignored_unless_playing() {
        let mut s = session_with(1);
        assert!(!s.jump());
        s.mark_loaded();
        assert!(!s.jump());
        assert_eq!(s.body().jumps_remaining(), 2);
    }

    #[test]
    fn ground_invariant_holds_every_frame() {
        let mut s = playing(9);
        for frame in 0..3000 {
            if frame % 17 == 0 {
                s.jump();
            }
            s.tick();
            if s.status() != GameStatus::Playing {
                break;
            }
            let body = s.body();
            assert!(body.vertical_position() >= 0.0);
            if body.vertical_position() == 0.0 {
                assert_eq!(body.vertical_velocity(), 0.0);
                assert_eq!(body.jumps_remaining(), s.config().max_jumps);
            }
        }
    }

    #[test]
    fn third_jump_before_landing_is_noop() {
        let mut s = playing(1);
        assert!(s.jump());
        s.tick();
        assert!(s.jump());
        s.tick();
        let velocity = s.body().vertical_velocity();
        assert!(!s.jump());
        assert_eq!(s.body().vertical_velocity(), velocity);
        assert_eq!(s.body().jumps_remaining(), 0);
    }

    #[test]
    fn first_spawn_in_expected_window() {
        let mut s = playing(123);
        let mut spawned = Vec::new();
        for _ in 0..200 {
            s.tick();
            for event in s.drain_events() {
                if let GameEvent::ObstacleSpawned { shape, .. } = event {
                    spawned.push((s.frame(), shape.index()));
                }
            }
        }
        assert_eq!(s.status(), GameStatus::Playing);
        assert!(!spawned.is_empty());
        for (frame, shape) in &spawned {
            assert!((130..=200).contains(frame), "spawned at frame {frame}");
            assert!(*shape < 3);
        }
        assert_eq!(spawned[0].0, 131);
    }

    #[test]
    fn score_moves_only_on_spawn() {
        let mut s = playing(77);
        let mut spawns = 0;
        let mut last_score = 0;
        for _ in 0..5000 {
            autopilot(&mut s);
            s.tick();
            for event in s.drain_events() {
                match event {
                    GameEvent::ObstacleSpawned { .. } => spawns += 1,
                    GameEvent::Scored { delta, .. } => assert_eq!(delta, 10),
                    _ => {}
                }
            }
            assert!(s.score() >= last_score);
            last_score = s.score();
            assert_eq!(s.score(), spawns * 10);
            if s.status() != GameStatus::Playing {
                break;
            }
        }
        assert!(spawns > 0);
    }

    #[test]
    fn spawn_respects_clearance() {
        let mut s = playing(5);
        let config = s.config().clone();
        for _ in 0..8000 {
            autopilot(&mut s);
            let previous_max = s.obstacles().iter().map(|o| o.x).reduce(f32::max);
            let before = s.obstacles().len();
            s.tick();
            if s.status() != GameStatus::Playing {
                break;
            }
            let spawned = s.obstacles().iter().any(|o| o.spawn_frame == s.frame());
            if spawned {
                assert!(s.obstacles().len() >= before);
                if let Some(x) = previous_max {
                    assert!(config.spawn_edge - x >= config.min_clearance);
                }
            }
        }
    }

    #[test]
    fn forced_contact_ends_game_on_that_frame() {
        let mut s = playing(1);
        let config = s.config().clone();
        // After advancing by 0.2 it sits 0.3 ahead of the player at ground level.
        let hit = force_obstacle(&mut s, config.player_x + 0.5);
        let bystander = force_obstacle(&mut s, 10.0);
        s.tick();

        assert_eq!(s.status(), GameStatus::GameOver);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::Collided { obstacle: hit }));
        let game_overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::StatusChanged { to: GameStatus::GameOver, .. }))
            .count();
        assert_eq!(game_overs, 1);

        let x_of = |s: &GameSession, id| s.obstacles().iter().find(|o| o.id == id).map(|o| o.x);
        assert_eq!(x_of(&s, bystander), Some(10.0));

        let frozen = x_of(&s, hit);
        s.tick();
        assert_eq!(x_of(&s, hit), frozen);
        assert_eq!(s.status(), GameStatus::GameOver);
    }

    #[test]
    fn high_score_is_max_of_previous_and_final() {
        let mut s = GameSession::new(
            SimConfig::default(),
            1,
            Box::new(InMemoryHighScore::with_value(50)),
        );
        assert_eq!(s.high_score(), 50);
        s.mark_loaded();

        s.start_game();
        s.score = 30;
        force_contact(&mut s);
        s.tick();
        assert_eq!(s.status(), GameStatus::GameOver);
        assert_eq!(s.high_score(), 50);

        s.restart();
        s.start_game();
        s.score = 70;
        force_contact(&mut s);
        s.tick();
        assert_eq!(s.high_score(), 70);
        assert_eq!(s.store.load().unwrap(), Some(70));
        assert!(s.events().contains(&GameEvent::HighScoreRaised { value: 70 }));
    }

    #[test]
    fn store_failures_are_swallowed() {
        let mut s = GameSession::new(SimConfig::default(), 1, Box::new(BrokenStore));
        assert_eq!(s.high_score(), 0);
        s.mark_loaded();
        s.start_game();
        s.score = 40;
        force_contact(&mut s);
        s.tick();
        assert_eq!(s.status(), GameStatus::GameOver);
        assert_eq!(s.high_score(), 40);
    }

    #[test]
    fn restart_then_start_round_trip() {
        let mut s = playing(3);
        for _ in 0..400 {
            s.tick();
            if s.status() == GameStatus::GameOver {
                break;
            }
        }
        if s.status() == GameStatus::Playing {
            force_contact(&mut s);
            s.tick();
        }
        assert_eq!(s.status(), GameStatus::GameOver);
        assert!(s.score() > 0 || !s.obstacles().is_empty());

        assert!(s.restart());
        assert_eq!(s.status(), GameStatus::Ready);
        assert!(s.obstacles().is_empty());
        assert_eq!(s.score(), 0);

        assert!(s.start_game());
        assert_eq!(s.score(), 0);
        assert!(s.obstacles().is_empty());
        assert_eq!(s.body().vertical_position(), 0.0);
        assert_eq!(s.body().jumps_remaining(), 2);
    }

    #[test]
    fn start_clears_previous_field_with_events() {
        let mut s = playing(3);
        let id = force_obstacle(&mut s, 5.0);
        force_contact(&mut s);
        s.tick();
        s.drain_events();
        s.restart();
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::ObstacleDespawned {
            id,
            reason: DespawnReason::Cleared
        }));
    }

    #[test]
    fn selection_refused_while_playing() {
        let mut s = session_with(1);
        assert!(s.select_character(CharacterVariant::Tako), "allowed while loading");
        assert!(!s.select_character(CharacterVariant::Tako), "unchanged selection");
        s.mark_loaded();
        assert!(s.select_character(CharacterVariant::Rabbit));
        assert_eq!(s.status(), GameStatus::Ready);
        s.start_game();
        assert!(!s.select_character(CharacterVariant::FanFan));
        assert_eq!(s.selected_character(), CharacterVariant::Rabbit);
    }

    #[test]
    fn expired_obstacles_are_removed() {
        let mut s = playing(1);
        let config = s.config().clone();
        let id = force_obstacle(&mut s, config.despawn_cutoff + 0.1);
        s.tick();
        assert!(s.obstacles().iter().all(|o| o.id != id));
        assert!(s.events().contains(&GameEvent::ObstacleDespawned {
            id,
            reason: DespawnReason::Expired
        }));
    }

    #[test]
    fn ground_scroll_wraps() {
        let mut s = playing(1);
        for _ in 0..12 {
            s.tick();
            assert!(s.ground_scroll() <= 0.0);
            assert!(s.ground_scroll() >= -s.config().ground_scroll_wrap);
        }
    }

    #[test]
    fn loading_and_ready_have_no_obstacles() {
        let mut s = session_with(8);
        for _ in 0..300 {
            s.tick();
        }
        assert!(s.obstacles().is_empty());
        s.mark_loaded();
        for _ in 0..300 {
            s.tick();
        }
        assert!(s.obstacles().is_empty());
    }
}
