//! Runner kernel: authoritative session state, frame stepping, scoring.
//!
//! # Invariants
//! - All state mutations flow through named session operations.
//! - Simulation is frame-coupled; one `tick` is one rendered frame.
//! - `Loading` and `Ready` never hold live obstacles.
//! - Every mutation is recorded in the session event log.

pub mod collision;
pub mod config;
pub mod event;
pub mod physics;
pub mod score;
pub mod session;
pub mod spawner;

pub use config::{ConfigError, SimConfig};
pub use event::{DespawnReason, GameEvent};
pub use physics::{BodyStep, PlayerBody};
pub use score::{HIGH_SCORE_KEY, HighScoreStore, InMemoryHighScore, StoreResult};
pub use session::{GameSession, GameStatus};
pub use spawner::{Obstacle, ObstacleSpawner, ShapeKind};
