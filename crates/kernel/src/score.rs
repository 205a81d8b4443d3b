//! High-score persistence port.
//!
//! The session reads the stored value once at construction and writes it
//! whenever a run beats it. Store failures never reach the player: the
//! session logs them and carries on as if nothing was stored.

use std::error::Error;
use std::fmt::Debug;

/// Fixed key the high score is stored under.
pub const HIGH_SCORE_KEY: &str = "pina-game-high-score";

pub type StoreResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Backing storage for the single persisted high score.
pub trait HighScoreStore: Debug {
    /// The stored value, or `None` when nothing has been stored yet.
    fn load(&self) -> StoreResult<Option<u32>>;

    fn save(&mut self, value: u32) -> StoreResult<()>;
}

/// Volatile store: lives only as long as the session.
#[derive(Debug, Default, Clone)]
pub struct InMemoryHighScore {
    value: Option<u32>,
}

impl InMemoryHighScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: u32) -> Self {
        Self { value: Some(value) }
    }
}

impl HighScoreStore for InMemoryHighScore {
    fn load(&self) -> StoreResult<Option<u32>> {
        Ok(self.value)
    }

    fn save(&mut self, value: u32) -> StoreResult<()> {
        self.value = Some(value);
        Ok(())
    }
}
