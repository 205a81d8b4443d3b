//! Persistence: the single high-score value, stored as JSON on disk.
//!
//! # Invariants
//! - Only one numeric value is persisted, under a fixed key.
//! - Read/write failures are reported to the caller; the session treats them
//!   as "no stored value".

mod store;

pub use store::{FileHighScoreStore, KeyValueFile, PersistError, STORE_FILE_NAME};

pub fn crate_info() -> &'static str {
    "joyrun-persist v0.1.0"
}
