//! Developer tooling: session inspector and event tallies.
//!
//! # Invariants
//! - Tools only read session state; they never mutate it.

mod inspector;

pub use inspector::{EventTally, ObstacleInfo, SessionInspector, SessionSummary, event_kind};
