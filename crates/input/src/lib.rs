//! Input: keyboard and pointer triggers mapped to runner actions.
//!
//! # Invariants
//! - The session consumes [`Action`]s, never raw device events.
//! - Actions queue up between ticks and are applied in arrival order.

pub mod action;
mod queue;

pub use action::{Action, Key, Trigger};
pub use queue::{InputHandle, InputQueue};
