//! Shared types for the runner workspace.
//!
//! # Invariants
//! - Character profiles are static; consumers look them up by variant.

pub mod character;
pub mod types;

pub use character::{CharacterProfile, CharacterVariant, ModelFormat, UnknownVariant};
pub use types::{EntityId, Tint, Transform};
