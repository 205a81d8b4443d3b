use joyrun_common::{CharacterVariant, EntityId, Transform};
use serde::{Deserialize, Serialize};

use crate::session::GameStatus;
use crate::spawner::ShapeKind;

/// Why an obstacle left the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DespawnReason {
    /// Crossed the trailing cutoff behind the player.
    Expired,
    /// Discarded when a new episode started or the player retried.
    Cleared,
}

/// An event record produced by every session mutation.
///
/// Scene sync and tooling consume these; they never write session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    StatusChanged { from: GameStatus, to: GameStatus },
    CharacterSelected { variant: CharacterVariant },
    ObstacleSpawned {
        id: EntityId,
        shape: ShapeKind,
        transform: Transform,
    },
    ObstacleDespawned { id: EntityId, reason: DespawnReason },
    Scored { delta: u32, total: u32 },
    Jumped { jumps_remaining: u8 },
    Landed,
    Collided { obstacle: EntityId },
    HighScoreRaised { value: u32 },
}
