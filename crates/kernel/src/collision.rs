//! Player/obstacle contact and trailing cleanup.

use glam::Vec2;
use joyrun_common::EntityId;

use crate::config::SimConfig;
use crate::spawner::Obstacle;

/// Outcome of advancing the obstacle field by one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// Every obstacle moved and none touched the player.
    Clear,
    /// The given obstacle touched the player. Obstacles after it in spawn
    /// order were not advanced this frame.
    Contact(EntityId),
}

/// Player center in the XY plane for a given jump height.
pub fn player_center(vertical_position: f32, config: &SimConfig) -> Vec2 {
    Vec2::new(config.player_x, vertical_position + config.ground_offset)
}

pub fn in_contact(obstacle: &Obstacle, player: Vec2, radius: f32) -> bool {
    Vec2::new(obstacle.x, obstacle.y).distance(player) < radius
}

/// Move each obstacle by its speed in spawn order, stopping at the first
/// contact.
pub fn advance(obstacles: &mut [Obstacle], player: Vec2, config: &SimConfig) -> Sweep {
    for obstacle in obstacles.iter_mut() {
        obstacle.x -= obstacle.speed;
        obstacle.spin += config.obstacle_spin;
        if in_contact(obstacle, player, config.contact_radius) {
            return Sweep::Contact(obstacle.id);
        }
    }
    Sweep::Clear
}

/// Remove obstacles that have passed the trailing cutoff, returning them in
/// spawn order.
pub fn remove_expired(obstacles: &mut Vec<Obstacle>, cutoff: f32) -> Vec<Obstacle> {
    let mut expired = Vec::new();
    let mut i = 0;
    while i < obstacles.len() {
        if obstacles[i].x < cutoff {
            expired.push(obstacles.remove(i));
        } else {
            i += 1;
        }
    }
    expired
}
