use std::collections::BTreeMap;

use joyrun_common::EntityId;
use joyrun_kernel::{GameEvent, Obstacle};
use tracing::trace;

use crate::scene::{Scene, VisualHandle};

/// Mirrors the session's obstacles into a scene.
///
/// Driven only by session events and read-only obstacle state; it owns the
/// visuals it creates and disposes every one of them on despawn or teardown.
#[derive(Debug, Default)]
pub struct ObstacleVisuals {
    visuals: BTreeMap<EntityId, VisualHandle>,
}

impl ObstacleVisuals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visuals.is_empty()
    }

    pub fn handle(&self, id: EntityId) -> Option<VisualHandle> {
        self.visuals.get(&id).copied()
    }

    /// Create or remove visuals for spawn and despawn events.
    pub fn apply<S: Scene + ?Sized>(&mut self, events: &[GameEvent], scene: &mut S) {
        for event in events {
            match event {
                GameEvent::ObstacleSpawned {
                    id,
                    shape,
                    transform,
                } => {
                    let handle = scene.create_obstacle_visual(*shape);
                    scene.set_transform(handle, transform);
                    scene.attach(handle);
                    if let Some(old) = self.visuals.insert(*id, handle) {
                        scene.detach(old);
                        scene.dispose(old);
                    }
                    trace!(obstacle = %id.short(), handle = handle.0, "Obstacle visual created");
                }
                GameEvent::ObstacleDespawned { id, reason } => {
                    if let Some(handle) = self.visuals.remove(id) {
                        scene.detach(handle);
                        scene.dispose(handle);
                        trace!(obstacle = %id.short(), ?reason, "Obstacle visual disposed");
                    }
                }
                _ => {}
            }
        }
    }

    /// Copy current obstacle transforms onto their visuals.
    pub fn update<S: Scene + ?Sized>(&self, obstacles: &[Obstacle], scene: &mut S) {
        for obstacle in obstacles {
            if let Some(handle) = self.visuals.get(&obstacle.id) {
                scene.set_transform(*handle, &obstacle.transform());
            }
        }
    }

    /// Dispose every visual regardless of session state.
    pub fn teardown<S: Scene + ?Sized>(&mut self, scene: &mut S) {
        for (_, handle) in std::mem::take(&mut self.visuals) {
            scene.detach(handle);
            scene.dispose(handle);
        }
    }
}
