use std::collections::BTreeMap;
use std::fmt::Write;

use joyrun_assets::ModelData;
use joyrun_common::Transform;
use joyrun_kernel::ShapeKind;

use crate::scene::{ModelMaterial, ObstacleStyle, RenderView, Scene, VisualHandle};

#[derive(Debug, Clone, PartialEq)]
pub enum VisualKind {
    Model {
        name: String,
        triangles: usize,
        material: ModelMaterial,
    },
    Obstacle {
        shape: ShapeKind,
        style: ObstacleStyle,
    },
}

#[derive(Debug, Clone)]
pub struct VisualRecord {
    pub kind: VisualKind,
    pub transform: Transform,
    pub attached: bool,
}

/// Debug text scene, standing in for a GPU backend.
///
/// Keeps every live visual in handle order and renders a human-readable frame.
/// The counters make resource leaks observable in tests.
#[derive(Debug, Default)]
pub struct DebugScene {
    next_handle: u64,
    live: BTreeMap<VisualHandle, VisualRecord>,
    disposed: usize,
    frames: u64,
    surface_released: bool,
}

impl DebugScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, kind: VisualKind) -> VisualHandle {
        self.next_handle += 1;
        let handle = VisualHandle(self.next_handle);
        self.live.insert(
            handle,
            VisualRecord {
                kind,
                transform: Transform::default(),
                attached: false,
            },
        );
        handle
    }

    pub fn get(&self, handle: VisualHandle) -> Option<&VisualRecord> {
        self.live.get(&handle)
    }

    /// Visuals created and not yet disposed.
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn attached_count(&self) -> usize {
        self.live.values().filter(|v| v.attached).count()
    }

    pub fn disposed_count(&self) -> usize {
        self.disposed
    }

    pub fn is_attached(&self, handle: VisualHandle) -> bool {
        self.live.get(&handle).is_some_and(|v| v.attached)
    }

    /// Attached character models.
    pub fn attached_models(&self) -> Vec<VisualHandle> {
        self.live
            .iter()
            .filter(|(_, v)| v.attached && matches!(v.kind, VisualKind::Model { .. }))
            .map(|(h, _)| *h)
            .collect()
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames
    }

    pub fn surface_released(&self) -> bool {
        self.surface_released
    }
}

impl Scene for DebugScene {
    type Frame = String;

    fn create_model_visual(&mut self, model: &ModelData, material: ModelMaterial) -> VisualHandle {
        self.insert(VisualKind::Model {
            name: model.name.clone(),
            triangles: model.triangle_count(),
            material,
        })
    }

    fn create_obstacle_visual(&mut self, shape: ShapeKind) -> VisualHandle {
        self.insert(VisualKind::Obstacle {
            shape,
            style: ObstacleStyle::for_shape(shape),
        })
    }

    fn attach(&mut self, handle: VisualHandle) {
        if let Some(v) = self.live.get_mut(&handle) {
            v.attached = true;
        }
    }

    fn detach(&mut self, handle: VisualHandle) {
        if let Some(v) = self.live.get_mut(&handle) {
            v.attached = false;
        }
    }

    fn dispose(&mut self, handle: VisualHandle) {
        if self.live.remove(&handle).is_some() {
            self.disposed += 1;
        }
    }

    fn set_transform(&mut self, handle: VisualHandle, transform: &Transform) {
        if let Some(v) = self.live.get_mut(&handle) {
            v.transform = *transform;
        }
    }

    fn render(&mut self, view: &RenderView) -> String {
        if self.surface_released {
            return String::new();
        }
        self.frames += 1;

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame {} (visuals={}, attached={}) ===",
            self.frames,
            self.live.len(),
            self.attached_count()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0} bg={} ground={:.2}",
            view.eye.x,
            view.eye.y,
            view.eye.z,
            view.target.x,
            view.target.y,
            view.target.z,
            view.fov_degrees,
            view.background,
            view.ground_scroll
        );
        for (handle, v) in self.live.iter().filter(|(_, v)| v.attached) {
            let p = v.transform.position;
            let label = match &v.kind {
                VisualKind::Model { name, .. } => format!("model {name}"),
                VisualKind::Obstacle { shape, .. } => format!("{shape:?}").to_lowercase(),
            };
            let _ = writeln!(
                out,
                "  [{}] {label} pos=({:.2}, {:.2}, {:.2})",
                handle.0, p.x, p.y, p.z
            );
        }
        out
    }

    fn release_surface(&mut self) {
        self.surface_released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use joyrun_common::{ModelFormat, Tint};

    fn empty_model(name: &str) -> ModelData {
        ModelData {
            name: name.into(),
            format: ModelFormat::Mesh,
            meshes: Vec::new(),
            materials: Vec::new(),
        }
    }

    #[test]
    fn lifecycle_counts() {
        let mut scene = DebugScene::new();
        let a = scene.create_obstacle_visual(ShapeKind::Box);
        let b = scene.create_model_visual(&empty_model("FanFan"), ModelMaterial::OverrideColor(Tint(1)));
        assert_eq!(scene.live_count(), 2);
        assert_eq!(scene.attached_count(), 0);

        scene.attach(a);
        scene.attach(b);
        assert_eq!(scene.attached_models(), vec![b]);

        scene.dispose(a);
        scene.dispose(a);
        assert_eq!(scene.disposed_count(), 1);
        assert_eq!(scene.live_count(), 1);
        assert!(!scene.is_attached(a));
    }

    #[test]
    fn unknown_handles_are_ignored() {
        let mut scene = DebugScene::new();
        scene.attach(VisualHandle(99));
        scene.set_transform(VisualHandle(99), &Transform::default());
        scene.dispose(VisualHandle(99));
        assert_eq!(scene.disposed_count(), 0);
    }

    #[test]
    fn frame_lists_attached_visuals_only() {
        let mut scene = DebugScene::new();
        let shown = scene.create_obstacle_visual(ShapeKind::Sphere);
        let _hidden = scene.create_obstacle_visual(ShapeKind::Torus);
        scene.attach(shown);
        scene.set_transform(
            shown,
            &Transform {
                position: Vec3::new(25.0, 0.8, 0.0),
                ..Transform::default()
            },
        );

        let frame = scene.render(&RenderView::default());
        assert!(frame.contains("visuals=2, attached=1"));
        assert!(frame.contains("sphere pos=(25.00, 0.80, 0.00)"));
        assert!(!frame.contains("torus"));
    }

    #[test]
    fn released_surface_renders_nothing() {
        let mut scene = DebugScene::new();
        scene.release_surface();
        assert!(scene.render(&RenderView::default()).is_empty());
        assert_eq!(scene.frames_rendered(), 0);
    }
}
