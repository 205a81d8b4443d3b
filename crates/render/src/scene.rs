use glam::Vec3;
use joyrun_assets::ModelData;
use joyrun_common::{Tint, Transform};
use joyrun_kernel::ShapeKind;

/// Opaque handle to a visual owned by a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisualHandle(pub u64);

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Field of view in degrees.
    pub fov_degrees: f32,
    /// Clear and fog color.
    pub background: Tint,
    /// Horizontal offset of the repeating ground pattern.
    pub ground_scroll: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 5.0, 12.0),
            target: Vec3::new(0.0, 1.5, 0.0),
            fov_degrees: 50.0,
            background: Tint(0xffd60a),
            ground_scroll: 0.0,
        }
    }
}

/// A standard surface material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceMaterial {
    pub color: Tint,
    pub metalness: f32,
    pub roughness: f32,
}

/// How a character model is colored when its visual is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModelMaterial {
    /// Bare geometry gets a fresh material.
    Replace(SurfaceMaterial),
    /// Models that carry materials keep them with the base color replaced.
    OverrideColor(Tint),
}

/// Obstacle primitive geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObstacleGeometry {
    Cube { size: f32 },
    Torus { radius: f32, tube: f32 },
    Sphere { radius: f32 },
}

/// Geometry and material of an obstacle shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObstacleStyle {
    pub geometry: ObstacleGeometry,
    pub material: SurfaceMaterial,
}

impl ObstacleStyle {
    pub fn for_shape(shape: ShapeKind) -> Self {
        let (geometry, color) = match shape {
            ShapeKind::Box => (ObstacleGeometry::Cube { size: 1.2 }, Tint(0x22d3ee)),
            ShapeKind::Torus => (
                ObstacleGeometry::Torus {
                    radius: 0.6,
                    tube: 0.25,
                },
                Tint(0xa855f7),
            ),
            ShapeKind::Sphere => (ObstacleGeometry::Sphere { radius: 0.7 }, Tint(0xfb923c)),
        };
        Self {
            geometry,
            material: SurfaceMaterial {
                color,
                metalness: 0.0,
                roughness: 1.0,
            },
        }
    }
}

/// Renderer-agnostic scene graph.
///
/// Visuals are created detached. A handle stays valid until `dispose`;
/// calls with an unknown or disposed handle are ignored. The scene never
/// writes back into the session.
pub trait Scene {
    /// The output type produced by one `render` call.
    type Frame;

    fn create_model_visual(&mut self, model: &ModelData, material: ModelMaterial) -> VisualHandle;

    fn create_obstacle_visual(&mut self, shape: ShapeKind) -> VisualHandle;

    fn attach(&mut self, handle: VisualHandle);

    fn detach(&mut self, handle: VisualHandle);

    /// Release the visual's geometry and materials. Detaches first if needed.
    fn dispose(&mut self, handle: VisualHandle);

    fn set_transform(&mut self, handle: VisualHandle, transform: &Transform);

    fn render(&mut self, view: &RenderView) -> Self::Frame;

    /// Release the drawing surface. Later renders produce empty frames.
    fn release_surface(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 50.0);
        assert_eq!(view.background.to_string(), "#ffd60a");
    }

    #[test]
    fn obstacle_styles() {
        let cube = ObstacleStyle::for_shape(ShapeKind::Box);
        assert_eq!(cube.geometry, ObstacleGeometry::Cube { size: 1.2 });
        assert_eq!(cube.material.color, Tint(0x22d3ee));
        assert_eq!(ObstacleStyle::for_shape(ShapeKind::Sphere).material.color, Tint(0xfb923c));
        assert!(matches!(
            ObstacleStyle::for_shape(ShapeKind::Torus).geometry,
            ObstacleGeometry::Torus { .. }
        ));
    }
}
