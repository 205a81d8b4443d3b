//! Rendering adapter: a renderer-agnostic scene interface plus the two things
//! that drive it, the character rig and the obstacle visuals.
//!
//! # Invariants
//! - Rendering never mutates session state; it only reads events and
//!   obstacle transforms.
//! - Every visual created here is disposed exactly once, on despawn, on
//!   reload, or on teardown.
//!
//! [`DebugScene`] renders text frames and counts live handles. A GPU scene
//! implements the same [`Scene`] trait without changing consumers.

mod debug;
pub mod rig;
mod scene;
pub mod sync;

pub use debug::{DebugScene, VisualKind, VisualRecord};
pub use rig::{CharacterRig, LoadSettled, PoseInput, RigPose};
pub use scene::{
    ModelMaterial, ObstacleGeometry, ObstacleStyle, RenderView, Scene, SurfaceMaterial,
    VisualHandle,
};
pub use sync::ObstacleVisuals;

pub fn crate_info() -> &'static str {
    concat!("joyrun-render v", env!("CARGO_PKG_VERSION"))
}
