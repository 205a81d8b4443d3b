//! Runtime: the frame loop that wires a [`joyrun_kernel::GameSession`] to
//! its character rig, asset loader, scene and input queue.
//!
//! # Invariants
//! - One logical thread drives [`GameApp::frame`]; loads and input only take
//!   effect when a frame drains them.
//! - After shutdown nothing is rendered and no visual stays alive.

mod app;

pub use app::GameApp;
