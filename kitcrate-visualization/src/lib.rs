//! Interactive garment previews
//!
//! This crate ties the pieces together:
//! - [`SceneController`]: scene graph, camera, orbit input and the
//!   host-driven frame loop with an explicit [`AnimationHandle`]
//! - [`PreviewView`]: one mounted model whose panels follow the configuration
//! - [`Customizer`]: the configuration and logo shared by all previews
//! - [`CustomizerApp`]: the winit host with one window per model
//!
//! Rendering goes through the [`RenderBackend`] trait, implemented for
//! [`kitcrate_gpu::SceneRenderer`].

pub mod app;
pub mod backend;
pub mod camera;
pub mod controller;
pub mod customizer;
pub mod orbit;
pub mod view;

pub use app::{key_command, CustomizerApp, PointerTracker};
pub use backend::RenderBackend;
pub use camera::Camera;
pub use controller::{AnimationHandle, ObjectId, RenderState, Scene, SceneController, BACKGROUND_COLOR};
pub use customizer::{Command, Customizer};
pub use orbit::{InputEvent, OrbitController, OrbitRotation, MAX_PITCH, ROTATION_SPEED, SMOOTHING};
pub use view::PreviewView;

use kitcrate_core::{GarmentConfig, Result};

/// Open the customizer windows for `config` and block until they close
pub fn run_customizer(config: GarmentConfig) -> Result<()> {
    CustomizerApp::new(config).run()
}
