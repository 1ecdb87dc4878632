//! # kitcrate GPU
//!
//! wgpu rendering for the garment preview.
//!
//! [`SceneRenderer`] owns a window surface and draws [`SceneFrame`]s: lit,
//! textured triangle meshes with a shadow map from the key light. Meshes and
//! panel textures are uploaded on first use and released once a frame stops
//! referencing them.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use kitcrate_gpu::{SceneRenderer, SceneRenderConfig};
//!
//! async fn example(window: Arc<winit::window::Window>) -> kitcrate_core::Result<()> {
//!     let mut renderer = SceneRenderer::new(window, SceneRenderConfig::default()).await?;
//!     renderer.resize(1280, 720);
//!     renderer.dispose();
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod mesh;
pub mod scene;
pub mod textures;

pub use device::GpuContext;
pub use mesh::{mesh_vertices, GpuMesh, SceneVertex};
pub use scene::{light_view_projection, opengl_to_wgpu, DrawItem, SceneFrame, SceneRenderConfig, SceneRenderer};
pub use textures::TextureCache;
