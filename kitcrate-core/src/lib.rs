//! Core data structures for kitcrate
//!
//! This crate provides the shared vocabulary of the garment preview:
//! colors, the user-editable configuration and presets, triangle meshes,
//! transforms, materials, synthesized panel textures and the light rig.

pub mod color;
pub mod config;
pub mod error;
pub mod lighting;
pub mod material;
pub mod mesh;
pub mod presets;
pub mod texture;
pub mod transform;

pub use color::*;
pub use config::*;
pub use error::*;
pub use lighting::*;
pub use material::*;
pub use mesh::*;
pub use presets::*;
pub use texture::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;
