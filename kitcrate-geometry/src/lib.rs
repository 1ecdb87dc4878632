//! Garment and mannequin geometry for kitcrate
//!
//! Builds the mesh hierarchy once per preview and swaps panel textures
//! onto the garment's material slots as the configuration changes.

pub mod builder;
pub mod model;
pub mod primitives;

pub use builder::{assign_panel_textures, build_garment_only, build_model, build_worn_model, BACK_SLOT, FRONT_SLOT};
pub use model::{GarmentModel, MeshPart, ModelKind, PartKind, PreviewModel, WorldPart, WornModel};
pub use primitives::{box_mesh, cylinder_mesh, sphere_mesh};
