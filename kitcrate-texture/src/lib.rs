//! Procedural panel textures for kitcrate garments
//!
//! This crate rasterizes the front, back and sleeve panels from a
//! [`GarmentConfig`](kitcrate_core::GarmentConfig): a base fill, an optional
//! pattern overlay, the logo and outlined bitmap-font text.

pub mod font;
pub mod logo;
pub mod pattern;
pub mod surface;
pub mod synth;

pub use font::{draw_text, text_bounds, TextBaseline, TextStyle};
pub use logo::{load_logo, LogoPoll, PendingLogo};
pub use pattern::apply_pattern;
pub use surface::{CoverageMask, RasterSurface};
pub use synth::{PanelSet, TextureSynthesizer, PANEL_SIZE, SLEEVE_SIZE};
