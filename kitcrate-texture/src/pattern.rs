//! Pattern overlays drawn over the base fill

use kitcrate_core::{PatternVariant, Rgb};
use rand::Rng;

use crate::surface::RasterSurface;

/// Alpha of the black stripe and diagonal overlays
pub const OVERLAY_ALPHA: f32 = 0.15;

pub const STRIPE_WIDTH: u32 = 80;
pub const STRIPE_PERIOD: u32 = 160;

pub const DIAGONAL_SPACING: usize = 150;
pub const DIAGONAL_LINE_WIDTH: f32 = 40.0;

pub const SPECKLE_CELL: u32 = 20;
pub const SPECKLE_SIZE: u32 = 10;
pub const SPECKLE_ALPHA: f32 = 0.1;

/// Overlay `pattern` onto the whole surface
///
/// Only `Texture` draws from `rng`; the other variants are deterministic.
pub fn apply_pattern<R: Rng + ?Sized>(surface: &mut RasterSurface, pattern: PatternVariant, rng: &mut R) {
    match pattern {
        PatternVariant::Plain => {}
        PatternVariant::Stripes => draw_stripes(surface),
        PatternVariant::Diagonal => draw_diagonals(surface),
        PatternVariant::Texture => draw_speckle(surface, rng),
    }
}

fn draw_stripes(surface: &mut RasterSurface) {
    let height = surface.height() as f32;
    for x in (0..surface.width()).step_by(STRIPE_PERIOD as usize) {
        surface.fill_rect(x as f32, 0.0, STRIPE_WIDTH as f32, height, Rgb::BLACK, OVERLAY_ALPHA);
    }
}

fn draw_diagonals(surface: &mut RasterSurface) {
    let w = surface.width() as i64;
    let h = surface.height() as i64;
    let mut mask = surface.mask();
    for i in (-h..w).step_by(DIAGONAL_SPACING) {
        mask.stroke_segment((i as f32, 0.0), ((i + h) as f32, h as f32), DIAGONAL_LINE_WIDTH);
    }
    surface.fill_mask(&mask, Rgb::BLACK, OVERLAY_ALPHA);
}

fn draw_speckle<R: Rng + ?Sized>(surface: &mut RasterSurface, rng: &mut R) {
    let size = SPECKLE_SIZE as f32;
    for x in (0..surface.width()).step_by(SPECKLE_CELL as usize) {
        for y in (0..surface.height()).step_by(SPECKLE_CELL as usize) {
            if rng.gen::<f64>() > 0.5 {
                surface.fill_rect(x as f32, y as f32, size, size, Rgb::WHITE, SPECKLE_ALPHA);
            }
        }
    }
}
