//! Panel texture synthesis for the garment's front, back and sleeves

use image::RgbaImage;
use kitcrate_core::{GarmentConfig, PanelTexture, PatternVariant, Rgb};
use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::debug;

use crate::font::{draw_text, TextBaseline, TextStyle};
use crate::pattern::apply_pattern;
use crate::surface::RasterSurface;

/// Edge length of the front and back panels
pub const PANEL_SIZE: u32 = 2048;
/// Edge length of the sleeve panel
pub const SLEEVE_SIZE: u32 = 512;

pub const LOGO_SIZE: u32 = 300;
pub const LOGO_TOP: i64 = 600;

pub const FRONT_NUMBER_Y: f32 = 1100.0;
pub const BACK_NAME_Y: f32 = 700.0;
pub const BACK_NUMBER_Y: f32 = 1050.0;

/// Open trim path along the sleeve's top and sides
pub const SLEEVE_TRIM: [(f32, f32); 4] = [(50.0, 512.0), (50.0, 50.0), (462.0, 50.0), (462.0, 512.0)];
pub const SLEEVE_TRIM_WIDTH: f32 = 15.0;
pub const SLEEVE_TRIM_ALPHA: f32 = 0.8;

pub fn front_number_style() -> TextStyle {
    TextStyle::new(250.0, 4.0, TextBaseline::Middle)
}

pub fn back_name_style() -> TextStyle {
    TextStyle::new(140.0, 3.0, TextBaseline::Middle)
}

pub fn back_number_style() -> TextStyle {
    TextStyle::new(300.0, 5.0, TextBaseline::Middle)
}

/// Left edge of the logo box
pub fn logo_left() -> i64 {
    (PANEL_SIZE - LOGO_SIZE) as i64 / 2
}

/// The three textures a garment is dressed in
#[derive(Debug)]
pub struct PanelSet {
    pub front: PanelTexture,
    pub back: PanelTexture,
    pub sleeve: PanelTexture,
}

/// Rasterizes panel textures onto owned surfaces
///
/// Each render clears its surface first, so output depends only on the
/// arguments and, for the `texture` pattern, the RNG state.
pub struct TextureSynthesizer<R: Rng = ThreadRng> {
    panel: RasterSurface,
    sleeve: RasterSurface,
    rng: R,
}

impl TextureSynthesizer<ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for TextureSynthesizer<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> TextureSynthesizer<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            panel: RasterSurface::new(PANEL_SIZE, PANEL_SIZE),
            sleeve: RasterSurface::new(SLEEVE_SIZE, SLEEVE_SIZE),
            rng,
        }
    }

    fn prepare_panel(&mut self, base: Rgb, pattern: PatternVariant) {
        self.panel.clear(base);
        apply_pattern(&mut self.panel, pattern, &mut self.rng);
    }

    pub fn render_front_panel(
        &mut self,
        base: Rgb,
        logo: Option<&RgbaImage>,
        front_number: &str,
        pattern: PatternVariant,
    ) -> PanelTexture {
        self.prepare_panel(base, pattern);

        if let Some(logo) = logo {
            self.panel.draw_image(logo, logo_left(), LOGO_TOP, LOGO_SIZE, LOGO_SIZE);
        }

        let center = PANEL_SIZE as f32 / 2.0;
        draw_text(&mut self.panel, front_number, center, FRONT_NUMBER_Y, &front_number_style());

        debug!("Synthesized front panel ({pattern}, logo: {})", logo.is_some());
        PanelTexture::new(self.panel.snapshot())
    }

    pub fn render_back_panel(
        &mut self,
        base: Rgb,
        back_name: &str,
        back_number: &str,
        pattern: PatternVariant,
    ) -> PanelTexture {
        self.prepare_panel(base, pattern);

        let center = PANEL_SIZE as f32 / 2.0;
        draw_text(&mut self.panel, &back_name.to_uppercase(), center, BACK_NAME_Y, &back_name_style());
        draw_text(&mut self.panel, back_number, center, BACK_NUMBER_Y, &back_number_style());

        debug!("Synthesized back panel ({pattern})");
        PanelTexture::new(self.panel.snapshot())
    }

    pub fn render_sleeve_panel(&mut self, base: Rgb) -> PanelTexture {
        self.sleeve.clear(base);

        let mut trim = self.sleeve.mask();
        trim.stroke_polyline(&SLEEVE_TRIM, SLEEVE_TRIM_WIDTH);
        self.sleeve.fill_mask(&trim, Rgb::WHITE, SLEEVE_TRIM_ALPHA);

        debug!("Synthesized sleeve panel");
        PanelTexture::new(self.sleeve.snapshot())
    }

    /// Render all three panels for `config`
    pub fn render_panels(&mut self, config: &GarmentConfig, logo: Option<&RgbaImage>) -> PanelSet {
        PanelSet {
            front: self.render_front_panel(config.primary_color, logo, config.front_number(), config.pattern),
            back: self.render_back_panel(config.primary_color, config.back_name(), config.back_number(), config.pattern),
            sleeve: self.render_sleeve_panel(config.primary_color),
        }
    }
}
