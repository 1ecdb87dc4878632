//! Embedded 5x7 bitmap font with scaled, outlined text drawing

use kitcrate_core::Rgb;

use crate::surface::{CoverageMask, RasterSurface};

pub const GLYPH_COLUMNS: u32 = 5;
pub const GLYPH_ROWS: u32 = 7;

/// Horizontal advance per glyph in dots, including one dot of spacing
const ADVANCE_COLUMNS: u32 = GLYPH_COLUMNS + 1;

/// Cap height as a fraction of the nominal font size
const CAP_HEIGHT_RATIO: f32 = 0.72;

const FIRST_GLYPH: u32 = 0x20;

/// Printable ASCII from space through underscore. Bit 4 is the leftmost column.
const FONT_DATA: [[u8; 7]; 64] = [
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
    [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
    [0b01010, 0b01010, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
    [0b01010, 0b11111, 0b01010, 0b01010, 0b11111, 0b01010, 0b00000],
    [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100],
    [0b11001, 0b11010, 0b00100, 0b00100, 0b01011, 0b10011, 0b00000],
    [0b01100, 0b10010, 0b01100, 0b01101, 0b10010, 0b01101, 0b00000],
    [0b00100, 0b00100, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000],
    [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
    [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
    [0b00000, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0b00000],
    [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100, 0b01000],
    [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00100],
    [0b00001, 0b00010, 0b00010, 0b00100, 0b01000, 0b01000, 0b10000],
    [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
    [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b01110, 0b10001, 0b00001, 0b00110, 0b01000, 0b10000, 0b11111],
    [0b01110, 0b10001, 0b00001, 0b00110, 0b00001, 0b10001, 0b01110],
    [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
    [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
    [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
    [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
    [0b00000, 0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b00000],
    [0b00000, 0b00000, 0b00100, 0b00000, 0b00000, 0b00100, 0b01000],
    [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010],
    [0b00000, 0b00000, 0b11111, 0b00000, 0b11111, 0b00000, 0b00000],
    [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000],
    [0b01110, 0b10001, 0b00001, 0b00110, 0b00100, 0b00000, 0b00100],
    [0b01110, 0b10001, 0b10111, 0b10101, 0b10111, 0b10000, 0b01110],
    [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
    [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
    [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
    [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
    [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
    [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
    [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
    [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
    [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
    [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
    [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
    [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
    [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
    [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
    [0b01110, 0b10001, 0b10000, 0b01110, 0b00001, 0b10001, 0b01110],
    [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
    [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
    [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b11011, 0b10001],
    [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
    [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
    [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
    [0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110],
    [0b10000, 0b01000, 0b01000, 0b00100, 0b00010, 0b00010, 0b00001],
    [0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110],
    [0b00100, 0b01010, 0b10001, 0b00000, 0b00000, 0b00000, 0b00000],
    [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b11111],
];

/// Bitmap for `c`; lowercase folds to uppercase, anything else unknown maps to `?`
pub fn glyph(c: char) -> &'static [u8; 7] {
    let code = c.to_ascii_uppercase() as u32;
    let index = code.wrapping_sub(FIRST_GLYPH) as usize;
    FONT_DATA.get(index).unwrap_or(&FONT_DATA[('?' as u32 - FIRST_GLYPH) as usize])
}

/// Where `y` sits relative to the drawn glyphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextBaseline {
    /// Glyphs are vertically centered on `y`
    Middle,
    /// Glyph bottoms rest on `y`
    Alphabetic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Nominal font size in pixels
    pub size: f32,
    /// Outline stroke width; zero disables the outline
    pub outline_width: f32,
    pub fill: Rgb,
    pub outline: Rgb,
    pub baseline: TextBaseline,
}

impl TextStyle {
    /// White text with a black outline
    pub fn new(size: f32, outline_width: f32, baseline: TextBaseline) -> Self {
        Self {
            size,
            outline_width,
            fill: Rgb::WHITE,
            outline: Rgb::BLACK,
            baseline,
        }
    }

    /// Edge length of one font dot in pixels
    pub fn dot_size(&self) -> u32 {
        ((self.size * CAP_HEIGHT_RATIO / GLYPH_ROWS as f32).round() as u32).max(1)
    }

    /// Pixels the outline extends past the glyph edge
    pub fn outline_radius(&self) -> u32 {
        if self.outline_width <= 0.0 {
            0
        } else {
            (self.outline_width / 2.0).ceil() as u32
        }
    }
}

struct Layout {
    left: f32,
    top: f32,
    dot: f32,
}

fn layout(text: &str, center_x: f32, y: f32, style: &TextStyle) -> Option<Layout> {
    let count = text.chars().count() as u32;
    if count == 0 {
        return None;
    }
    let dot = style.dot_size() as f32;
    let width = (count * ADVANCE_COLUMNS - 1) as f32 * dot;
    let height = GLYPH_ROWS as f32 * dot;
    let top = match style.baseline {
        TextBaseline::Middle => y - height / 2.0,
        TextBaseline::Alphabetic => y - height,
    };
    Some(Layout {
        left: (center_x - width / 2.0).round(),
        top: top.round(),
        dot,
    })
}

/// Box `(x0, y0, x1, y1)` that drawing `text` may touch, outline included
pub fn text_bounds(text: &str, center_x: f32, y: f32, style: &TextStyle) -> Option<(f32, f32, f32, f32)> {
    let layout = layout(text, center_x, y, style)?;
    let count = text.chars().count() as u32;
    let pad = style.outline_radius() as f32;
    let width = (count * ADVANCE_COLUMNS - 1) as f32 * layout.dot;
    let height = GLYPH_ROWS as f32 * layout.dot;
    Some((
        layout.left - pad,
        layout.top - pad,
        layout.left + width + pad,
        layout.top + height + pad,
    ))
}

/// Glyph coverage for `text` horizontally centered on `center_x`
pub fn text_mask(surface: &RasterSurface, text: &str, center_x: f32, y: f32, style: &TextStyle) -> CoverageMask {
    let mut mask = surface.mask();
    let Some(layout) = layout(text, center_x, y, style) else {
        return mask;
    };

    for (i, c) in text.chars().enumerate() {
        let origin_x = layout.left + (i as u32 * ADVANCE_COLUMNS) as f32 * layout.dot;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_COLUMNS {
                if (bits >> (GLYPH_COLUMNS - 1 - col)) & 1 == 0 {
                    continue;
                }
                mask.fill_rect(
                    origin_x + col as f32 * layout.dot,
                    layout.top + row as f32 * layout.dot,
                    layout.dot,
                    layout.dot,
                );
            }
        }
    }
    mask
}

/// Draw `text` centered on `center_x`: outline first, then the fill on top
pub fn draw_text(surface: &mut RasterSurface, text: &str, center_x: f32, y: f32, style: &TextStyle) {
    let mask = text_mask(surface, text, center_x, y, style);
    if mask.bounds().is_none() {
        return;
    }
    let radius = style.outline_radius();
    if radius > 0 {
        surface.fill_mask(&mask.dilated(radius), style.outline, 1.0);
    }
    surface.fill_mask(&mask, style.fill, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_lookup() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('é'), glyph('?'));
        assert_eq!(glyph(' '), &[0; 7]);
        // '1' has its flag on the left
        assert_eq!(glyph('1')[1], 0b01100);
    }

    #[test]
    fn test_dot_size_scaling() {
        assert_eq!(TextStyle::new(250.0, 4.0, TextBaseline::Middle).dot_size(), 26);
        assert_eq!(TextStyle::new(140.0, 3.0, TextBaseline::Alphabetic).dot_size(), 14);
        assert_eq!(TextStyle::new(300.0, 5.0, TextBaseline::Alphabetic).dot_size(), 31);
        assert_eq!(TextStyle::new(1.0, 0.0, TextBaseline::Middle).dot_size(), 1);
    }

    #[test]
    fn test_outline_radius() {
        assert_eq!(TextStyle::new(10.0, 4.0, TextBaseline::Middle).outline_radius(), 2);
        assert_eq!(TextStyle::new(10.0, 3.0, TextBaseline::Middle).outline_radius(), 2);
        assert_eq!(TextStyle::new(10.0, 0.0, TextBaseline::Middle).outline_radius(), 0);
    }

    #[test]
    fn test_bounds_follow_baseline() {
        let middle = TextStyle::new(97.0, 0.0, TextBaseline::Middle);
        let (_, y0, _, y1) = text_bounds("8", 50.0, 100.0, &middle).unwrap();
        assert_eq!((y0, y1), (65.0, 135.0));

        let alphabetic = TextStyle { baseline: TextBaseline::Alphabetic, ..middle };
        let (x0, y0, x1, y1) = text_bounds("88", 100.0, 100.0, &alphabetic).unwrap();
        assert_eq!((y0, y1), (30.0, 100.0));
        assert_eq!(x1 - x0, 110.0);

        assert!(text_bounds("", 0.0, 0.0, &middle).is_none());
    }

    #[test]
    fn test_draw_text_outline_and_fill() {
        let mut surface = RasterSurface::new(64, 64);
        surface.clear(Rgb::from_u32(0x336699));
        let style = TextStyle::new(35.0, 4.0, TextBaseline::Middle);
        draw_text(&mut surface, "I", 32.0, 32.0, &style);

        // 'I' center column is solid; dot size 4, glyph spans x 22..42
        assert_eq!(surface.pixel(32, 32), [255, 255, 255, 255]);
        // Outline hugs the stem
        assert_eq!(surface.pixel(29, 32), [0, 0, 0, 255]);
        // Background untouched far away
        assert_eq!(surface.pixel(2, 2), [0x33, 0x66, 0x99, 255]);
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut surface = RasterSurface::new(16, 16);
        surface.clear(Rgb::WHITE);
        let before = surface.snapshot();
        draw_text(&mut surface, "", 8.0, 8.0, &TextStyle::new(20.0, 2.0, TextBaseline::Middle));
        assert_eq!(surface.as_image(), &before);
    }
}
