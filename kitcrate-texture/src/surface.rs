//! Raster drawing surface and coverage masks
//!
//! Shapes are rasterized without anti-aliasing: a pixel is covered when its
//! center lies inside the shape. Covered pixels are blended source-over with
//! a uniform alpha, so repeated renders of the same shapes are bit-identical.

use std::ops::Range;

use image::{Rgba, RgbaImage};
use kitcrate_core::Rgb;

/// Miter joins longer than this multiple of the half width are dropped
const MITER_LIMIT: f32 = 10.0;

/// Pixels whose centers fall in `[start, end)`, clamped to `0..limit`
fn pixel_span(start: f32, end: f32, limit: u32) -> Range<u32> {
    let first = (start - 0.5).ceil().max(0.0);
    let last = (end - 0.5).ceil().min(limit as f32);
    if last <= first {
        return 0..0;
    }
    first as u32..last as u32
}

fn blend_channel(dst: u8, src: u8, alpha: f32) -> u8 {
    (src as f32 * alpha + dst as f32 * (1.0 - alpha)).round().clamp(0.0, 255.0) as u8
}

fn blend_pixel(dst: &mut Rgba<u8>, src: [u8; 3], alpha: f32) {
    let out_alpha = alpha + dst[3] as f32 / 255.0 * (1.0 - alpha);
    dst[0] = blend_channel(dst[0], src[0], alpha);
    dst[1] = blend_channel(dst[1], src[1], alpha);
    dst[2] = blend_channel(dst[2], src[2], alpha);
    dst[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
}

/// Boolean per-pixel coverage, built up from shapes and blended in one pass
///
/// Overlapping shapes in one mask are blended once, which keeps stroke joints
/// from darkening where segments meet.
#[derive(Debug, Clone)]
pub struct CoverageMask {
    width: u32,
    height: u32,
    covered: Vec<bool>,
    bounds: Option<(u32, u32, u32, u32)>,
}

impl CoverageMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            covered: vec![false; (width as usize) * (height as usize)],
            bounds: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Inclusive-exclusive bounds `(x0, y0, x1, y1)` of covered pixels
    pub fn bounds(&self) -> Option<(u32, u32, u32, u32)> {
        self.bounds
    }

    pub fn is_covered(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.covered[self.index(x, y)]
    }

    pub fn covered_count(&self) -> usize {
        self.covered.iter().filter(|c| **c).count()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    fn mark_row(&mut self, y: u32, xs: Range<u32>) {
        if xs.is_empty() {
            return;
        }
        let start = self.index(xs.start, y);
        let end = self.index(xs.end - 1, y) + 1;
        self.covered[start..end].iter_mut().for_each(|c| *c = true);

        self.bounds = Some(match self.bounds {
            None => (xs.start, y, xs.end, y + 1),
            Some((x0, y0, x1, y1)) => (x0.min(xs.start), y0.min(y), x1.max(xs.end), y1.max(y + 1)),
        });
    }

    /// Cover the axis-aligned rectangle `[x, x+w) x [y, y+h)`
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let xs = pixel_span(x, x + w, self.width);
        for py in pixel_span(y, y + h, self.height) {
            self.mark_row(py, xs.clone());
        }
    }

    /// Cover a convex polygon given in drawing order
    pub fn fill_convex_polygon(&mut self, points: &[(f32, f32)]) {
        if points.len() < 3 {
            return;
        }

        let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);

        for py in pixel_span(min_y, max_y, self.height) {
            let yc = py as f32 + 0.5;
            let mut left = f32::INFINITY;
            let mut right = f32::NEG_INFINITY;

            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                let crosses = (a.1 <= yc && b.1 > yc) || (b.1 <= yc && a.1 > yc);
                if !crosses {
                    continue;
                }
                let x = a.0 + (yc - a.1) * (b.0 - a.0) / (b.1 - a.1);
                left = left.min(x);
                right = right.max(x);
            }

            if left < right {
                let xs = pixel_span(left, right, self.width);
                self.mark_row(py, xs);
            }
        }
    }

    /// Cover a butt-capped stroke of `width` along one segment
    pub fn stroke_segment(&mut self, from: (f32, f32), to: (f32, f32), width: f32) {
        let Some((nx, ny)) = unit_normal(from, to) else {
            return;
        };
        let r = width / 2.0;
        self.fill_convex_polygon(&[
            (from.0 + nx * r, from.1 + ny * r),
            (to.0 + nx * r, to.1 + ny * r),
            (to.0 - nx * r, to.1 - ny * r),
            (from.0 - nx * r, from.1 - ny * r),
        ]);
    }

    /// Cover an open polyline stroke with butt caps and miter joins
    pub fn stroke_polyline(&mut self, points: &[(f32, f32)], width: f32) {
        for pair in points.windows(2) {
            self.stroke_segment(pair[0], pair[1], width);
        }

        let r = width / 2.0;
        for triple in points.windows(3) {
            let (prev, joint, next) = (triple[0], triple[1], triple[2]);
            let (Some(n1), Some(n2)) = (unit_normal(prev, joint), unit_normal(joint, next)) else {
                continue;
            };

            // Both sides get a wedge; the inner one lies inside the segments already.
            for side in [1.0f32, -1.0] {
                let a = (n1.0 * side, n1.1 * side);
                let b = (n2.0 * side, n2.1 * side);
                let sum = (a.0 + b.0, a.1 + b.1);
                let sum_sq = sum.0 * sum.0 + sum.1 * sum.1;
                if sum_sq < 1e-6 {
                    continue;
                }
                // Miter length relative to r is 2 / |a + b|.
                let scale = 2.0 / sum_sq;
                if scale * sum_sq.sqrt() > MITER_LIMIT {
                    continue;
                }
                self.fill_convex_polygon(&[
                    joint,
                    (joint.0 + a.0 * r, joint.1 + a.1 * r),
                    (joint.0 + sum.0 * scale * r, joint.1 + sum.1 * scale * r),
                    (joint.0 + b.0 * r, joint.1 + b.1 * r),
                ]);
            }
        }
    }

    /// Grow the coverage by `radius` pixels with a round kernel
    pub fn dilated(&self, radius: u32) -> CoverageMask {
        let mut out = self.clone();
        let Some((x0, y0, x1, y1)) = self.bounds else {
            return out;
        };
        if radius == 0 {
            return out;
        }

        let r = radius as i64;
        let offsets: Vec<(i64, i64)> = (-r..=r)
            .flat_map(|dy| (-r..=r).map(move |dx| (dx, dy)))
            .filter(|(dx, dy)| dx * dx + dy * dy <= r * r)
            .collect();

        for y in y0..y1 {
            for x in x0..x1 {
                if !self.is_covered(x, y) {
                    continue;
                }
                for (dx, dy) in &offsets {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                        continue;
                    }
                    out.mark_row(ny as u32, nx as u32..nx as u32 + 1);
                }
            }
        }
        out
    }
}

fn unit_normal(from: (f32, f32), to: (f32, f32)) -> Option<(f32, f32)> {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f32::EPSILON {
        return None;
    }
    Some((-dy / len, dx / len))
}

/// An exclusively owned RGBA8 drawing surface
#[derive(Debug, Clone)]
pub struct RasterSurface {
    image: RgbaImage,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Overwrite every pixel with an opaque color
    pub fn clear(&mut self, color: Rgb) {
        let pixel = Rgba(color.to_rgba());
        self.image.pixels_mut().for_each(|p| *p = pixel);
    }

    /// A mask matching this surface's dimensions
    pub fn mask(&self) -> CoverageMask {
        CoverageMask::new(self.width(), self.height())
    }

    /// Blend a rectangle of `color` at `alpha`
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb, alpha: f32) {
        let src = [color.r, color.g, color.b];
        let xs = pixel_span(x, x + w, self.width());
        for py in pixel_span(y, y + h, self.height()) {
            for px in xs.clone() {
                blend_pixel(self.image.get_pixel_mut(px, py), src, alpha);
            }
        }
    }

    /// Blend every covered pixel of `mask` with `color` at `alpha`
    pub fn fill_mask(&mut self, mask: &CoverageMask, color: Rgb, alpha: f32) {
        let Some((x0, y0, x1, y1)) = mask.bounds() else {
            return;
        };
        let src = [color.r, color.g, color.b];
        let x1 = x1.min(self.width());
        let y1 = y1.min(self.height());
        for py in y0..y1 {
            for px in x0..x1 {
                if mask.is_covered(px, py) {
                    blend_pixel(self.image.get_pixel_mut(px, py), src, alpha);
                }
            }
        }
    }

    /// Composite `source` scaled to `width` x `height` with its top-left at (x, y)
    pub fn draw_image(&mut self, source: &RgbaImage, x: i64, y: i64, width: u32, height: u32) {
        if width == 0 || height == 0 || source.width() == 0 || source.height() == 0 {
            return;
        }
        let scaled;
        let source = if source.dimensions() == (width, height) {
            source
        } else {
            scaled = image::imageops::resize(source, width, height, image::imageops::FilterType::Triangle);
            &scaled
        };

        for (sx, sy, pixel) in source.enumerate_pixels() {
            let dx = x + sx as i64;
            let dy = y + sy as i64;
            if dx < 0 || dy < 0 || dx >= self.width() as i64 || dy >= self.height() as i64 {
                continue;
            }
            let alpha = pixel[3] as f32 / 255.0;
            if alpha <= 0.0 {
                continue;
            }
            blend_pixel(
                self.image.get_pixel_mut(dx as u32, dy as u32),
                [pixel[0], pixel[1], pixel[2]],
                alpha,
            );
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Copy of the current contents
    pub fn snapshot(&self) -> RgbaImage {
        self.image.clone()
    }
}
