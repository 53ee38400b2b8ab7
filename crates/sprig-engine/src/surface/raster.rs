use std::path::Path;

use image::{Rgba, RgbaImage};

use crate::coords::{Affine, Rect, Vec2};
use crate::error::EngineError;
use crate::texture::Texture;

use super::{BlendMode, Surface};

/// Largest accepted edge, in pixels.
const MAX_EDGE: u32 = 16_384;

#[derive(Debug, Copy, Clone, PartialEq)]
struct DrawState {
    transform: Affine,
    alpha: f32,
    blend: BlendMode,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            alpha: 1.0,
            blend: BlendMode::SourceOver,
        }
    }
}

/// CPU surface backed by a straight-alpha RGBA8 image.
///
/// Rasterization model:
/// - pixel centers are sampled at `(x + 0.5, y + 0.5)`
/// - each covered device pixel is inverse-mapped into user space
/// - images are sampled nearest-neighbour
///
/// `Copy` only replaces the pixels the source covers; the rest of the
/// surface is left untouched.
#[derive(Debug, Clone)]
pub struct RasterSurface {
    pixels: RgbaImage,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl RasterSurface {
    /// Creates a transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self, EngineError> {
        if width == 0 || height == 0 || width > MAX_EDGE || height > MAX_EDGE {
            return Err(EngineError::InvalidSurfaceSize { width, height });
        }
        Ok(Self {
            pixels: RgbaImage::new(width, height),
            state: DrawState::default(),
            stack: Vec::new(),
        })
    }

    #[inline]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.pixels.get_pixel_checked(x, y).map(|p| p.0)
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Fills the whole surface, ignoring transform and blend state.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for p in self.pixels.pixels_mut() {
            *p = Rgba(rgba);
        }
    }

    /// Writes the current pixels as a PNG file.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        self.pixels
            .save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    /// Device-space pixel range covered by `rect` under the current transform,
    /// clamped to the surface. `None` if nothing is covered.
    fn device_bounds(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let corners = rect.corners().map(|c| self.state.transform.apply(c));
        if !corners.iter().all(|c| c.is_finite()) {
            return None;
        }

        let (mut min, mut max) = (corners[0], corners[0]);
        for c in &corners[1..] {
            min = Vec2::new(min.x.min(c.x), min.y.min(c.y));
            max = Vec2::new(max.x.max(c.x), max.y.max(c.y));
        }

        let w = self.pixels.width() as f32;
        let h = self.pixels.height() as f32;
        let x0 = min.x.floor().clamp(0.0, w) as u32;
        let y0 = min.y.floor().clamp(0.0, h) as u32;
        let x1 = max.x.ceil().clamp(0.0, w) as u32;
        let y1 = max.y.ceil().clamp(0.0, h) as u32;

        if x0 >= x1 || y0 >= y1 {
            None
        } else {
            Some((x0, y0, x1, y1))
        }
    }
}

impl Surface for RasterSurface {
    fn width(&self) -> u32 {
        self.pixels.width()
    }

    fn height(&self) -> u32 {
        self.pixels.height()
    }

    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn set_transform(&mut self, m: Affine) {
        self.state.transform = m;
    }

    fn transform(&mut self, m: Affine) {
        self.state.transform = self.state.transform * m;
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        // Out-of-range values are ignored, as on a canvas.
        if (0.0..=1.0).contains(&alpha) {
            self.state.alpha = alpha;
        }
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
    }

    fn clear_rect(&mut self, rect: Rect) {
        let rect = rect.normalized();
        if rect.is_empty() {
            return;
        }
        let Some(inv) = self.state.transform.inverse() else { return };
        let Some((x0, y0, x1, y1)) = self.device_bounds(rect) else { return };

        for y in y0..y1 {
            for x in x0..x1 {
                let p = inv.apply(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if rect.contains(p) {
                    self.pixels.put_pixel(x, y, Rgba([0, 0, 0, 0]));
                }
            }
        }
    }

    fn draw_image(&mut self, image: &Texture, src: Rect, dst: Rect) {
        let (src, dst) = (src.normalized(), dst.normalized());
        if src.is_empty() || dst.is_empty() || self.state.alpha <= 0.0 {
            return;
        }
        let Some(inv) = self.state.transform.inverse() else { return };
        let Some((x0, y0, x1, y1)) = self.device_bounds(dst) else { return };

        let sx = src.size.x / dst.size.x;
        let sy = src.size.y / dst.size.y;
        let DrawState { alpha, blend, .. } = self.state;

        for y in y0..y1 {
            for x in x0..x1 {
                let p = inv.apply(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if !dst.contains(p) {
                    continue;
                }

                let u = src.origin.x + (p.x - dst.origin.x) * sx;
                let v = src.origin.y + (p.y - dst.origin.y) * sy;
                if u < 0.0 || v < 0.0 {
                    continue;
                }
                let Some(texel) = image.texel(u as u32, v as u32) else { continue };

                let mut s = to_unit(texel);
                s[3] *= alpha;
                let d = to_unit(self.pixels.get_pixel(x, y).0);
                self.pixels.put_pixel(x, y, Rgba(to_u8(blend.composite(s, d))));
            }
        }
    }
}

#[inline]
fn to_unit(c: [u8; 4]) -> [f32; 4] {
    c.map(|v| v as f32 / 255.0)
}

#[inline]
fn to_u8(c: [f32; 4]) -> [u8; 4] {
    c.map(|v| (v * 255.0).round().clamp(0.0, 255.0) as u8)
}
