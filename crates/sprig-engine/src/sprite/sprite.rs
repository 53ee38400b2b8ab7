use std::path::Path;

use crate::coords::{Affine, Rect, Vec2};
use crate::surface::{BlendMode, Surface, SurfaceGuard};
use crate::texture::{ImageHandle, ImageStatus, Texture};

use super::Drawable;

/// Values derived from natural size, scale and anchor.
///
/// Recomputed synchronously by every mutation of an input, so a draw never
/// observes a stale pair.
#[derive(Debug, Copy, Clone, PartialEq)]
struct Derived {
    scaled_size: Vec2,
    anchor_offset: Vec2,
}

impl Derived {
    #[inline]
    fn compute(natural: Vec2, scale: Vec2, anchor: Vec2) -> Self {
        let scaled_size = natural.scale(scale);
        Self {
            scaled_size,
            anchor_offset: scaled_size.scale(anchor),
        }
    }
}

/// A single image with position, stretch, scale, rotation, anchor, opacity
/// and blend mode.
///
/// # Stretch vs. scale
///
/// `scale_*` resamples the image: it changes the destination size the image
/// is blitted into, and therefore the anchor offset. `stretch_*` is a raw
/// linear squash applied to the whole draw call (including the anchor
/// translation) before rotation.
///
/// # Readiness
///
/// A sprite is ready once its [`ImageHandle`] has reached `Ready` and the
/// sprite has observed it through [`Sprite::poll_image`] (the scheduler does
/// this every frame via [`Drawable::prepare`]). Until then the natural size is
/// unknown, derived values are `None` and `draw` does nothing.
///
/// # NaN inputs
///
/// `translate`, `set_anchor`, `rotate` and the scale setters skip NaN
/// components individually. Public fields are written as-is.
#[derive(Debug, Clone)]
pub struct Sprite {
    pub x: f32,
    pub y: f32,
    pub stretch_x: f32,
    pub stretch_y: f32,
    /// Degrees; accumulates without wraparound.
    pub rotation: f32,
    /// `0.0..=1.0`; surfaces ignore values outside the range.
    pub opacity: f32,
    pub blend: BlendMode,

    image: ImageHandle,
    natural: Option<Vec2>,
    scale: Vec2,
    anchor: Vec2,
    derived: Option<Derived>,
}

impl Sprite {
    /// Creates a sprite over `image`. Ready immediately if the handle is.
    pub fn new(image: ImageHandle) -> Self {
        let mut sprite = Self {
            x: 0.0,
            y: 0.0,
            stretch_x: 1.0,
            stretch_y: 1.0,
            rotation: 0.0,
            opacity: 1.0,
            blend: BlendMode::SourceOver,
            image,
            natural: None,
            scale: Vec2::ONE,
            anchor: Vec2::ZERO,
            derived: None,
        };
        sprite.poll_image();
        sprite
    }

    pub fn from_texture(texture: Texture) -> Self {
        Self::new(ImageHandle::ready(texture))
    }

    /// Starts loading `path` in the background; the sprite becomes ready
    /// on the first frame after decoding finishes.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::new(ImageHandle::open(path))
    }

    /// Observes the image handle; returns whether the sprite is ready.
    ///
    /// The first observation of `Ready` captures the natural size and fills
    /// the derived cache. Later calls are cheap no-ops.
    pub fn poll_image(&mut self) -> bool {
        if self.natural.is_some() {
            return true;
        }

        match self.image.status() {
            ImageStatus::Ready { width, height } => {
                self.natural = Some(Vec2::new(width as f32, height as f32));
                self.refresh();
                log::debug!("sprite image ready ({width}x{height})");
                true
            }
            ImageStatus::Loading | ImageStatus::Failed => false,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.natural.is_some()
    }

    #[inline]
    pub fn image(&self) -> &ImageHandle {
        &self.image
    }

    // ── position / rotation ───────────────────────────────────────────────

    /// Moves by `(dx, dy)`; a NaN component leaves its axis unchanged.
    pub fn translate(&mut self, dx: f32, dy: f32) {
        if let Some(dx) = number(dx) {
            self.x += dx;
        }
        if let Some(dy) = number(dy) {
            self.y += dy;
        }
    }

    /// Adds `d_deg` degrees to the rotation. NaN is ignored.
    pub fn rotate(&mut self, d_deg: f32) {
        match number(d_deg) {
            Some(d) => self.rotation += d,
            None => log::trace!("sprite rotate: ignoring NaN"),
        }
    }

    // ── anchor ────────────────────────────────────────────────────────────

    /// Sets the anchor as fractions of the scaled size; `(0, 0)` is the
    /// top-left corner, `(0.5, 0.5)` the center.
    ///
    /// `y = None` uses `x` for both axes. NaN components are skipped.
    ///
    /// ```ignore
    /// sprite.set_anchor(0.5, None);  // same as set_anchor(0.5, 0.5)
    /// sprite.set_anchor(0.0, 1.0);   // bottom-left
    /// ```
    pub fn set_anchor(&mut self, x: f32, y: impl Into<Option<f32>>) {
        let y = y.into().unwrap_or(x);
        if let Some(x) = number(x) {
            self.anchor.x = x;
        }
        if let Some(y) = number(y) {
            self.anchor.y = y;
        }
        self.refresh();
    }

    #[inline]
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    // ── scale ─────────────────────────────────────────────────────────────

    pub fn set_scale_x(&mut self, scale: f32) {
        if let Some(s) = number(scale) {
            self.scale.x = s;
            self.refresh();
        }
    }

    pub fn set_scale_y(&mut self, scale: f32) {
        if let Some(s) = number(scale) {
            self.scale.y = s;
            self.refresh();
        }
    }

    /// Sets both axes to `scale` with a single cache refresh.
    pub fn set_scale(&mut self, scale: f32) {
        if let Some(s) = number(scale) {
            self.scale = Vec2::splat(s);
            self.refresh();
        }
    }

    #[inline]
    pub fn scale_x(&self) -> f32 {
        self.scale.x
    }

    #[inline]
    pub fn scale_y(&self) -> f32 {
        self.scale.y
    }

    /// The X-axis scale.
    ///
    /// After `set_scale_y` the axes differ and this does not reflect Y.
    #[inline]
    pub fn scale(&self) -> f32 {
        self.scale.x
    }

    // ── derived ───────────────────────────────────────────────────────────

    #[inline]
    pub fn natural_size(&self) -> Option<Vec2> {
        self.natural
    }

    /// `natural_size * scale`, once ready.
    #[inline]
    pub fn scaled_size(&self) -> Option<Vec2> {
        self.derived.map(|d| d.scaled_size)
    }

    /// `scaled_size * anchor`, once ready.
    #[inline]
    pub fn anchor_offset(&self) -> Option<Vec2> {
        self.derived.map(|d| d.anchor_offset)
    }

    fn refresh(&mut self) {
        self.derived = self
            .natural
            .map(|natural| Derived::compute(natural, self.scale, self.anchor));
    }
}

impl Drawable for Sprite {
    fn draw(&self, surface: &mut dyn Surface) {
        let (Some(natural), Some(derived), Some(texture)) =
            (self.natural, self.derived, self.image.texture())
        else {
            return;
        };

        let mut s = SurfaceGuard::new(surface);
        s.translate(self.x, self.y);
        s.transform(Affine::scale(self.stretch_x, self.stretch_y));
        s.rotate(self.rotation.to_radians());
        let back = -derived.anchor_offset;
        s.translate(back.x, back.y);
        s.set_global_alpha(self.opacity);
        s.set_blend_mode(self.blend);
        s.draw_image(
            texture,
            Rect::from_size(natural.x, natural.y),
            Rect::from_size(derived.scaled_size.x, derived.scaled_size.y),
        );
    }

    fn prepare(&mut self) {
        self.poll_image();
    }
}

#[inline]
fn number(v: f32) -> Option<f32> {
    (!v.is_nan()).then_some(v)
}
