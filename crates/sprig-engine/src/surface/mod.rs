//! Drawing surfaces.
//!
//! [`Surface`] is the small immediate-mode 2D API sprites draw through: a
//! save/restore state stack holding the current transform, global alpha and
//! blend mode, plus `clear_rect` and `draw_image`.
//!
//! Implementations:
//! - [`RasterSurface`]: CPU rasterizer over an RGBA8 image
//! - [`RecordingSurface`]: records calls for tests and frame inspection

mod blend;
mod guard;
mod raster;
mod recording;

pub use blend::BlendMode;
pub use guard::SurfaceGuard;
pub use raster::RasterSurface;
pub use recording::{RecordingSurface, SurfaceOp};

use crate::coords::{Affine, Rect};
use crate::texture::Texture;

/// Immediate-mode 2D drawing target.
///
/// State model (same as an HTML canvas 2D context):
/// - `save` pushes transform, alpha and blend mode; `restore` pops them
/// - `restore` on an empty stack does nothing
/// - `transform`, `translate` and `rotate` compose onto the current matrix
/// - `clear_rect` and `draw_image` are affected by the current transform
pub trait Surface {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    fn save(&mut self);

    fn restore(&mut self);

    /// Replaces the current transform.
    fn set_transform(&mut self, m: Affine);

    /// Composes `m` onto the current transform (`current * m`).
    fn transform(&mut self, m: Affine);

    fn reset_transform(&mut self) {
        self.set_transform(Affine::IDENTITY);
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.transform(Affine::translation(dx, dy));
    }

    /// Rotates the current transform by `radians`.
    fn rotate(&mut self, radians: f32) {
        self.transform(Affine::rotation(radians));
    }

    fn set_global_alpha(&mut self, alpha: f32);

    fn set_blend_mode(&mut self, mode: BlendMode);

    /// Resets every pixel covered by `rect` to transparent black.
    fn clear_rect(&mut self, rect: Rect);

    /// Draws the `src` region of `image` (texture pixels) scaled into `dst`
    /// (user space).
    fn draw_image(&mut self, image: &Texture, src: Rect, dst: Rect);
}
