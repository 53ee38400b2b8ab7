//! Drawables.
//!
//! A [`Drawable`] is anything the scheduler can paint once per frame. The
//! stock drawable is [`Sprite`]: one image plus a transform and compositing
//! state.

mod sprite;

pub use sprite::Sprite;

use crate::surface::Surface;

/// Contract between the scheduler and the things it paints.
pub trait Drawable {
    /// Paints onto `surface`.
    ///
    /// Implementations must leave the surface state (transform, alpha, blend
    /// mode) as they found it.
    fn draw(&self, surface: &mut dyn Surface);

    /// Called once per frame, before any tick callback, to pick up
    /// asynchronous state such as image readiness.
    fn prepare(&mut self) {}
}
