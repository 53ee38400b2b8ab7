//! Image data and its load state.
//!
//! - [`Texture`]: decoded RGBA8 pixels, immutable once built
//! - [`ImageHandle`]: shared, one-shot `Loading → Ready | Failed` slot that
//!   sprites poll between frames

mod handle;
mod texture;

pub use handle::{ImageHandle, ImageLoader, ImageStatus};
pub use texture::Texture;
