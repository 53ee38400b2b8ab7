//! Geometry shared by sprites and surfaces.
//!
//! Canonical space:
//! - surface pixels, origin top-left
//! - +X right, +Y down
//! - positive rotation turns +X towards +Y (clockwise on screen)

mod affine;
mod rect;
mod vec2;

pub use affine::Affine;
pub use rect::Rect;
pub use vec2::Vec2;
