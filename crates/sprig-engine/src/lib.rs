//! Sprig engine crate.
//!
//! A small real-time sprite loop: a [`scheduler::Scheduler`] owns a drawing
//! [`surface::Surface`], a set of [`sprite::Drawable`]s and per-frame tick
//! callbacks, and runs clear → tick → draw once per granted frame.

pub mod coords;
pub mod error;
pub mod host;
pub mod logging;
pub mod scheduler;
pub mod sprite;
pub mod surface;
pub mod texture;
pub mod time;

pub use error::EngineError;
pub use scheduler::{FrameControl, LoopConfig, LoopHandle, PaintOrder, Scheduler};
pub use sprite::{Drawable, Sprite};
pub use surface::{BlendMode, Surface};
pub use texture::{ImageHandle, ImageStatus, Texture};
