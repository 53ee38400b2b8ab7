//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and Window, wires them to the GPU layer, and
//! grants the scheduler one frame per redraw.

mod window;

pub use window::{WindowConfig, WindowRuntime};
