//! Sprig window crate.
//!
//! Presents a [`sprig_engine::surface::RasterSurface`] in a native window:
//! - `runtime`: winit event loop; one scheduler frame per redraw
//! - `device`: wgpu instance/device/surface management
//! - `render`: uploads the raster frame and blits it to the swapchain

pub mod device;
pub mod render;
pub mod runtime;

pub use device::{Gpu, GpuInit};
pub use runtime::{WindowConfig, WindowRuntime};
