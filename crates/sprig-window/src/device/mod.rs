//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Device/Queue for a window
//! - creating & configuring the Surface (swapchain)
//! - acquiring frames and turning surface errors into actions

mod gpu;

pub use gpu::{Gpu, GpuFrame, GpuInit, SurfaceErrorAction};
