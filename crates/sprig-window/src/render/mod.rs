//! Rendering.
//!
//! The engine rasterizes on the CPU; the GPU side only uploads the finished
//! frame and scales it into the window.

mod blit;

pub use blit::{BlitRenderer, fit_scale};

/// Renderer-facing context (device/queue + swapchain format + target size).
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    /// Swapchain size in physical pixels.
    pub target_size: (u32, u32),
}

/// Target for drawing (encoder + color view).
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub color_view: &'a wgpu::TextureView,
}
