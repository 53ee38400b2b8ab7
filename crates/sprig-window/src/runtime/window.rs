use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalSize, Size};
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use sprig_engine::scheduler::{FrameControl, Scheduler};
use sprig_engine::sprite::Drawable;
use sprig_engine::surface::{RasterSurface, Surface};

use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::render::{BlitRenderer, RenderCtx, RenderTarget};

/// Window configuration.
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    /// Initial inner size. `None` opens at the surface's pixel size.
    pub initial_size: Option<Size>,
    /// Close the window when Escape is pressed.
    pub exit_on_escape: bool,
    pub gpu: GpuInit,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "sprig".to_string(),
            initial_size: None,
            exit_on_escape: true,
            gpu: GpuInit::default(),
        }
    }
}

/// Entry point for windowed hosting.
pub struct WindowRuntime;

impl WindowRuntime {
    /// Opens a window and runs `scheduler` until it stops or the window
    /// closes. Blocks the calling thread, which must be the main thread on
    /// most platforms.
    ///
    /// The scheduler is started with the first window; its timestamps are
    /// wall-clock offsets from that moment.
    pub fn run<D>(config: WindowConfig, scheduler: Scheduler<RasterSurface, D>) -> Result<()>
    where
        D: Drawable + 'static,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, scheduler);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<D: Drawable + 'static> {
    config: WindowConfig,
    scheduler: Scheduler<RasterSurface, D>,
    blit: BlitRenderer,

    entry: Option<WindowEntry>,
    origin: Instant,

    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl<D: Drawable + 'static> AppState<D> {
    fn new(config: WindowConfig, scheduler: Scheduler<RasterSurface, D>) -> Self {
        Self {
            config,
            scheduler,
            blit: BlitRenderer::new(),
            entry: None,
            origin: Instant::now(),
            exit_requested: false,
            failure: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        self.scheduler.stop();
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        self.request_exit(event_loop);
    }

    fn create_window_entry(&self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let size = self.config.initial_size.unwrap_or_else(|| {
            PhysicalSize::new(self.scheduler.width(), self.scheduler.height()).into()
        });
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu.clone();
        WindowEntryTryBuilder {
            window,
            gpu_builder: |w| {
                pollster::block_on(Gpu::new(w, gpu_init)).context("GPU initialization failed")
            },
        }
        .try_build()
    }

    /// Runs one scheduler frame and presents the result.
    ///
    /// A frame that stopped the loop is still presented before exiting.
    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let step = step_frame(&mut self.scheduler, self.origin.elapsed());

        if step.drew {
            let (scheduler, blit) = (&self.scheduler, &mut self.blit);
            if let Some(entry) = self.entry.as_mut() {
                let action = entry.with_gpu_mut(|gpu| present(gpu, blit, scheduler.surface()));
                if action == Some(SurfaceErrorAction::Fatal) {
                    self.fail(event_loop, anyhow::anyhow!("unrecoverable surface error"));
                    return;
                }
            }
        }

        if step.control == FrameControl::Stop {
            log::info!("scheduler stopped; closing window");
            self.request_exit(event_loop);
        }
    }
}

/// Outcome of one scheduler frame as seen by the presenter.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct FrameStep {
    control: FrameControl,
    /// The scheduler ran the frame, so the surface holds new pixels.
    drew: bool,
}

fn step_frame<S, D>(scheduler: &mut Scheduler<S, D>, now: Duration) -> FrameStep
where
    S: Surface,
    D: Drawable,
{
    let before = scheduler.last_frame();
    let control = scheduler.frame(now);
    FrameStep {
        control,
        drew: scheduler.last_frame() != before,
    }
}

/// Uploads the raster frame and draws it. Returns the action taken for a
/// surface error, if one occurred.
fn present(
    gpu: &mut Gpu<'_>,
    blit: &mut BlitRenderer,
    surface: &RasterSurface,
) -> Option<SurfaceErrorAction> {
    if !gpu.is_drawable() {
        return None;
    }

    let mut frame = match gpu.begin_frame() {
        Ok(f) => f,
        Err(err) => {
            log::debug!("surface error: {err:?}");
            return Some(gpu.handle_surface_error(err));
        }
    };

    let size = gpu.size();
    let ctx = RenderCtx {
        device: gpu.device(),
        queue: gpu.queue(),
        surface_format: gpu.surface_format(),
        target_size: (size.width, size.height),
    };

    let pixels = surface.pixels();
    blit.upload(&ctx, surface.width(), surface.height(), pixels.as_raw());
    {
        let mut target = RenderTarget {
            encoder: &mut frame.encoder,
            color_view: &frame.view,
        };
        blit.render(&ctx, &mut target);
    }

    gpu.submit(frame);
    None
}

impl<D: Drawable + 'static> ApplicationHandler for AppState<D> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        match self.create_window_entry(event_loop) {
            Ok(entry) => {
                entry.with_window(|w| w.request_redraw());
                self.entry = Some(entry);
            }
            Err(e) => {
                self.fail(event_loop, e.context("failed to create initial window"));
                return;
            }
        }

        self.origin = Instant::now();
        self.scheduler.start(self.origin.elapsed());
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        // Continuous redraw; FIFO present paces it to the display.
        event_loop.set_control_flow(ControlFlow::Wait);
        if let Some(entry) = self.entry.as_ref() {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                self.entry = None;
                self.request_exit(event_loop);
            }

            WindowEvent::KeyboardInput { event: key, .. }
                if self.config.exit_on_escape
                    && key.state == ElementState::Pressed
                    && key.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                if let Some(entry) = self.entry.as_mut() {
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                    entry.with_window(|w| w.request_redraw());
                }
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(entry) = self.entry.as_mut() {
                    let new_size = entry.with_window(|w| w.inner_size());
                    entry.with_gpu_mut(|gpu| gpu.resize(new_size));
                }
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprig_engine::surface::RecordingSurface;
    use sprig_engine::{Sprite, Texture};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn stopping_frame_is_still_presented() {
        let mut s: Scheduler<RecordingSurface> = Scheduler::new(RecordingSurface::new(8, 8));
        s.add_drawable(Sprite::from_texture(Texture::solid(2, 2, [255; 4])));
        let handle = s.handle();
        s.add_tick_function(move |_| handle.stop());
        s.start(ms(0));

        let step = step_frame(&mut s, ms(16));
        assert_eq!(step, FrameStep { control: FrameControl::Stop, drew: true });
        assert_eq!(s.surface().draws().count(), 1);
    }

    #[test]
    fn frames_after_stop_are_not_presented() {
        let mut s: Scheduler<RecordingSurface> = Scheduler::new(RecordingSurface::new(8, 8));
        s.start(ms(0));
        assert!(step_frame(&mut s, ms(16)).drew);

        s.stop();
        let step = step_frame(&mut s, ms(32));
        assert_eq!(step, FrameStep { control: FrameControl::Stop, drew: false });
    }

    #[test]
    fn running_frame_continues() {
        let mut s: Scheduler<RecordingSurface> = Scheduler::new(RecordingSurface::new(4, 4));
        s.start(ms(0));
        assert_eq!(
            step_frame(&mut s, ms(16)),
            FrameStep { control: FrameControl::Continue, drew: true }
        );
    }
}
