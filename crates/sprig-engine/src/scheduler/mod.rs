//! Frame scheduler.
//!
//! Responsibilities:
//! - own the surface, the drawables and the tick callbacks
//! - turn host timestamps into per-frame deltas
//! - run clear → ticks → iter ticks → draw for each granted frame
//! - keep ordering deterministic (see [`PaintOrder`])

mod config;
mod control;
mod scheduler;
mod slots;

pub use config::{LoopConfig, PaintOrder};
pub use control::LoopHandle;
pub use scheduler::{FrameControl, LoopState, Scheduler};
pub use slots::{DrawableId, IterTickId, TickId};
