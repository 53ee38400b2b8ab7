//! Time subsystem.
//!
//! Frame timestamps come from the host (a [`crate::host::FrameSource`] or a
//! window's redraw loop) as a monotonic `Duration` since an arbitrary origin.
//! `FrameClock` turns successive timestamps into per-frame deltas:
//! - one `FrameClock` per loop
//! - call `tick(now)` once per granted frame to obtain `FrameTime`

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
