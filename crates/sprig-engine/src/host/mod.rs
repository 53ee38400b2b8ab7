//! Frame sources and the blocking run loop.
//!
//! A host decides *when* frames happen and what time it is. The scheduler
//! only consumes the timestamps:
//! - [`IntervalFrames`]: wall-clock pacing at a target rate
//! - [`ScriptedFrames`]: a fixed list of timestamps, for tests and offline
//!   rendering
//!
//! Windowed hosts drive [`crate::Scheduler::frame`] from their own redraw
//! loop instead of going through [`run`].

mod interval;
mod scripted;

pub use interval::IntervalFrames;
pub use scripted::ScriptedFrames;

use std::time::Duration;

use crate::scheduler::{FrameControl, Scheduler};
use crate::sprite::Drawable;
use crate::surface::Surface;

/// Grants frames and reports their timestamps.
///
/// Timestamps are monotonic offsets from an arbitrary origin shared by
/// `now` and `next_frame`.
pub trait FrameSource {
    /// Current host time.
    fn now(&mut self) -> Duration;

    /// Blocks until the next frame is due and returns its timestamp, or
    /// `None` when the source has no more frames to give.
    fn next_frame(&mut self) -> Option<Duration>;
}

/// Starts `scheduler` at the source's current time and feeds it frames
/// until either side stops. Returns the number of frames run.
pub fn run<S, D, F>(scheduler: &mut Scheduler<S, D>, source: &mut F) -> u64
where
    S: Surface,
    D: Drawable,
    F: FrameSource + ?Sized,
{
    scheduler.start(source.now());

    let mut frames = 0;
    while scheduler.is_running() {
        let Some(now) = source.next_frame() else {
            log::debug!("frame source exhausted after {frames} frames");
            scheduler.stop();
            break;
        };

        frames += 1;
        if scheduler.frame(now) == FrameControl::Stop {
            break;
        }
    }
    frames
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sprite::Sprite;
    use crate::surface::RecordingSurface;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn runs_until_source_is_exhausted() {
        let dts = Rc::new(RefCell::new(Vec::new()));
        let mut s: Scheduler<RecordingSurface, Sprite> = Scheduler::new(RecordingSurface::new(4, 4));
        let d = dts.clone();
        s.add_tick_function(move |dt| d.borrow_mut().push(dt));

        let mut source = ScriptedFrames::new(ms(0), [ms(10), ms(25), ms(45)]);
        assert_eq!(run(&mut s, &mut source), 3);

        assert_eq!(*dts.borrow(), vec![ms(10), ms(15), ms(20)]);
        assert!(!s.is_running());
    }

    #[test]
    fn stop_from_tick_ends_the_run() {
        let mut s: Scheduler<RecordingSurface> = Scheduler::new(RecordingSurface::new(4, 4));
        let handle = s.handle();
        let mut count = 0;
        s.add_tick_function(move |_| {
            count += 1;
            if count == 2 {
                handle.stop();
            }
        });

        let mut source = ScriptedFrames::every(ms(16), 10);
        assert_eq!(run(&mut s, &mut source), 2);
        assert_eq!(source.remaining(), 8);
    }

    #[test]
    fn empty_source_runs_nothing() {
        let mut s: Scheduler<RecordingSurface> = Scheduler::new(RecordingSurface::new(4, 4));
        let mut source = ScriptedFrames::new(ms(0), []);
        assert_eq!(run(&mut s, &mut source), 0);
        assert!(s.surface().ops().is_empty());
    }
}
