use std::time::{Duration, Instant};

use super::FrameSource;

/// Wall-clock frame pacing at a fixed target rate.
///
/// Frames are scheduled on a fixed grid from the first frame; if the caller
/// falls behind, the grid skips ahead instead of bursting to catch up.
#[derive(Debug, Clone)]
pub struct IntervalFrames {
    origin: Instant,
    interval: Duration,
    next_due: Duration,
    limit: Option<u64>,
    granted: u64,
}

impl IntervalFrames {
    /// Paces at `fps` frames per second. Zero falls back to 60.
    pub fn new(fps: u32) -> Self {
        let fps = if fps == 0 { 60 } else { fps };
        let interval = Duration::from_secs(1) / fps;
        Self {
            origin: Instant::now(),
            interval,
            next_due: interval,
            limit: None,
            granted: 0,
        }
    }

    /// Stops granting frames after `frames`.
    pub fn with_limit(mut self, frames: u64) -> Self {
        self.limit = Some(frames);
        self
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    #[inline]
    pub fn granted(&self) -> u64 {
        self.granted
    }
}

impl FrameSource for IntervalFrames {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }

    fn next_frame(&mut self) -> Option<Duration> {
        if self.limit.is_some_and(|limit| self.granted >= limit) {
            return None;
        }

        let now = self.origin.elapsed();
        if now < self.next_due {
            std::thread::sleep(self.next_due - now);
        } else if now > self.next_due + self.interval {
            let behind = (now - self.next_due).as_nanos() / self.interval.as_nanos().max(1);
            log::trace!("frame pacing fell behind by {behind} intervals");
            self.next_due += self.interval * u32::try_from(behind).unwrap_or(u32::MAX);
        }

        self.next_due += self.interval;
        self.granted += 1;
        Some(self.origin.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fps_falls_back() {
        assert_eq!(IntervalFrames::new(0).interval(), Duration::from_secs(1) / 60);
    }

    #[test]
    fn limit_and_monotonic_timestamps() {
        let mut src = IntervalFrames::new(1_000).with_limit(3);
        let start = src.now();

        let mut last = start;
        for _ in 0..3 {
            let t = src.next_frame().unwrap();
            assert!(t >= last);
            last = t;
        }
        assert_eq!(src.next_frame(), None);
        assert_eq!(src.granted(), 3);
        assert!(last - start >= Duration::from_millis(2));
    }
}
