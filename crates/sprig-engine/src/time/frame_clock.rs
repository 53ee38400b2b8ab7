use std::time::Duration;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameTime {
    /// Time elapsed since the previous frame (or since `start`).
    pub dt: Duration,

    /// Host timestamp of this frame.
    pub now: Duration,

    /// Monotonic frame counter, starting at 0.
    pub frame_index: u64,
}

/// Turns host timestamps into `FrameTime` snapshots.
///
/// Unlike a free-running clock, `FrameClock` never reads the time itself:
/// the host passes the timestamp in, so tests can inject any sequence.
///
/// No clamping happens unless configured with [`FrameClock::with_max_dt`];
/// after a stall (minimized window, debugger) the full delta is reported.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Duration,
    frame_index: u64,
    max_dt: Option<Duration>,
}

impl FrameClock {
    /// Creates a clock whose first delta is measured from `start`.
    pub fn new(start: Duration) -> Self {
        Self {
            last: start,
            frame_index: 0,
            max_dt: None,
        }
    }

    /// Caps every reported delta at `max_dt`.
    pub fn with_max_dt(mut self, max_dt: Option<Duration>) -> Self {
        self.max_dt = max_dt;
        self
    }

    /// Resets the baseline without touching the frame counter.
    pub fn reset(&mut self, now: Duration) {
        self.last = now;
    }

    /// Timestamp of the most recent tick (or the start time).
    pub fn last(&self) -> Duration {
        self.last
    }

    /// Advances the clock to `now` and returns the frame snapshot.
    ///
    /// A timestamp earlier than the previous one yields a zero delta.
    pub fn tick(&mut self, now: Duration) -> FrameTime {
        let mut dt = now.saturating_sub(self.last);
        if let Some(max) = self.max_dt {
            dt = dt.min(max);
        }

        self.last = now;

        let ft = FrameTime {
            dt,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn dt_is_exact_difference() {
        let mut clock = FrameClock::new(ms(100));
        let first = clock.tick(Duration::from_micros(116_667));
        let second = clock.tick(Duration::from_micros(133_334));
        assert_eq!(first.dt, Duration::from_micros(16_667));
        assert_eq!(second.dt, Duration::from_micros(133_334) - Duration::from_micros(116_667));
        assert_eq!(second.frame_index, 1);
    }

    #[test]
    fn large_stall_is_not_clamped_by_default() {
        let mut clock = FrameClock::new(ms(0));
        assert_eq!(clock.tick(ms(30_000)).dt, ms(30_000));
    }

    #[test]
    fn max_dt_caps_delta() {
        let mut clock = FrameClock::new(ms(0)).with_max_dt(Some(ms(250)));
        assert_eq!(clock.tick(ms(5_000)).dt, ms(250));
        assert_eq!(clock.tick(ms(5_016)).dt, ms(16));
    }

    #[test]
    fn backwards_timestamp_saturates() {
        let mut clock = FrameClock::new(ms(50));
        assert_eq!(clock.tick(ms(40)).dt, Duration::ZERO);
        assert_eq!(clock.last(), ms(40));
    }

    #[test]
    fn reset_moves_baseline_and_keeps_counting() {
        let mut clock = FrameClock::new(ms(0));
        clock.tick(ms(16));
        clock.reset(ms(1_000));

        let ft = clock.tick(ms(1_010));
        assert_eq!(ft.dt, ms(10));
        assert_eq!(ft.frame_index, 1);
    }
}
