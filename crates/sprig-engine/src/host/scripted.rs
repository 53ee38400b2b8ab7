use std::collections::VecDeque;
use std::time::Duration;

use super::FrameSource;

/// Replays a fixed sequence of frame timestamps.
///
/// Never sleeps. Useful for deterministic tests and for rendering a known
/// number of frames offline.
#[derive(Debug, Clone)]
pub struct ScriptedFrames {
    now: Duration,
    frames: VecDeque<Duration>,
}

impl ScriptedFrames {
    /// `start` is the time reported before the first frame.
    pub fn new(start: Duration, frames: impl IntoIterator<Item = Duration>) -> Self {
        Self {
            now: start,
            frames: frames.into_iter().collect(),
        }
    }

    /// `count` frames spaced `interval` apart, starting from zero.
    pub fn every(interval: Duration, count: u32) -> Self {
        Self::new(Duration::ZERO, (1..=count).map(|i| interval * i))
    }

    /// Frames not handed out yet.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for ScriptedFrames {
    fn now(&mut self) -> Duration {
        self.now
    }

    fn next_frame(&mut self) -> Option<Duration> {
        let next = self.frames.pop_front()?;
        self.now = next;
        Some(next)
    }
}
