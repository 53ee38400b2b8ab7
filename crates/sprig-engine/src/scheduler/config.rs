use std::time::Duration;

/// Stacking policy for drawables.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum PaintOrder {
    /// Drawables paint in reverse registration order: the last added paints
    /// first, so the first added ends up on top of everything it overlaps.
    #[default]
    FirstAddedOnTop,
    /// Drawables paint in registration order; the last added is on top.
    LastAddedOnTop,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Default)]
pub struct LoopConfig {
    pub paint_order: PaintOrder,
    /// Upper bound for the `dt` handed to tick callbacks. `None` reports
    /// the raw delta, however large.
    pub max_dt: Option<Duration>,
}
