use core::fmt;
use std::time::Duration;

use crate::coords::{Affine, Rect};
use crate::error::EngineError;
use crate::sprite::{Drawable, Sprite};
use crate::surface::Surface;
use crate::time::{FrameClock, FrameTime};

use super::control::Command;
use super::slots::Slots;
use super::{DrawableId, IterTickId, LoopConfig, LoopHandle, PaintOrder, TickId};

type TickFn = Box<dyn FnMut(Duration)>;
type IterTickFn<D> = Box<dyn FnMut(Duration, &mut D)>;

/// Lifecycle of a scheduler.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    /// Constructed, `start` not called yet.
    Idle,
    Running,
    Stopped,
}

/// What the host should do after a frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FrameControl {
    /// Request another frame.
    Continue,
    /// The loop is not running; stop requesting frames.
    Stop,
}

/// Owns a surface, a set of drawables and the tick callbacks, and runs one
/// clear → tick → draw pass per frame granted by the host.
///
/// Frame order:
/// 1. pending [`LoopHandle`] requests are applied
/// 2. every drawable is `prepare`d
/// 3. the whole surface is cleared under the identity transform
/// 4. plain tick callbacks run, most recently added first
/// 5. iter tick callbacks run, most recently added first; each visits the
///    drawables most recently added first
/// 6. pending requests are applied again
/// 7. drawables paint in the configured [`PaintOrder`]
///
/// Constructing a scheduler has no side effects; nothing runs until
/// [`Scheduler::start`] and the first [`Scheduler::frame`].
pub struct Scheduler<S, D = Sprite> {
    surface: S,
    config: LoopConfig,

    drawables: Slots<D>,
    ticks: Slots<TickFn>,
    iter_ticks: Slots<IterTickFn<D>>,

    clock: FrameClock,
    last_frame: Option<FrameTime>,
    state: LoopState,
    handle: LoopHandle,
}

impl<S: Surface, D: Drawable> Scheduler<S, D> {
    pub fn new(surface: S) -> Self {
        Self::with_config(surface, LoopConfig::default())
    }

    pub fn with_config(surface: S, config: LoopConfig) -> Self {
        Self {
            surface,
            clock: FrameClock::new(Duration::ZERO).with_max_dt(config.max_dt),
            config,
            drawables: Slots::new(),
            ticks: Slots::new(),
            iter_ticks: Slots::new(),
            last_frame: None,
            state: LoopState::Idle,
            handle: LoopHandle::default(),
        }
    }

    /// Builds a scheduler over the surface `lookup` resolves for `selector`.
    pub fn from_lookup<F>(selector: &str, lookup: F) -> Result<Self, EngineError>
    where
        F: FnOnce(&str) -> Option<S>,
    {
        lookup(selector)
            .map(Self::new)
            .ok_or_else(|| EngineError::SurfaceNotFound(selector.to_string()))
    }

    // ── surface ───────────────────────────────────────────────────────────

    #[inline]
    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    #[inline]
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    #[inline]
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    // ── drawables ─────────────────────────────────────────────────────────

    /// Registers a drawable. Registration order decides paint order.
    pub fn add_drawable(&mut self, drawable: D) -> DrawableId {
        DrawableId(self.drawables.push(drawable))
    }

    /// Unregisters a drawable and hands it back.
    ///
    /// Returns `None` for an id that was already removed.
    pub fn remove_drawable(&mut self, id: DrawableId) -> Option<D> {
        self.drawables.remove(id.0)
    }

    pub fn drawable(&self, id: DrawableId) -> Option<&D> {
        self.drawables.get(id.0)
    }

    pub fn drawable_mut(&mut self, id: DrawableId) -> Option<&mut D> {
        self.drawables.get_mut(id.0)
    }

    /// Live drawables in registration order.
    pub fn drawables(&self) -> impl DoubleEndedIterator<Item = (DrawableId, &D)> {
        self.drawables.indexed().map(|(i, d)| (DrawableId(i), d))
    }

    /// Number of live drawables.
    #[inline]
    pub fn len(&self) -> usize {
        self.drawables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.drawables.len() == 0
    }

    // ── tick callbacks ────────────────────────────────────────────────────

    /// Registers a callback invoked once per frame with the frame delta.
    pub fn add_tick_function<F>(&mut self, f: F) -> TickId
    where
        F: FnMut(Duration) + 'static,
    {
        TickId(self.ticks.push(Box::new(f)))
    }

    pub fn remove_tick_function(&mut self, id: TickId) -> bool {
        self.ticks.remove(id.0).is_some()
    }

    /// Registers a callback invoked once per frame for every drawable.
    pub fn add_tick_iter_function<F>(&mut self, f: F) -> IterTickId
    where
        F: FnMut(Duration, &mut D) + 'static,
    {
        IterTickId(self.iter_ticks.push(Box::new(f)))
    }

    pub fn remove_tick_iter_function(&mut self, id: IterTickId) -> bool {
        self.iter_ticks.remove(id.0).is_some()
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    /// Handle for requesting changes from inside tick callbacks.
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Timing of the most recent frame, if any ran.
    #[inline]
    pub fn last_frame(&self) -> Option<FrameTime> {
        self.last_frame
    }

    /// Starts the loop; the first frame's delta is measured from `now`.
    ///
    /// Starting a running loop does nothing. A stopped loop may be started
    /// again; its clock baseline moves to `now` and frame numbering
    /// continues.
    pub fn start(&mut self, now: Duration) {
        if self.is_running() {
            log::warn!("scheduler already running; start ignored");
            return;
        }
        self.clock.reset(now);
        self.state = LoopState::Running;
        log::info!(
            "scheduler started: {}x{}, {} drawables, {} ticks, {} iter ticks",
            self.width(),
            self.height(),
            self.drawables.len(),
            self.ticks.len(),
            self.iter_ticks.len(),
        );
    }

    /// Stops the loop. Further frames are ignored until the next `start`.
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            log::info!(
                "scheduler stopped after {} frames",
                self.last_frame.map_or(0, |f| f.frame_index + 1)
            );
        }
        self.state = LoopState::Stopped;
    }

    /// Runs one frame at host timestamp `now`.
    ///
    /// Returns [`FrameControl::Stop`] without touching the surface if the
    /// loop is not running. A stop requested during the frame still lets the
    /// frame finish drawing.
    pub fn frame(&mut self, now: Duration) -> FrameControl {
        self.apply_pending();
        if !self.is_running() {
            return FrameControl::Stop;
        }

        let time = self.clock.tick(now);
        self.last_frame = Some(time);
        let dt = time.dt;

        for d in self.drawables.iter_mut() {
            d.prepare();
        }

        self.clear();

        for tick in self.ticks.iter_mut().rev() {
            tick(dt);
        }

        for tick in self.iter_ticks.iter_mut().rev() {
            for d in self.drawables.iter_mut().rev() {
                tick(dt, d);
            }
        }

        self.apply_pending();
        self.paint();

        log::trace!(
            "frame {} dt={:?} drawables={}",
            time.frame_index,
            dt,
            self.drawables.len()
        );

        if self.is_running() {
            FrameControl::Continue
        } else {
            FrameControl::Stop
        }
    }

    /// Clears the full surface under the identity transform, whatever
    /// transform a callback left behind.
    fn clear(&mut self) {
        let (w, h) = (self.surface.width() as f32, self.surface.height() as f32);
        self.surface.save();
        self.surface.set_transform(Affine::IDENTITY);
        self.surface.clear_rect(Rect::from_size(w, h));
        self.surface.restore();
    }

    fn paint(&mut self) {
        let surface: &mut dyn Surface = &mut self.surface;
        match self.config.paint_order {
            PaintOrder::FirstAddedOnTop => {
                for d in self.drawables.iter().rev() {
                    d.draw(surface);
                }
            }
            PaintOrder::LastAddedOnTop => {
                for d in self.drawables.iter() {
                    d.draw(surface);
                }
            }
        }
    }

    fn apply_pending(&mut self) {
        for cmd in self.handle.drain() {
            match cmd {
                Command::Stop => self.stop(),
                Command::RemoveDrawable(id) => {
                    self.drawables.remove(id.0);
                }
                Command::RemoveTick(id) => {
                    self.ticks.remove(id.0);
                }
                Command::RemoveIterTick(id) => {
                    self.iter_ticks.remove(id.0);
                }
            }
        }
    }
}

impl<S: Surface, D> fmt::Debug for Scheduler<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("width", &self.surface.width())
            .field("height", &self.surface.height())
            .field("config", &self.config)
            .field("state", &self.state)
            .field("drawables", &self.drawables.len())
            .field("ticks", &self.ticks.len())
            .field("iter_ticks", &self.iter_ticks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::surface::{RecordingSurface, SurfaceOp};
    use crate::texture::{ImageHandle, Texture};

    const WHITE: [u8; 4] = [255; 4];

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    /// Sprite whose image width identifies it in recorded draws.
    fn tagged(width: u32) -> Sprite {
        Sprite::from_texture(Texture::solid(width, 1, WHITE))
    }

    fn drawn_widths(surface: &RecordingSurface) -> Vec<u32> {
        surface
            .draws()
            .filter_map(|op| match op {
                SurfaceOp::DrawImage { image_width, .. } => Some(*image_width),
                _ => None,
            })
            .collect()
    }

    fn running() -> Scheduler<RecordingSurface> {
        let mut s = Scheduler::new(RecordingSurface::new(64, 32));
        s.start(ms(0));
        s
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn construction_has_no_side_effects() {
        let mut s: Scheduler<RecordingSurface> = Scheduler::new(RecordingSurface::new(8, 8));
        s.add_drawable(tagged(1));
        s.add_tick_function(|_| panic!("tick ran before start"));

        assert_eq!(s.state(), LoopState::Idle);
        assert_eq!(s.frame(ms(16)), FrameControl::Stop);
        assert!(s.surface().ops().is_empty());
    }

    #[test]
    fn lookup_failure_is_reported() {
        let res: Result<Scheduler<RecordingSurface>, _> =
            Scheduler::from_lookup("#missing", |_| None);
        assert!(matches!(res, Err(EngineError::SurfaceNotFound(sel)) if sel == "#missing"));

        let ok: Scheduler<RecordingSurface> =
            Scheduler::from_lookup("main", |sel| {
                (sel == "main").then(|| RecordingSurface::new(10, 20))
            })
            .unwrap();
        assert_eq!((ok.width(), ok.height()), (10, 20));
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn first_added_paints_last() {
        let mut s = running();
        s.add_drawable(tagged(1));
        s.add_drawable(tagged(2));
        s.add_drawable(tagged(3));

        s.frame(ms(16));
        assert_eq!(drawn_widths(s.surface()), vec![3, 2, 1]);
    }

    #[test]
    fn last_added_on_top_paints_in_registration_order() {
        let config = LoopConfig {
            paint_order: PaintOrder::LastAddedOnTop,
            ..LoopConfig::default()
        };
        let mut s: Scheduler<RecordingSurface> =
            Scheduler::with_config(RecordingSurface::new(8, 8), config);
        s.add_drawable(tagged(1));
        s.add_drawable(tagged(2));
        s.add_drawable(tagged(3));
        s.start(ms(0));

        s.frame(ms(16));
        assert_eq!(drawn_widths(s.surface()), vec![1, 2, 3]);
    }

    #[test]
    fn ticks_then_iter_ticks_in_reverse() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let mut s = running();
        s.add_drawable(tagged(1));
        s.add_drawable(tagged(2));

        let l = log.clone();
        s.add_tick_function(move |_| l.borrow_mut().push("T1".into()));
        let l = log.clone();
        s.add_tick_function(move |_| l.borrow_mut().push("T2".into()));
        let l = log.clone();
        s.add_tick_iter_function(move |_, sp: &mut Sprite| {
            let w = sp.natural_size().map_or(0.0, |n| n.x);
            l.borrow_mut().push(format!("I1:{w}"));
        });

        s.frame(ms(16));
        assert_eq!(*log.borrow(), vec!["T2", "T1", "I1:2", "I1:1"]);
    }

    #[test]
    fn each_iter_tick_visits_all_drawables_before_the_next() {
        let log = Rc::new(RefCell::new(Vec::<String>::new()));
        let mut s = running();
        for w in 1..=3 {
            s.add_drawable(tagged(w));
        }

        for name in ["I1", "I2"] {
            let l = log.clone();
            s.add_tick_iter_function(move |_, sp: &mut Sprite| {
                let w = sp.natural_size().map_or(0.0, |n| n.x);
                l.borrow_mut().push(format!("{name}:{w}"));
            });
        }

        s.frame(ms(16));
        assert_eq!(
            *log.borrow(),
            vec!["I2:3", "I2:2", "I2:1", "I1:3", "I1:2", "I1:1"]
        );
    }

    #[test]
    fn iter_tick_changes_show_up_in_same_frame() {
        let mut s = running();
        s.add_drawable(tagged(4));
        s.add_tick_iter_function(|_, sp: &mut Sprite| sp.translate(5.0, 0.0));

        s.frame(ms(16));
        let draw = s.surface().draws().next().cloned();
        match draw {
            Some(SurfaceOp::DrawImage { transform, .. }) => assert_eq!(transform.e, 5.0),
            other => panic!("expected draw, got {other:?}"),
        }
    }

    // ── timing ────────────────────────────────────────────────────────────

    #[test]
    fn dt_is_the_timestamp_difference() {
        let dts = Rc::new(RefCell::new(Vec::new()));
        let mut s: Scheduler<RecordingSurface> = Scheduler::new(RecordingSurface::new(4, 4));
        let d = dts.clone();
        s.add_tick_function(move |dt| d.borrow_mut().push(dt));

        s.start(ms(100));
        s.frame(ms(116));
        s.frame(ms(149));

        assert_eq!(*dts.borrow(), vec![ms(16), ms(33)]);
        assert_eq!(s.last_frame().map(|f| f.frame_index), Some(1));
    }

    #[test]
    fn max_dt_caps_reported_delta() {
        let dts = Rc::new(RefCell::new(Vec::new()));
        let config = LoopConfig {
            max_dt: Some(ms(50)),
            ..LoopConfig::default()
        };
        let mut s: Scheduler<RecordingSurface> =
            Scheduler::with_config(RecordingSurface::new(4, 4), config);
        let d = dts.clone();
        s.add_tick_function(move |dt| d.borrow_mut().push(dt));

        s.start(ms(0));
        s.frame(ms(5_000));
        assert_eq!(*dts.borrow(), vec![ms(50)]);
    }

    // ── clear ─────────────────────────────────────────────────────────────

    #[test]
    fn clear_uses_identity_and_full_rect() {
        let mut s = running();
        s.surface_mut().translate(7.0, 9.0);
        s.surface_mut().take_ops();

        s.frame(ms(16));
        let ops = s.surface().ops();
        assert_eq!(
            &ops[..4],
            &[
                SurfaceOp::Save,
                SurfaceOp::SetTransform(Affine::IDENTITY),
                SurfaceOp::ClearRect {
                    rect: Rect::from_size(64.0, 32.0),
                    transform: Affine::IDENTITY,
                },
                SurfaceOp::Restore,
            ]
        );
        assert_eq!(s.surface().current_transform(), Affine::translation(7.0, 9.0));
    }

    // ── readiness ─────────────────────────────────────────────────────────

    #[test]
    fn pending_sprite_never_draws() {
        let (handle, _loader) = ImageHandle::pending();
        let mut s = running();
        s.add_drawable(Sprite::new(handle));

        for i in 1..=5 {
            s.frame(ms(16 * i));
        }
        assert_eq!(s.surface().draws().count(), 0);
    }

    #[test]
    fn sprite_draws_once_image_arrives() {
        let (handle, loader) = ImageHandle::pending();
        let mut s = running();
        s.add_drawable(Sprite::new(handle));

        s.frame(ms(16));
        assert_eq!(s.surface().draws().count(), 0);

        loader.complete(Texture::solid(6, 3, WHITE));
        s.frame(ms(32));
        assert_eq!(drawn_widths(s.surface()), vec![6]);
    }

    // ── deferred control ──────────────────────────────────────────────────

    #[test]
    fn stop_from_tick_finishes_current_frame() {
        let mut s = running();
        s.add_drawable(tagged(1));
        let handle = s.handle();
        s.add_tick_function(move |_| handle.stop());

        assert_eq!(s.frame(ms(16)), FrameControl::Stop);
        assert_eq!(s.surface().draws().count(), 1);
        assert_eq!(s.state(), LoopState::Stopped);

        s.surface_mut().take_ops();
        assert_eq!(s.frame(ms(32)), FrameControl::Stop);
        assert!(s.surface().ops().is_empty());
    }

    #[test]
    fn removal_from_tick_applies_before_draw() {
        let mut s = running();
        let a = s.add_drawable(tagged(1));
        s.add_drawable(tagged(2));
        let handle = s.handle();
        s.add_tick_function(move |_| handle.remove_drawable(a));

        s.frame(ms(16));
        assert_eq!(drawn_widths(s.surface()), vec![2]);
        assert!(s.drawable(a).is_none());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn removed_tick_stops_running() {
        let count = Rc::new(RefCell::new(0));
        let mut s = running();
        let c = count.clone();
        let id = s.add_tick_function(move |_| *c.borrow_mut() += 1);

        s.frame(ms(16));
        assert!(s.remove_tick_function(id));
        assert!(!s.remove_tick_function(id));
        s.frame(ms(32));

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn len_counts_live_drawables() {
        let mut s = running();
        assert!(s.is_empty());

        let a = s.add_drawable(tagged(1));
        s.add_drawable(tagged(2));
        assert_eq!(s.len(), 2);
        assert!(!s.is_empty());

        s.remove_drawable(a);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn ids_stay_valid_across_removals() {
        let mut s = running();
        let a = s.add_drawable(tagged(1));
        let b = s.add_drawable(tagged(2));
        let c = s.add_drawable(tagged(3));

        assert!(s.remove_drawable(b).is_some());
        let d = s.add_drawable(tagged(4));

        assert_ne!(d, b);
        assert!(s.drawable(a).is_some());
        assert!(s.drawable(c).is_some());
        let order: Vec<_> = s.drawables().map(|(id, _)| id).collect();
        assert_eq!(order, vec![a, c, d]);

        s.frame(ms(16));
        assert_eq!(drawn_widths(s.surface()), vec![4, 3, 1]);
    }

    #[test]
    fn restart_measures_from_new_start() {
        let dts = Rc::new(RefCell::new(Vec::new()));
        let mut s = running();
        let d = dts.clone();
        s.add_tick_function(move |dt| d.borrow_mut().push(dt));

        s.frame(ms(10));
        s.stop();
        assert_eq!(s.frame(ms(20)), FrameControl::Stop);

        s.start(ms(1_000));
        s.frame(ms(1_004));
        assert_eq!(*dts.borrow(), vec![ms(10), ms(4)]);
    }
}
