use std::cell::RefCell;
use std::rc::Rc;

use super::{DrawableId, IterTickId, TickId};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum Command {
    Stop,
    RemoveDrawable(DrawableId),
    RemoveTick(TickId),
    RemoveIterTick(IterTickId),
}

/// Deferred control over a running scheduler.
///
/// Tick callbacks cannot borrow the scheduler that is calling them; they
/// capture a `LoopHandle` instead. Requests are queued and applied by the
/// scheduler at the start of the next frame and between the tick phase and
/// the draw phase of the current one.
///
/// ```ignore
/// let handle = scheduler.handle();
/// scheduler.add_tick_function(move |_dt| handle.stop());
/// ```
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    queue: Rc<RefCell<Vec<Command>>>,
}

impl LoopHandle {
    /// Stops the loop once the current frame has been drawn.
    pub fn stop(&self) {
        self.push(Command::Stop);
    }

    pub fn remove_drawable(&self, id: DrawableId) {
        self.push(Command::RemoveDrawable(id));
    }

    pub fn remove_tick_function(&self, id: TickId) {
        self.push(Command::RemoveTick(id));
    }

    pub fn remove_tick_iter_function(&self, id: IterTickId) {
        self.push(Command::RemoveIterTick(id));
    }

    fn push(&self, cmd: Command) {
        self.queue.borrow_mut().push(cmd);
    }

    pub(crate) fn drain(&self) -> Vec<Command> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}
