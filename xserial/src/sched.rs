//! Cooperative poll scheduling.
//!
//! Devices here have no interrupts, so a channel makes progress only when
//! something calls it. A [`PollEvent`] is the per-task "please run me"
//! latch; an [`EventLoop`] owns a fixed set of tasks and dispatches the
//! ones whose latch is set. A channel re-arms its own latch on every tick,
//! which turns the loop into a continuous poll at whatever pace the caller
//! runs it.

use log::debug;

use crate::error::{Error, ErrorKind, Result};

/// Edge latch marking a task as due.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PollEvent {
    pending: bool,
}

impl PollEvent {
    /// Creates an unarmed event.
    pub const fn new() -> Self {
        Self { pending: false }
    }

    /// Arms the event. Arming an armed event is a no-op.
    #[inline]
    pub fn trigger(&mut self) {
        self.pending = true;
    }

    /// Disarms the event.
    #[inline]
    pub fn reset(&mut self) {
        self.pending = false;
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Disarms the event, returning whether it was armed.
    #[inline]
    pub fn take(&mut self) -> bool {
        core::mem::take(&mut self.pending)
    }
}

/// Something an [`EventLoop`] can drive.
pub trait Pollable {
    /// Returns true if the task wants to run.
    fn is_pending(&self) -> bool;

    /// Runs one step of the task.
    fn dispatch(&mut self);
}

/// Handle to a task registered with an [`EventLoop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(usize);

/// Fixed-capacity cooperative event loop holding up to `MAX` tasks.
///
/// The loop owns its tasks; callers reach them through the [`TaskId`]
/// returned by [`register`](Self::register).
#[derive(Debug)]
pub struct EventLoop<T, const MAX: usize> {
    tasks: heapless::Vec<Option<T>, MAX>,
}

impl<T: Pollable, const MAX: usize> EventLoop<T, MAX> {
    /// Creates an empty loop.
    pub const fn new() -> Self {
        Self {
            tasks: heapless::Vec::new(),
        }
    }

    /// Takes ownership of `task`.
    ///
    /// Freed slots are reused before new ones are appended.
    pub fn register(&mut self, task: T) -> Result<TaskId> {
        if let Some(slot) = self.tasks.iter().position(Option::is_none) {
            self.tasks[slot] = Some(task);
            debug!("Registered task in reused slot {}", slot);
            return Ok(TaskId(slot));
        }

        let slot = self.tasks.len();
        self.tasks
            .push(Some(task))
            .map_err(|_| Error::new(ErrorKind::SchedulerFull))?;
        debug!("Registered task in slot {}", slot);
        Ok(TaskId(slot))
    }

    /// Removes a task, handing it back.
    pub fn deregister(&mut self, id: TaskId) -> Option<T> {
        let task = self.tasks.get_mut(id.0)?.take();
        if task.is_some() {
            debug!("Deregistered task in slot {}", id.0);
        }
        task
    }

    pub fn task(&self, id: TaskId) -> Option<&T> {
        self.tasks.get(id.0)?.as_ref()
    }

    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut T> {
        self.tasks.get_mut(id.0)?.as_mut()
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispatches every pending task once, in slot order.
    ///
    /// Returns the number of tasks dispatched.
    pub fn run_once(&mut self) -> usize {
        let mut dispatched = 0;
        for task in self.tasks.iter_mut().flatten() {
            if task.is_pending() {
                task.dispatch();
                dispatched += 1;
            }
        }
        dispatched
    }

    /// Runs up to `rounds` rounds, stopping early once nothing is pending.
    ///
    /// Returns the total number of dispatches.
    pub fn run(&mut self, rounds: usize) -> usize {
        let mut total = 0;
        for _ in 0..rounds {
            let dispatched = self.run_once();
            if dispatched == 0 {
                break;
            }
            total += dispatched;
        }
        total
    }
}

impl<T: Pollable, const MAX: usize> Default for EventLoop<T, MAX> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Task that re-arms itself a fixed number of times.
    struct Countdown {
        event: PollEvent,
        remaining: usize,
        runs: usize,
    }

    impl Countdown {
        fn new(remaining: usize) -> Self {
            let mut event = PollEvent::new();
            event.trigger();
            Self {
                event,
                remaining,
                runs: 0,
            }
        }
    }

    impl Pollable for Countdown {
        fn is_pending(&self) -> bool {
            self.event.is_pending()
        }

        fn dispatch(&mut self) {
            if !self.event.take() {
                return;
            }
            self.runs += 1;
            if self.remaining > 0 {
                self.remaining -= 1;
                self.event.trigger();
            }
        }
    }

    #[test]
    fn test_poll_event_latch() {
        let mut event = PollEvent::new();
        assert!(!event.take());
        event.trigger();
        event.trigger();
        assert!(event.is_pending());
        assert!(event.take());
        assert!(!event.is_pending());

        event.trigger();
        event.reset();
        assert!(!event.take());
    }

    #[test]
    fn test_run_until_idle() {
        let mut event_loop: EventLoop<Countdown, 4> = EventLoop::new();
        let a = event_loop.register(Countdown::new(2)).unwrap();
        let b = event_loop.register(Countdown::new(0)).unwrap();

        assert_eq!(event_loop.run_once(), 2);
        assert_eq!(event_loop.run(10), 2);
        assert_eq!(event_loop.task(a).unwrap().runs, 3);
        assert_eq!(event_loop.task(b).unwrap().runs, 1);
        assert_eq!(event_loop.run_once(), 0);
    }

    #[test]
    fn test_register_full() {
        let mut event_loop: EventLoop<Countdown, 1> = EventLoop::new();
        event_loop.register(Countdown::new(0)).unwrap();

        let err = event_loop.register(Countdown::new(0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchedulerFull);
    }

    #[test]
    fn test_deregister_frees_slot() {
        let mut event_loop: EventLoop<Countdown, 2> = EventLoop::new();
        let a = event_loop.register(Countdown::new(5)).unwrap();
        event_loop.register(Countdown::new(5)).unwrap();

        let task = event_loop.deregister(a).unwrap();
        assert_eq!(task.runs, 0);
        assert!(event_loop.task(a).is_none());
        assert!(event_loop.deregister(a).is_none());
        assert_eq!(event_loop.len(), 1);

        assert_eq!(event_loop.run_once(), 1);

        let c = event_loop.register(Countdown::new(0)).unwrap();
        assert_eq!(c, a);
        assert_eq!(event_loop.len(), 2);
    }
}
