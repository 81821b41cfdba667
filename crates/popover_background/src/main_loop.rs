//! Deferred work for the UI thread's event loop
//!
//! The host drains the queue once per loop iteration with
//! [`MainLoop::run_pending`]. Tasks queued while a batch is running wait for
//! the next tick, so a deferred task always runs after the unit of work that
//! scheduled it has finished.

use std::cell::RefCell;
use std::collections::VecDeque;

type Task = Box<dyn FnOnce()>;

thread_local! {
    static PENDING: RefCell<VecDeque<Task>> = RefCell::new(VecDeque::new());
}

/// Handle to the current thread's deferred task queue
pub struct MainLoop;

impl MainLoop {
    /// Queue a task for the next tick
    ///
    /// Once the thread is shutting down there is no next tick and the task is
    /// dropped unrun.
    pub fn defer(task: impl FnOnce() + 'static) {
        let _ = PENDING.try_with(|pending| pending.borrow_mut().push_back(Box::new(task)));
    }

    /// Run every task queued before this call; returns how many ran
    pub fn run_pending() -> usize {
        let batch = PENDING.with(|pending| std::mem::take(&mut *pending.borrow_mut()));
        let count = batch.len();
        for task in batch {
            task();
        }
        if count > 0 {
            tracing::trace!(count, "ran deferred tasks");
        }
        count
    }

    /// Number of tasks waiting for the next tick
    pub fn pending_count() -> usize {
        PENDING.with(|pending| pending.borrow().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_tasks_run_in_order_on_tick() {
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            MainLoop::defer(move || log.borrow_mut().push(i));
        }

        assert!(log.borrow().is_empty());
        assert_eq!(MainLoop::pending_count(), 3);
        assert_eq!(MainLoop::run_pending(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert_eq!(MainLoop::run_pending(), 0);
    }

    #[test]
    fn test_task_deferred_during_tick_waits_for_next_tick() {
        let ran = Rc::new(Cell::new(false));
        let inner = ran.clone();
        MainLoop::defer(move || {
            MainLoop::defer(move || inner.set(true));
        });

        assert_eq!(MainLoop::run_pending(), 1);
        assert!(!ran.get());
        assert_eq!(MainLoop::run_pending(), 1);
        assert!(ran.get());
    }
}
