// SPDX-License-Identifier: LGPL-3.0-only

//! Deferred work on the engine thread.
//!
//! The engine never blocks and never runs work concurrently. The only thing it
//! defers is cleanup that must happen on the *next* turn of the host's event
//! queue, such as removing the transition-suppression stylesheet after the
//! browser has committed a paint. [Scheduler] is that boundary.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

/// Queues work for a later turn of the event loop.
pub trait Scheduler {
    /// Run `task` on a later turn, never synchronously inside this call.
    fn defer(&self, task: Task);
}

/// A host-driven task queue.
///
/// Each call to [TaskQueue::run_tick] is one turn of the event loop: it runs
/// exactly the tasks that were queued before the call. Tasks queued while the
/// tick runs wait for the next tick. Clones share the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    queue: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one tick. Returns the number of tasks that ran.
    pub fn run_tick(&self) -> usize {
        let due = self.queue.borrow().len();
        let mut ran = 0;
        while ran < due {
            // Pop before running so the task can queue more work.
            let task = self.queue.borrow_mut().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                },
                None => break,
            }
        }
        if ran > 0 {
            log::trace!("Task queue tick ran {} task(s)", ran);
        }
        ran
    }

    /// Run ticks until the queue is empty or `max_ticks` ticks have run.
    ///
    /// Returns the number of ticks that ran.
    pub fn run_until_idle(&self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && !self.is_idle() {
            self.run_tick();
            ticks += 1;
        }
        ticks
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Whether nothing is queued.
    pub fn is_idle(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl Scheduler for TaskQueue {
    fn defer(&self, task: Task) {
        self.queue.borrow_mut().push_back(task);
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending())
            .finish()
    }
}
