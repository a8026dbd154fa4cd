//! Cross-thread scheduled callbacks.
//!
//! Every control carries a mutex-guarded FIFO of boxed callbacks. Worker
//! threads clone a [`CallbackHandle`] and schedule closures; the update
//! traversal drains each queue at the start of the owning control's tick.
//!
//! The drain takes the queue length as a snapshot while holding the lock
//! and removes exactly that prefix. Entries scheduled during invocation
//! (including from the callbacks themselves) run on the next tick, so one
//! tick's work stays bounded.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::context::UiContext;
use crate::tree::{ControlId, ControlTree};

/// A deferred closure run on the UI thread with full tree access.
pub type ScheduledCallback = Box<dyn FnOnce(&mut ControlTree, &mut UiContext) + Send + 'static>;

#[derive(Default)]
pub(crate) struct CallbackQueue {
    entries: VecDeque<ScheduledCallback>,
}

impl CallbackQueue {
    pub(crate) fn push(&mut self, callback: ScheduledCallback) {
        self.entries.push_back(callback);
    }

    /// Removes and returns the entries present right now, leaving anything
    /// pushed afterwards in place.
    pub(crate) fn drain_snapshot(&mut self) -> Vec<ScheduledCallback> {
        let count = self.entries.len();
        self.entries.drain(..count).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Cloneable scheduling handle for one control, safe to move to another
/// thread.
#[derive(Clone)]
pub struct CallbackHandle {
    pub(crate) queue: Arc<Mutex<CallbackQueue>>,
    pub(crate) id: ControlId,
}

impl CallbackHandle {
    /// Queues `callback` to run at the start of the control's next update.
    ///
    /// The queue outlives the control; scheduling onto a dead control is a
    /// no-op at drain time because the queue is no longer polled.
    pub fn schedule(
        &self,
        callback: impl FnOnce(&mut ControlTree, &mut UiContext) + Send + 'static,
    ) {
        self.queue.lock().unwrap().push(Box::new(callback));
    }

    /// The control this handle schedules onto.
    pub fn control(&self) -> ControlId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_snapshot_leaves_later_entries() {
        let mut queue = CallbackQueue::default();
        queue.push(Box::new(|_, _| {}));
        queue.push(Box::new(|_, _| {}));

        let drained = queue.drain_snapshot();
        assert_eq!(drained.len(), 2);
        assert_eq!(queue.len(), 0);

        queue.push(Box::new(|_, _| {}));
        assert_eq!(queue.drain_snapshot().len(), 1);
    }
}
