use std::fmt;
use std::sync::{Arc, Mutex};

use crate::semaphore::Semaphore;
use crate::task::TaskValue;

/// One-shot channel between the worker that runs a task and the submitter
/// holding the task's [`TaskResult`].
///
/// Jointly owned by the queue entry and the handle, so a submitter dropping
/// its handle early leaves the worker with a harmless write into a slot
/// nobody will read.
#[derive(Debug)]
pub(crate) struct Completion {
    ready: Semaphore,
    slot: Mutex<Option<TaskValue>>,
}

impl Completion {
    pub(crate) fn new() -> Self {
        Self {
            ready: Semaphore::new(0),
            slot: Mutex::new(None),
        }
    }

    /// Stores the produced value and wakes the submitter. Called once, by
    /// the worker that executed the task.
    pub(crate) fn complete(&self, value: TaskValue) {
        *self.slot.lock().unwrap() = Some(value);
        self.ready.post();
    }

    fn take(&self) -> TaskValue {
        self.ready.wait();
        self.slot.lock().unwrap().take().unwrap_or_else(TaskValue::empty)
    }
}

/// Handle through which a submitter retrieves one task's produced value.
///
/// Returned by [`ThreadPool::submit`](crate::ThreadPool::submit). The handle
/// is move-only; ownership of the pending value travels with it.
pub struct TaskResult {
    completion: Arc<Completion>,
    valid: bool,
}

impl TaskResult {
    pub(crate) fn bound(completion: Arc<Completion>) -> Self {
        Self {
            completion,
            valid: true,
        }
    }

    /// Handle for a rejected submission; `get` returns the empty sentinel
    /// without blocking.
    pub(crate) fn rejected() -> Self {
        Self {
            completion: Arc::new(Completion::new()),
            valid: false,
        }
    }

    /// False when the submission was rejected (queue full past the deadline).
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Retrieves the task's value, blocking until the task has run.
    ///
    /// On an invalid handle this returns [`TaskValue::empty`] immediately.
    pub fn get(self) -> TaskValue {
        if !self.valid {
            return TaskValue::empty();
        }
        self.completion.take()
    }
}

impl fmt::Debug for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskResult")
            .field("valid", &self.valid)
            .finish()
    }
}
