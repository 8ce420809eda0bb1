//! Serial task queues.
//!
//! A [`TaskQueue`] runs posted closures one at a time, in post order, on its
//! own execution context. The transform delegate uses one to serialize frame
//! delivery to the sender.

mod runtime;
mod thread;

use std::cell::Cell;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::Result;

pub use runtime::{TokioTaskQueue, TokioTaskQueueFactory};
pub use thread::{ThreadTaskQueue, ThreadTaskQueueFactory};

/// A unit of work posted to a [`TaskQueue`]
pub type QueuedTask = Box<dyn FnOnce() + Send + 'static>;

/// Scheduling hint passed to a [`TaskQueueFactory`]. Backends may ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskQueuePriority {
    Low,
    #[default]
    Normal,
    High,
}

/// Single-threaded, in-order execution context
pub trait TaskQueue: Send + Sync {
    /// Enqueue `task`. Never blocks; tasks posted after the queue stopped are dropped.
    fn post_task(&self, task: QueuedTask);

    /// Whether the calling code is running inside one of this queue's tasks
    fn is_current(&self) -> bool;

    /// Human-readable queue name
    fn name(&self) -> &str;
}

/// Creates task queues
pub trait TaskQueueFactory: Send + Sync {
    fn create_task_queue(&self, name: &str, priority: TaskQueuePriority) -> Result<Box<dyn TaskQueue>>;
}

static NEXT_QUEUE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_QUEUE: Cell<Option<u64>> = const { Cell::new(None) };
}

pub(crate) fn next_queue_id() -> u64 {
    NEXT_QUEUE_ID.fetch_add(1, Ordering::Relaxed)
}

pub(crate) fn current_queue_id() -> Option<u64> {
    CURRENT_QUEUE.with(|current| current.get())
}

/// Marks the current thread as running tasks of queue `id` until dropped
pub(crate) struct CurrentQueueGuard {
    previous: Option<u64>,
}

impl CurrentQueueGuard {
    pub(crate) fn enter(id: u64) -> Self {
        let previous = CURRENT_QUEUE.with(|current| current.replace(Some(id)));
        Self { previous }
    }
}

impl Drop for CurrentQueueGuard {
    fn drop(&mut self) {
        CURRENT_QUEUE.with(|current| current.set(self.previous));
    }
}
