use std::thread::{self, JoinHandle};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{
    current_queue_id, next_queue_id, CurrentQueueGuard, QueuedTask, TaskQueue, TaskQueueFactory,
    TaskQueuePriority,
};
use crate::Result;

/// Task queue backed by a dedicated OS thread.
///
/// Dropping the queue closes it: already posted tasks still run, then the
/// worker exits. The drop joins the worker unless it happens on the worker
/// itself, which is the case when a task releases the last owner.
pub struct ThreadTaskQueue {
    id: u64,
    name: String,
    tx: Option<mpsc::UnboundedSender<QueuedTask>>,
    worker: Option<JoinHandle<()>>,
}

impl ThreadTaskQueue {
    pub fn new(name: &str) -> Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueuedTask>();
        let id = next_queue_id();
        let queue_name = name.to_string();

        let worker = thread::Builder::new().name(name.to_string()).spawn(move || {
            let _current = CurrentQueueGuard::enter(id);
            while let Some(task) = rx.blocking_recv() {
                task();
            }
            debug!("Task queue '{}' drained", queue_name);
        })?;

        debug!("Started task queue '{}' on a dedicated thread", name);
        Ok(Self {
            id,
            name: name.to_string(),
            tx: Some(tx),
            worker: Some(worker),
        })
    }
}

impl TaskQueue for ThreadTaskQueue {
    fn post_task(&self, task: QueuedTask) {
        let Some(tx) = &self.tx else {
            return;
        };
        if tx.send(task).is_err() {
            warn!("Task queue '{}' is no longer running, dropping task", self.name);
        }
    }

    fn is_current(&self) -> bool {
        current_queue_id() == Some(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ThreadTaskQueue {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.thread().id() == thread::current().id() {
                return;
            }
            if worker.join().is_err() {
                warn!("Task queue '{}' worker panicked", self.name);
            }
        }
    }
}

/// Creates [`ThreadTaskQueue`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadTaskQueueFactory;

impl TaskQueueFactory for ThreadTaskQueueFactory {
    fn create_task_queue(&self, name: &str, priority: TaskQueuePriority) -> Result<Box<dyn TaskQueue>> {
        if priority != TaskQueuePriority::Normal {
            debug!("Thread task queue '{}' ignores priority {:?}", name, priority);
        }
        Ok(Box::new(ThreadTaskQueue::new(name)?))
    }
}
