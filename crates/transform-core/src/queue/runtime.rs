use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{
    current_queue_id, next_queue_id, CurrentQueueGuard, QueuedTask, TaskQueue, TaskQueueFactory,
    TaskQueuePriority,
};
use crate::error::Error;
use crate::Result;

/// Task queue drained by a single task spawned on a tokio runtime.
///
/// Tasks are plain closures and run inline on the runtime's worker, so they
/// should not block for long.
pub struct TokioTaskQueue {
    id: u64,
    name: String,
    tx: mpsc::UnboundedSender<QueuedTask>,
}

impl TokioTaskQueue {
    pub fn new(name: &str, handle: &Handle) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueuedTask>();
        let id = next_queue_id();
        let queue_name = name.to_string();

        handle.spawn(async move {
            while let Some(task) = rx.recv().await {
                let _current = CurrentQueueGuard::enter(id);
                task();
            }
            debug!("Task queue '{}' drained", queue_name);
        });

        debug!("Started task queue '{}' on the tokio runtime", name);
        Self {
            id,
            name: name.to_string(),
            tx,
        }
    }
}

impl TaskQueue for TokioTaskQueue {
    fn post_task(&self, task: QueuedTask) {
        if self.tx.send(task).is_err() {
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

/// Creates [`TokioTaskQueue`]s on a fixed runtime
#[derive(Debug, Clone)]
pub struct TokioTaskQueueFactory {
    handle: Handle,
}

impl TokioTaskQueueFactory {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime the caller is running on
    pub fn current() -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|e| Error::TaskQueue(format!("No tokio runtime available: {}", e)))?;
        Ok(Self::new(handle))
    }
}

impl TaskQueueFactory for TokioTaskQueueFactory {
    fn create_task_queue(&self, name: &str, priority: TaskQueuePriority) -> Result<Box<dyn TaskQueue>> {
        if priority != TaskQueuePriority::Normal {
            debug!("Tokio task queue '{}' ignores priority {:?}", name, priority);
        }
        Ok(Box::new(TokioTaskQueue::new(name, &self.handle)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn test_tokio_queue_runs_in_order() {
        let factory = TokioTaskQueueFactory::current().unwrap();
        let queue: Arc<dyn TaskQueue> = Arc::from(
            factory
                .create_task_queue("tokio-ordered", TaskQueuePriority::Normal)
                .unwrap(),
        );
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (done_tx, done_rx) = oneshot::channel();

        for i in 0..50 {
            let seen = seen.clone();
            let probe = queue.clone();
            queue.post_task(Box::new(move || {
                assert!(probe.is_current());
                seen.lock().push(i);
            }));
        }
        queue.post_task(Box::new(move || {
            let _ = done_tx.send(());
        }));
        done_rx.await.unwrap();

        assert_eq!(*seen.lock(), (0..50).collect::<Vec<_>>());
        assert!(!queue.is_current());
        assert_eq!(queue.name(), "tokio-ordered");
    }

    #[test]
    fn test_current_without_runtime_fails() {
        assert!(matches!(TokioTaskQueueFactory::current(), Err(Error::TaskQueue(_))));
    }
}
