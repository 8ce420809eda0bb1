//! Configuration for transform delegates.

use std::sync::Arc;

use rtpfx_infra_common::config::ConfigLoader;
use rtpfx_infra_common::errors::ErrorExt;
use rtpfx_infra_common::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::queue::{TaskQueueFactory, TaskQueuePriority, ThreadTaskQueueFactory, TokioTaskQueueFactory};
use crate::Result;

/// Default name of the delivery queue
pub const DEFAULT_QUEUE_NAME: &str = "video_frame_transformer";

/// Execution backend for delivery queues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueBackend {
    /// One dedicated OS thread per queue
    #[default]
    Thread,
    /// One task per queue on the ambient tokio runtime
    Tokio,
}

/// Settings for a [`SenderFrameTransformerDelegate`](crate::SenderFrameTransformerDelegate)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformDelegateConfig {
    /// Name of the delivery queue (also the worker thread name)
    pub queue_name: String,
    /// Scheduling hint for the delivery queue
    pub queue_priority: TaskQueuePriority,
    /// Backend used by [`create_task_queue_factory`](Self::create_task_queue_factory)
    pub queue_backend: QueueBackend,
}

impl Default for TransformDelegateConfig {
    fn default() -> Self {
        Self {
            queue_name: DEFAULT_QUEUE_NAME.to_string(),
            queue_priority: TaskQueuePriority::Normal,
            queue_backend: QueueBackend::Thread,
        }
    }
}

impl TransformDelegateConfig {
    pub fn with_queue_name(mut self, name: impl Into<String>) -> Self {
        self.queue_name = name.into();
        self
    }

    pub fn with_queue_priority(mut self, priority: TaskQueuePriority) -> Self {
        self.queue_priority = priority;
        self
    }

    pub fn with_queue_backend(mut self, backend: QueueBackend) -> Self {
        self.queue_backend = backend;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.queue_name.trim().is_empty() {
            return Err(Error::Config("queue_name must not be empty".to_string()));
        }
        if self.queue_name.contains('\0') {
            return Err(Error::Config("queue_name must not contain NUL bytes".to_string()));
        }
        Ok(())
    }

    /// Factory for the configured backend. The tokio backend must be created
    /// from within a runtime.
    pub fn create_task_queue_factory(&self) -> Result<Arc<dyn TaskQueueFactory>> {
        match self.queue_backend {
            QueueBackend::Thread => Ok(Arc::new(ThreadTaskQueueFactory)),
            QueueBackend::Tokio => Ok(Arc::new(TokioTaskQueueFactory::current()?)),
        }
    }
}

/// Settings file layout:
///
/// ```toml
/// [logging]
/// level = "debug"
///
/// [delegate]
/// queue_name = "video_frame_transformer"
/// queue_priority = "normal"
/// queue_backend = "thread"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtpfxConfig {
    pub logging: LoggingConfig,
    pub delegate: TransformDelegateConfig,
}

impl RtpfxConfig {
    /// Load and validate settings through `loader`
    pub fn load(loader: &ConfigLoader) -> Result<Self> {
        let config = loader.load::<Self>().with_context("transform-core", "load config")?;
        config.delegate.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransformDelegateConfig::default();
        assert_eq!(config.queue_name, DEFAULT_QUEUE_NAME);
        assert_eq!(config.queue_priority, TaskQueuePriority::Normal);
        assert_eq!(config.queue_backend, QueueBackend::Thread);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_toml() {
        let loader = ConfigLoader::new().without_env().with_toml_str(
            "[logging]\nlevel = \"debug\"\n\n[delegate]\nqueue_name = \"e2ee\"\nqueue_priority = \"high\"\nqueue_backend = \"tokio\"\n",
        );
        let config = RtpfxConfig::load(&loader).unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.delegate.queue_name, "e2ee");
        assert_eq!(config.delegate.queue_priority, TaskQueuePriority::High);
        assert_eq!(config.delegate.queue_backend, QueueBackend::Tokio);
    }

    #[test]
    fn test_validation_rejects_empty_queue_name() {
        let loader = ConfigLoader::new()
            .without_env()
            .with_toml_str("[delegate]\nqueue_name = \"  \"\n");
        assert!(matches!(RtpfxConfig::load(&loader), Err(Error::Config(_))));
        assert!(TransformDelegateConfig::default().with_queue_name("a\0b").validate().is_err());
    }

    #[test]
    fn test_thread_backend_factory() {
        let config = TransformDelegateConfig::default().with_queue_name("cfg-queue");
        let factory = config.create_task_queue_factory().unwrap();
        let queue = factory
            .create_task_queue(&config.queue_name, config.queue_priority)
            .unwrap();
        assert_eq!(queue.name(), "cfg-queue");
    }

    #[test]
    fn test_tokio_backend_requires_runtime() {
        let config = TransformDelegateConfig::default().with_queue_backend(QueueBackend::Tokio);
        assert!(matches!(config.create_task_queue_factory(), Err(Error::TaskQueue(_))));
    }
}
