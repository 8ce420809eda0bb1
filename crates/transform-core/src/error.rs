use thiserror::Error;

/// Error type for frame transform operations
#[derive(Debug, Error)]
pub enum Error {
    /// Payload type outside the RTP dynamic/static range
    #[error("Invalid payload type {0}: must be within 0..=127")]
    InvalidPayloadType(i32),

    /// The delegate was already detached from its sender and transformer
    #[error("Transform delegate for ssrc {0} has been reset")]
    DelegateReset(u32),

    /// A task queue could not be created
    #[error("Task queue error: {0}")]
    TaskQueue(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by the shared infrastructure
    #[error(transparent)]
    Infra(#[from] rtpfx_infra_common::Error),

    /// I/O error, e.g. while spawning a queue thread
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
