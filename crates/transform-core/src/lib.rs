//! # Transform-Core: Sender-Side Video Frame Transformation
//!
//! This crate sits between an RTP video sender and an external frame
//! transformer, such as an end-to-end encryption stage. Encoded frames are
//! wrapped in a [`FrameEnvelope`] and handed to the transformer. Whatever the
//! transformer returns, from whichever thread, is serialized through a task
//! queue and delivered back to the sender.
//!
//! ## Features
//!
//! - **Direction-tagged envelopes**: outbound and inbound frames share one
//!   type, with a checked conversion back to the sender view
//! - **Authentication data**: generic frame descriptor bytes usable as AEAD
//!   associated data
//! - **Frame cloning**: build a fresh outbound frame from any envelope
//! - **Pluggable queues**: dedicated thread or tokio runtime
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rtpfx_transform_core::prelude::*;
//!
//! # fn wire(sender: Arc<dyn VideoFrameSender>, transformer: Arc<dyn FrameTransformer>) -> rtpfx_transform_core::Result<()> {
//! let delegate = SenderFrameTransformerDelegate::new(sender, transformer, 0x1234, &ThreadTaskQueueFactory)?;
//! delegate.init()?;
//!
//! let image = EncodedImage::new(vec![0u8; 1200], VideoFrameType::Key, 0);
//! let header = VideoHeader::new(VideoCodecType::Vp8, VideoFrameType::Key);
//! delegate.transform_frame(PayloadType::new(96)?, Some(VideoCodecType::Vp8), 90_000, &image, header, None);
//!
//! // On teardown
//! delegate.reset();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod delegate;
pub mod error;
pub mod frame;
pub mod queue;
pub mod sender;
pub mod transformer;

pub use config::{QueueBackend, RtpfxConfig, TransformDelegateConfig};
pub use delegate::{DelegateState, FatalHandler, SenderFrameTransformerDelegate};
pub use error::Error;
pub use frame::{
    clone_sender_video_frame, descriptor_authentication, EncodedImage, FrameDirection,
    FrameEnvelope, PayloadType, ReceiverFrame, SenderFrame, VideoCodecType, VideoFrameMetadata,
    VideoFrameType, VideoHeader,
};
pub use queue::{TaskQueue, TaskQueueFactory, TaskQueuePriority};
pub use sender::VideoFrameSender;
pub use transformer::{FrameTransformer, TransformedFrameSink};

/// Result type for transform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Version information for the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything needed to wire a delegate into a sending pipeline
pub mod prelude {
    pub use crate::config::{QueueBackend, RtpfxConfig, TransformDelegateConfig};
    pub use crate::delegate::{DelegateState, FatalHandler, SenderFrameTransformerDelegate};
    pub use crate::error::Error;
    pub use crate::frame::{
        clone_sender_video_frame, descriptor_authentication, EncodedImage, FrameDependencyStructure,
        FrameDirection, FrameEnvelope, PayloadType, ReceiverFrame, SenderFrame, VideoCodecType,
        VideoFrameMetadata, VideoFrameType, VideoHeader, VideoLayersAllocation,
    };
    pub use crate::queue::{
        TaskQueue, TaskQueueFactory, TaskQueuePriority, ThreadTaskQueueFactory, TokioTaskQueueFactory,
    };
    pub use crate::sender::VideoFrameSender;
    pub use crate::transformer::{FrameTransformer, TransformedFrameSink};
    pub use crate::Result;
}
