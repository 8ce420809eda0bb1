//! Bridge between an RTP video sender and an external frame transformer.
//!
//! Outgoing frames are wrapped in [`FrameEnvelope`]s and handed to the
//! transformer. Transformed frames come back on arbitrary threads and are
//! delivered to the sender one at a time from the delegate's task queue, in
//! the order the transformer returned them. [`reset`](SenderFrameTransformerDelegate::reset)
//! detaches the sender; anything still in flight afterwards is dropped.
//!
//! A transformer that hands back an inbound frame, or a caller that uses the
//! setters after reset, is a contract violation. Those end the process
//! through the delegate's [`FatalHandler`], which aborts unless replaced.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::{debug, error, trace, warn};

use crate::config::TransformDelegateConfig;
use crate::error::Error;
use crate::frame::{
    EncodedImage, FrameDependencyStructure, FrameEnvelope, PayloadType, SenderFrame,
    VideoCodecType, VideoHeader, VideoLayersAllocation,
};
use crate::queue::{TaskQueue, TaskQueueFactory};
use crate::sender::VideoFrameSender;
use crate::transformer::{FrameTransformer, TransformedFrameSink};
use crate::Result;


/// Called on a contract violation with a description of it. Must not return
/// normally; if it does, the process is aborted anyway. May run while the
/// sender lock is held, so it must not call back into the delegate.
pub type FatalHandler = Arc<dyn Fn(&str) + Send + Sync>;

fn abort_process(_message: &str) {
    std::process::abort();
}

thread_local! {
    /// Address of the delegate whose sender is being called on this thread
    static SENDER_CALL: Cell<usize> = const { Cell::new(0) };
}

struct SenderCallGuard {
    previous: usize,
}

impl SenderCallGuard {
    fn enter(delegate: &SenderFrameTransformerDelegate) -> Self {
        let previous = SENDER_CALL.with(|current| current.replace(delegate.address()));
        Self { previous }
    }
}

impl Drop for SenderCallGuard {
    fn drop(&mut self) {
        SENDER_CALL.with(|current| current.set(self.previous));
    }
}

/// Lifecycle of a delegate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegateState {
    /// Constructed, not yet registered with the transformer
    Created,
    /// Registered and attached to its sender; transformed frames are delivered
    Active,
    /// Detached; terminal
    Reset,
}

/// Routes outgoing video frames of one stream through a [`FrameTransformer`].
///
/// Always handled through an `Arc`: every delivery task holds a strong
/// reference so the delegate outlives frames that are still queued.
pub struct SenderFrameTransformerDelegate {
    weak_self: Weak<SenderFrameTransformerDelegate>,
    /// Only the presence of the sender is guarded, never frame data.
    sender: Mutex<Option<Arc<dyn VideoFrameSender>>>,
    frame_transformer: Mutex<Option<Arc<dyn FrameTransformer>>>,
    ssrc: u32,
    transformation_queue: Box<dyn TaskQueue>,
    initialized: AtomicBool,
    fatal_handler: Mutex<FatalHandler>,
}

impl SenderFrameTransformerDelegate {
    /// Create a delegate with the default queue settings
    pub fn new(
        sender: Arc<dyn VideoFrameSender>,
        frame_transformer: Arc<dyn FrameTransformer>,
        ssrc: u32,
        task_queue_factory: &dyn TaskQueueFactory,
    ) -> Result<Arc<Self>> {
        Self::with_config(
            sender,
            frame_transformer,
            ssrc,
            task_queue_factory,
            &TransformDelegateConfig::default(),
        )
    }

    pub fn with_config(
        sender: Arc<dyn VideoFrameSender>,
        frame_transformer: Arc<dyn FrameTransformer>,
        ssrc: u32,
        task_queue_factory: &dyn TaskQueueFactory,
        config: &TransformDelegateConfig,
    ) -> Result<Arc<Self>> {
        config.validate()?;
        let transformation_queue =
            task_queue_factory.create_task_queue(&config.queue_name, config.queue_priority)?;

        debug!(
            "Created frame transformer delegate for ssrc={} on queue '{}'",
            ssrc,
            transformation_queue.name()
        );

        let fatal_handler: FatalHandler = Arc::new(abort_process);
        Ok(Arc::new_cyclic(|weak_self| Self {
            weak_self: weak_self.clone(),
            sender: Mutex::new(Some(sender)),
            frame_transformer: Mutex::new(Some(frame_transformer)),
            ssrc,
            transformation_queue,
            initialized: AtomicBool::new(false),
            fatal_handler: Mutex::new(fatal_handler),
        }))
    }

    /// Replace the contract-violation handler. The default aborts the process.
    pub fn set_fatal_handler(&self, handler: FatalHandler) {
        *self.fatal_handler.lock() = handler;
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn state(&self) -> DelegateState {
        self.assert_not_reentered("state");
        if self.sender.lock().is_none() {
            DelegateState::Reset
        } else if self.initialized.load(Ordering::Acquire) {
            DelegateState::Active
        } else {
            DelegateState::Created
        }
    }

    fn address(&self) -> usize {
        self as *const Self as usize
    }

    /// The sender lock is held while the sender runs, so calling back in
    /// from there would deadlock.
    fn assert_not_reentered(&self, operation: &str) {
        debug_assert!(
            SENDER_CALL.with(|current| current.get()) != self.address(),
            "{} re-entered the transform delegate for ssrc {} from a sender callback",
            operation,
            self.ssrc
        );
    }

    /// Log and hand the violation to the fatal handler; never returns.
    fn contract_violation(&self, message: String) -> ! {
        error!("{}", message);
        let handler = self.fatal_handler.lock().clone();
        handler(&message);
        std::process::abort();
    }

    /// Register as the transformed-frame sink for this stream.
    ///
    /// Must run before the first frame is submitted. Repeated calls are
    /// ignored; calling after [`reset`](Self::reset) fails.
    pub fn init(&self) -> Result<()> {
        let Some(transformer) = self.frame_transformer.lock().clone() else {
            return Err(Error::DelegateReset(self.ssrc));
        };
        if self.initialized.swap(true, Ordering::AcqRel) {
            warn!("Frame transformer delegate for ssrc={} initialized twice", self.ssrc);
            return Ok(());
        }
        let Some(this) = self.weak_self.upgrade() else {
            return Err(Error::DelegateReset(self.ssrc));
        };

        let sink: Arc<dyn TransformedFrameSink> = this;
        transformer.register_transformed_frame_sink_callback(sink, self.ssrc);
        debug!("Registered transformed frame sink for ssrc={}", self.ssrc);
        Ok(())
    }

    /// Wrap an encoded frame and hand it to the transformer.
    ///
    /// Always returns `true`: what happens to the frame afterwards is the
    /// transformer's business. After [`reset`](Self::reset) the frame is dropped.
    pub fn transform_frame(
        &self,
        payload_type: PayloadType,
        codec_type: Option<VideoCodecType>,
        rtp_timestamp: u32,
        encoded_image: &EncodedImage,
        video_header: VideoHeader,
        expected_retransmission_time_ms: Option<i64>,
    ) -> bool {
        let frame = SenderFrame::new(
            encoded_image,
            video_header,
            payload_type,
            codec_type,
            rtp_timestamp,
            expected_retransmission_time_ms,
            self.ssrc,
        );

        let transformer = self.frame_transformer.lock().clone();
        match transformer {
            Some(transformer) => transformer.transform(FrameEnvelope::Outbound(frame)),
            None => trace!(
                "Dropping frame ts={} for ssrc={}: delegate is reset",
                rtp_timestamp,
                self.ssrc
            ),
        }
        true
    }

    /// Runs on the transformation queue.
    fn send_video(&self, transformed_frame: FrameEnvelope) {
        debug_assert!(
            self.transformation_queue.is_current(),
            "frame delivery must run on the transformation queue"
        );

        let guard = self.sender.lock();
        let Some(sender) = guard.as_ref() else {
            trace!(
                "Dropping transformed frame ts={} for ssrc={}: sender detached",
                transformed_frame.timestamp(),
                self.ssrc
            );
            return;
        };

        let frame = match transformed_frame.into_sender() {
            Ok(frame) => frame,
            Err(other) => self.contract_violation(format!(
                "frame transformer contract violation: expected an outbound frame for ssrc {}, got {:?}",
                self.ssrc,
                other.direction()
            )),
        };

        let _call = SenderCallGuard::enter(self);
        sender.send_video(
            frame.payload_type().get(),
            frame.codec_type(),
            frame.timestamp(),
            frame.capture_time_ms(),
            frame.payload(),
            frame.header(),
            frame.expected_retransmission_time_ms(),
        );
    }

    /// Forward the dependency structure to the sender.
    ///
    /// Calling this after [`reset`](Self::reset) is fatal.
    pub fn set_video_structure_under_lock(&self, video_structure: Option<&FrameDependencyStructure>) {
        self.assert_not_reentered("set_video_structure_under_lock");
        let guard = self.sender.lock();
        let Some(sender) = guard.clone() else {
            drop(guard);
            self.contract_violation(format!(
                "set_video_structure_under_lock called after reset (ssrc {})",
                self.ssrc
            ));
        };
        let _call = SenderCallGuard::enter(self);
        sender.set_video_structure_after_transformation(video_structure);
    }

    /// Forward the layers allocation to the sender.
    ///
    /// Calling this after [`reset`](Self::reset) is fatal.
    pub fn set_video_layers_allocation_under_lock(&self, allocation: VideoLayersAllocation) {
        self.assert_not_reentered("set_video_layers_allocation_under_lock");
        let guard = self.sender.lock();
        let Some(sender) = guard.clone() else {
            drop(guard);
            self.contract_violation(format!(
                "set_video_layers_allocation_under_lock called after reset (ssrc {})",
                self.ssrc
            ));
        };
        let _call = SenderCallGuard::enter(self);
        sender.set_video_layers_allocation_after_transformation(allocation);
    }

    /// Unregister from the transformer and detach the sender.
    ///
    /// Irreversible. Delivery tasks already queued still run but deliver
    /// nothing. Does not wait for in-flight transforms.
    pub fn reset(&self) {
        self.assert_not_reentered("reset");
        let transformer = self.frame_transformer.lock().take();
        if let Some(transformer) = transformer {
            transformer.unregister_transformed_frame_sink_callback(self.ssrc);
        }
        *self.sender.lock() = None;
        debug!("Frame transformer delegate for ssrc={} reset", self.ssrc);
    }
}

impl TransformedFrameSink for SenderFrameTransformerDelegate {
    fn on_transformed_frame(&self, frame: FrameEnvelope) {
        self.assert_not_reentered("on_transformed_frame");
        let guard = self.sender.lock();
        if guard.is_none() {
            trace!(
                "Ignoring transformed frame ts={} for ssrc={}: sender detached",
                frame.timestamp(),
                self.ssrc
            );
            return;
        }
        let Some(delegate) = self.weak_self.upgrade() else {
            return;
        };
        self.transformation_queue
            .post_task(Box::new(move || delegate.send_video(frame)));
        drop(guard);
    }
}
