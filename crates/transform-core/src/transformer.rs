//! Contract between the sending pipeline and an external frame transformer.

use std::sync::Arc;

use crate::frame::FrameEnvelope;

/// Receiver of transformed frames for one stream.
///
/// May be called from any thread, any number of times per submitted frame,
/// at any point between registration and unregistration.
pub trait TransformedFrameSink: Send + Sync {
    fn on_transformed_frame(&self, frame: FrameEnvelope);
}

/// External, possibly asynchronous frame transformation stage
/// (end-to-end encryption, forwarding, ...).
pub trait FrameTransformer: Send + Sync {
    /// Hand a frame over. Fire-and-forget: results, if any, come back through
    /// the sink registered for the frame's SSRC, in whatever order the
    /// transformer chooses.
    fn transform(&self, frame: FrameEnvelope);

    /// Route transformed frames for `ssrc` to `sink`
    fn register_transformed_frame_sink_callback(&self, sink: Arc<dyn TransformedFrameSink>, ssrc: u32);

    /// Stop routing frames for `ssrc` and release the sink
    fn unregister_transformed_frame_sink_callback(&self, ssrc: u32);
}
