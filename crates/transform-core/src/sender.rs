//! Contract of the RTP video sender that consumes transformed frames.

use bytes::Bytes;

use crate::frame::{FrameDependencyStructure, VideoCodecType, VideoHeader, VideoLayersAllocation};

/// Packetizes and sends fully formed video frames.
///
/// The transform delegate calls these methods while holding its sender
/// lock; implementations must not call back into the delegate from them.
pub trait VideoFrameSender: Send + Sync {
    fn send_video(
        &self,
        payload_type: u8,
        codec_type: Option<VideoCodecType>,
        rtp_timestamp: u32,
        capture_time_ms: i64,
        payload: Bytes,
        header: &VideoHeader,
        expected_retransmission_time_ms: Option<i64>,
    );

    fn set_video_structure_after_transformation(&self, video_structure: Option<&FrameDependencyStructure>);

    fn set_video_layers_allocation_after_transformation(&self, allocation: VideoLayersAllocation);
}
