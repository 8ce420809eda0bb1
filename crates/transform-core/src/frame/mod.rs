//! Frame envelopes and the header model they carry.

pub mod authentication;
mod clone;
pub mod envelope;
pub mod header;
pub mod layers;
pub mod metadata;

pub use authentication::descriptor_authentication;
pub use clone::clone_sender_video_frame;
pub use envelope::{
    EncodedImage, FrameDirection, FrameEnvelope, PayloadType, ReceiverFrame, SenderFrame,
};
pub use header::{
    CodecSpecificHeader, DecodeTargetIndication, GenericDescriptorInfo, H264Header,
    H264PacketizationMode, VideoCodecType, VideoContentType, VideoFrameType, VideoHeader,
    VideoRotation, Vp8Header, Vp9Header,
};
pub use layers::{
    FrameDependencyStructure, FrameDependencyTemplate, RenderResolution, SpatialLayer,
    VideoLayersAllocation,
};
pub use metadata::VideoFrameMetadata;
