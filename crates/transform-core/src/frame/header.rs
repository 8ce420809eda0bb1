//! Video header model carried alongside every outbound frame.
//!
//! This is the sender-side description of one encoded picture: what the
//! packetizer needs to build RTP payload headers and header extensions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Video codec carried by a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoCodecType {
    /// Codec-agnostic payload (generic packetization)
    #[default]
    Generic,
    Vp8,
    Vp9,
    Av1,
    H264,
}

impl fmt::Display for VideoCodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VideoCodecType::Generic => "Generic",
            VideoCodecType::Vp8 => "VP8",
            VideoCodecType::Vp9 => "VP9",
            VideoCodecType::Av1 => "AV1",
            VideoCodecType::H264 => "H264",
        };
        f.write_str(name)
    }
}

/// Kind of encoded frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VideoFrameType {
    /// No frame produced (e.g. dropped by the encoder)
    #[default]
    Empty,
    /// Independently decodable key frame
    Key,
    /// Frame that depends on earlier frames
    Delta,
}

/// Rotation to apply when rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VideoRotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

/// Content hint for the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VideoContentType {
    #[default]
    Unspecified,
    Screenshare,
}

/// Per decode-target relevance of a frame (dependency descriptor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeTargetIndication {
    NotPresent,
    Discardable,
    Switch,
    Required,
}

/// Generic frame descriptor information
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenericDescriptorInfo {
    /// Unwrapped frame id
    pub frame_id: i64,
    pub spatial_index: i32,
    pub temporal_index: i32,
    pub decode_target_indications: Vec<DecodeTargetIndication>,
    /// Frame ids this frame references
    pub dependencies: Vec<i64>,
}

/// VP8 payload descriptor fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vp8Header {
    pub non_reference: bool,
    pub picture_id: Option<u16>,
    pub tl0_pic_idx: Option<u8>,
    pub temporal_idx: Option<u8>,
    pub layer_sync: bool,
    pub key_idx: Option<u8>,
    pub partition_id: u8,
    pub beginning_of_partition: bool,
}

/// VP9 payload descriptor fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vp9Header {
    pub inter_pic_predicted: bool,
    pub flexible_mode: bool,
    pub picture_id: Option<u16>,
    pub temporal_idx: Option<u8>,
    pub spatial_idx: Option<u8>,
    pub num_spatial_layers: u8,
    pub end_of_picture: bool,
}

/// H.264 packetization mode (RFC 6184)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum H264PacketizationMode {
    #[default]
    NonInterleaved,
    SingleNalUnit,
}

/// H.264 payload fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct H264Header {
    pub packetization_mode: H264PacketizationMode,
}

/// Codec-specific part of the header
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CodecSpecificHeader {
    #[default]
    None,
    Vp8(Vp8Header),
    Vp9(Vp9Header),
    H264(H264Header),
}

/// Sender-side video header for one encoded frame
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoHeader {
    pub frame_type: VideoFrameType,
    pub width: u16,
    pub height: u16,
    pub rotation: VideoRotation,
    pub content_type: VideoContentType,
    pub generic: Option<GenericDescriptorInfo>,
    pub is_first_packet_in_frame: bool,
    pub is_last_frame_in_picture: bool,
    pub simulcast_idx: u8,
    pub codec: VideoCodecType,
    pub video_type_header: CodecSpecificHeader,
}

impl VideoHeader {
    /// Header for a frame of the given codec and type, everything else defaulted
    pub fn new(codec: VideoCodecType, frame_type: VideoFrameType) -> Self {
        Self {
            codec,
            frame_type,
            is_last_frame_in_picture: true,
            ..Default::default()
        }
    }

    /// Set the frame resolution
    pub fn with_resolution(mut self, width: u16, height: u16) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Attach generic descriptor information
    pub fn with_generic(mut self, generic: GenericDescriptorInfo) -> Self {
        self.generic = Some(generic);
        self
    }

    /// Attach the codec-specific header
    pub fn with_codec_header(mut self, video_type_header: CodecSpecificHeader) -> Self {
        self.video_type_header = video_type_header;
        self
    }
}
