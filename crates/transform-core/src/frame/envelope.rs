//! Transformable frame envelopes.
//!
//! A [`FrameEnvelope`] is what travels through an external transformer. It is
//! tagged with the direction it was created for; only outbound envelopes
//! carry the full sender header, reachable through [`FrameEnvelope::as_sender`].

use std::fmt;

use bytes::Bytes;

use super::authentication::descriptor_authentication;
use super::header::{VideoCodecType, VideoFrameType, VideoHeader};
use super::metadata::VideoFrameMetadata;
use crate::error::Error;
use crate::Result;

/// RTP payload type, guaranteed to be within `0..=127`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PayloadType(u8);

impl PayloadType {
    /// Highest payload type expressible in the 7-bit RTP header field
    pub const MAX: u8 = 127;

    pub fn new(value: i32) -> Result<Self> {
        if (0..=Self::MAX as i32).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(Error::InvalidPayloadType(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for PayloadType {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<u8> for PayloadType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value as i32)
    }
}

impl fmt::Display for PayloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which side of the pipeline an envelope was created for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameDirection {
    /// Created by the sending pipeline, headed for the packetizer
    Outbound,
    /// Created by the receiving pipeline, headed for the decoder
    Inbound,
}

/// Encoded picture as produced by an encoder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedImage {
    pub data: Bytes,
    pub frame_type: VideoFrameType,
    /// Capture time in milliseconds
    pub capture_time_ms: i64,
}

impl EncodedImage {
    pub fn new(data: impl Into<Bytes>, frame_type: VideoFrameType, capture_time_ms: i64) -> Self {
        Self {
            data: data.into(),
            frame_type,
            capture_time_ms,
        }
    }
}

/// Outbound frame with its complete sender header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderFrame {
    data: Bytes,
    header: VideoHeader,
    metadata: VideoFrameMetadata,
    frame_type: VideoFrameType,
    payload_type: PayloadType,
    codec_type: Option<VideoCodecType>,
    rtp_timestamp: u32,
    capture_time_ms: i64,
    expected_retransmission_time_ms: Option<i64>,
    ssrc: u32,
}

impl SenderFrame {
    pub fn new(
        encoded_image: &EncodedImage,
        header: VideoHeader,
        payload_type: PayloadType,
        codec_type: Option<VideoCodecType>,
        rtp_timestamp: u32,
        expected_retransmission_time_ms: Option<i64>,
        ssrc: u32,
    ) -> Self {
        let metadata = header.as_metadata();
        Self {
            data: encoded_image.data.clone(),
            header,
            metadata,
            frame_type: encoded_image.frame_type,
            payload_type,
            codec_type,
            rtp_timestamp,
            capture_time_ms: encoded_image.capture_time_ms,
            expected_retransmission_time_ms,
            ssrc,
        }
    }

    /// Like [`SenderFrame::new`] but validates a raw payload type first
    pub fn try_new(
        encoded_image: &EncodedImage,
        header: VideoHeader,
        payload_type: i32,
        codec_type: Option<VideoCodecType>,
        rtp_timestamp: u32,
        expected_retransmission_time_ms: Option<i64>,
        ssrc: u32,
    ) -> Result<Self> {
        let payload_type = PayloadType::new(payload_type)?;
        Ok(Self::new(
            encoded_image,
            header,
            payload_type,
            codec_type,
            rtp_timestamp,
            expected_retransmission_time_ms,
            ssrc,
        ))
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Shared handle to the current payload buffer
    pub fn payload(&self) -> Bytes {
        self.data.clone()
    }

    /// Replace the payload with a copy of `data`. No other field changes.
    pub fn set_data(&mut self, data: &[u8]) {
        self.data = Bytes::copy_from_slice(data);
    }

    pub fn header(&self) -> &VideoHeader {
        &self.header
    }

    pub fn metadata(&self) -> &VideoFrameMetadata {
        &self.metadata
    }

    pub fn frame_type(&self) -> VideoFrameType {
        self.frame_type
    }

    pub fn is_key_frame(&self) -> bool {
        self.frame_type == VideoFrameType::Key
    }

    pub fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    pub fn codec_type(&self) -> Option<VideoCodecType> {
        self.codec_type
    }

    pub fn timestamp(&self) -> u32 {
        self.rtp_timestamp
    }

    pub fn capture_time_ms(&self) -> i64 {
        self.capture_time_ms
    }

    pub fn expected_retransmission_time_ms(&self) -> Option<i64> {
        self.expected_retransmission_time_ms
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }
}

/// Inbound frame. Only the metadata projection of the header survives
/// depacketization, so there is no full [`VideoHeader`] to hand out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverFrame {
    data: Bytes,
    payload_type: PayloadType,
    rtp_timestamp: u32,
    ssrc: u32,
    metadata: VideoFrameMetadata,
}

impl ReceiverFrame {
    pub fn new(
        data: impl Into<Bytes>,
        payload_type: PayloadType,
        rtp_timestamp: u32,
        ssrc: u32,
        metadata: VideoFrameMetadata,
    ) -> Self {
        Self {
            data: data.into(),
            payload_type,
            rtp_timestamp,
            ssrc,
            metadata,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn set_data(&mut self, data: &[u8]) {
        self.data = Bytes::copy_from_slice(data);
    }

    pub fn metadata(&self) -> &VideoFrameMetadata {
        &self.metadata
    }

    pub fn is_key_frame(&self) -> bool {
        self.metadata.frame_type() == VideoFrameType::Key
    }

    pub fn payload_type(&self) -> PayloadType {
        self.payload_type
    }

    pub fn timestamp(&self) -> u32 {
        self.rtp_timestamp
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }
}

/// A frame in flight through a transformer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameEnvelope {
    Outbound(SenderFrame),
    Inbound(ReceiverFrame),
}

impl FrameEnvelope {
    pub fn direction(&self) -> FrameDirection {
        match self {
            FrameEnvelope::Outbound(_) => FrameDirection::Outbound,
            FrameEnvelope::Inbound(_) => FrameDirection::Inbound,
        }
    }

    pub fn data(&self) -> &[u8] {
        match self {
            FrameEnvelope::Outbound(frame) => frame.data(),
            FrameEnvelope::Inbound(frame) => frame.data(),
        }
    }

    /// Replace the payload buffer; headers are untouched
    pub fn set_data(&mut self, data: &[u8]) {
        match self {
            FrameEnvelope::Outbound(frame) => frame.set_data(data),
            FrameEnvelope::Inbound(frame) => frame.set_data(data),
        }
    }

    pub fn payload_type(&self) -> PayloadType {
        match self {
            FrameEnvelope::Outbound(frame) => frame.payload_type(),
            FrameEnvelope::Inbound(frame) => frame.payload_type(),
        }
    }

    pub fn timestamp(&self) -> u32 {
        match self {
            FrameEnvelope::Outbound(frame) => frame.timestamp(),
            FrameEnvelope::Inbound(frame) => frame.timestamp(),
        }
    }

    pub fn ssrc(&self) -> u32 {
        match self {
            FrameEnvelope::Outbound(frame) => frame.ssrc(),
            FrameEnvelope::Inbound(frame) => frame.ssrc(),
        }
    }

    pub fn is_key_frame(&self) -> bool {
        match self {
            FrameEnvelope::Outbound(frame) => frame.is_key_frame(),
            FrameEnvelope::Inbound(frame) => frame.is_key_frame(),
        }
    }

    pub fn metadata(&self) -> &VideoFrameMetadata {
        match self {
            FrameEnvelope::Outbound(frame) => frame.metadata(),
            FrameEnvelope::Inbound(frame) => frame.metadata(),
        }
    }

    /// Authentication data derived from the frame's metadata, recomputed on
    /// every call
    pub fn additional_data(&self) -> Vec<u8> {
        descriptor_authentication(self.metadata())
    }

    /// Sender-side view, available on outbound envelopes only
    pub fn as_sender(&self) -> Option<&SenderFrame> {
        match self {
            FrameEnvelope::Outbound(frame) => Some(frame),
            FrameEnvelope::Inbound(_) => None,
        }
    }

    /// Unwrap the outbound frame, handing the envelope back otherwise
    pub fn into_sender(self) -> std::result::Result<SenderFrame, FrameEnvelope> {
        match self {
            FrameEnvelope::Outbound(frame) => Ok(frame),
            inbound => Err(inbound),
        }
    }
}

impl From<SenderFrame> for FrameEnvelope {
    fn from(frame: SenderFrame) -> Self {
        FrameEnvelope::Outbound(frame)
    }
}

impl From<ReceiverFrame> for FrameEnvelope {
    fn from(frame: ReceiverFrame) -> Self {
        FrameEnvelope::Inbound(frame)
    }
}
