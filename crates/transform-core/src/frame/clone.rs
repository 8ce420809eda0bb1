use bytes::Bytes;
use tracing::debug;

use super::envelope::{EncodedImage, FrameEnvelope, SenderFrame};
use super::header::{CodecSpecificHeader, VideoCodecType, VideoFrameType, VideoHeader, Vp8Header};

/// Produce a new outbound envelope carrying a fresh copy of `original`'s payload.
///
/// Outbound sources keep their header, codec type, frame type and capture
/// time. The expected retransmission time is never carried over.
///
/// # Limitations
///
/// An inbound source has no sender header to copy. The clone gets a default
/// header with an empty VP8 codec-specific header, codec type VP8 and a delta
/// frame type, whatever the original codec was. Payload type, RTP timestamp
/// and SSRC are still copied.
pub fn clone_sender_video_frame(original: &FrameEnvelope) -> FrameEnvelope {
    let data = Bytes::copy_from_slice(original.data());

    let (header, codec_type, frame_type, capture_time_ms) = match original {
        FrameEnvelope::Outbound(sender) => (
            sender.header().clone(),
            sender.codec_type(),
            sender.frame_type(),
            sender.capture_time_ms(),
        ),
        FrameEnvelope::Inbound(_) => {
            debug!(
                "Cloning inbound frame ssrc={} ts={} with a synthesized VP8 header",
                original.ssrc(),
                original.timestamp()
            );
            let header = VideoHeader {
                video_type_header: CodecSpecificHeader::Vp8(Vp8Header::default()),
                ..Default::default()
            };
            (header, Some(VideoCodecType::Vp8), VideoFrameType::Delta, 0)
        }
    };

    let encoded_image = EncodedImage {
        data,
        frame_type,
        capture_time_ms,
    };
    FrameEnvelope::Outbound(SenderFrame::new(
        &encoded_image,
        header,
        original.payload_type(),
        codec_type,
        original.timestamp(),
        None,
        original.ssrc(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::envelope::{FrameDirection, PayloadType, ReceiverFrame};
    use crate::frame::header::{GenericDescriptorInfo, Vp9Header};
    use crate::frame::metadata::VideoFrameMetadata;

    fn outbound() -> FrameEnvelope {
        let header = VideoHeader::new(VideoCodecType::Vp9, VideoFrameType::Key)
            .with_resolution(1280, 720)
            .with_codec_header(CodecSpecificHeader::Vp9(Vp9Header {
                num_spatial_layers: 2,
                ..Default::default()
            }))
            .with_generic(GenericDescriptorInfo {
                frame_id: 12,
                ..Default::default()
            });
        let image = EncodedImage::new(vec![5u8; 10], VideoFrameType::Key, 33);
        FrameEnvelope::Outbound(SenderFrame::new(
            &image,
            header,
            PayloadType::new(98).unwrap(),
            Some(VideoCodecType::Vp9),
            9000,
            Some(120),
            0xCAFE,
        ))
    }

    #[test]
    fn test_clone_outbound_preserves_header() {
        let original = outbound();
        let cloned = clone_sender_video_frame(&original);

        assert_eq!(cloned.direction(), FrameDirection::Outbound);
        assert_eq!(cloned.data(), original.data());
        assert_ne!(cloned.data().as_ptr(), original.data().as_ptr());

        let src = original.as_sender().unwrap();
        let dst = cloned.as_sender().unwrap();
        assert_eq!(dst.header(), src.header());
        assert_eq!(dst.payload_type(), src.payload_type());
        assert_eq!(dst.timestamp(), src.timestamp());
        assert_eq!(dst.codec_type(), src.codec_type());
        assert_eq!(dst.ssrc(), src.ssrc());
        assert!(dst.is_key_frame());
        assert_eq!(dst.capture_time_ms(), 33);
        assert_eq!(dst.expected_retransmission_time_ms(), None);
        assert_eq!(cloned.additional_data(), original.additional_data());
    }

    #[test]
    fn test_clone_inbound_synthesizes_vp8_header() {
        let mut metadata = VideoFrameMetadata::new();
        metadata.set_codec(VideoCodecType::H264);
        metadata.set_frame_type(VideoFrameType::Key);
        let original = FrameEnvelope::Inbound(ReceiverFrame::new(
            vec![5u8; 10],
            PayloadType::new(102).unwrap(),
            4242,
            77,
            metadata,
        ));

        let cloned = clone_sender_video_frame(&original);
        let sender = cloned.as_sender().unwrap();

        assert_eq!(cloned.data(), &[5u8; 10]);
        assert_eq!(sender.payload_type().get(), 102);
        assert_eq!(sender.timestamp(), 4242);
        assert_eq!(sender.ssrc(), 77);
        assert_eq!(sender.codec_type(), Some(VideoCodecType::Vp8));
        assert_eq!(
            sender.header().video_type_header,
            CodecSpecificHeader::Vp8(Vp8Header::default())
        );
        assert_eq!(sender.header().codec, VideoCodecType::Generic);
        assert!(!sender.is_key_frame());
    }
}
