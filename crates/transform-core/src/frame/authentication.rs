//! Authentication data binding a frame's descriptor to its payload.
//!
//! Transformers that encrypt frames (SFrame-style E2EE) feed this into their
//! AEAD as associated data, so a middlebox that rewrites the descriptor
//! breaks decryption. The bytes are the generic frame descriptor (version 00)
//! of the first packet of the frame, derived only from metadata: equal
//! metadata always yields equal bytes and the payload never contributes.

use super::metadata::VideoFrameMetadata;

pub const MAX_SPATIAL_LAYERS: i32 = 8;
pub const MAX_TEMPORAL_LAYERS: i32 = 8;
pub const MAX_NUM_FRAME_DEPENDENCIES: usize = 8;

const MAX_FRAME_ID_DIFF: i64 = 1 << 14;

const FLAG_BEGIN_OF_SUBFRAME: u8 = 0x80;
const FLAG_FIRST_SUBFRAME_V00: u8 = 0x20;
const FLAG_LAST_SUBFRAME_V00: u8 = 0x10;
const FLAG_DEPENDENCIES: u8 = 0x08;
const MASK_TEMPORAL_LAYER: u8 = 0x07;
const FLAG_EXTENDED_OFFSET: u8 = 0x02;
const FLAG_MORE_DEPENDENCIES: u8 = 0x01;

/// Compute the descriptor authentication bytes for a frame.
///
/// Empty when the frame carries no generic descriptor or when its layer
/// indices or dependency count cannot be expressed in the descriptor.
pub fn descriptor_authentication(metadata: &VideoFrameMetadata) -> Vec<u8> {
    let Some(frame_id) = metadata.frame_id() else {
        return Vec::new();
    };
    let spatial_index = metadata.spatial_index();
    let temporal_index = metadata.temporal_index();
    let dependencies = metadata.frame_dependencies();
    if !(0..MAX_SPATIAL_LAYERS).contains(&spatial_index)
        || !(0..MAX_TEMPORAL_LAYERS).contains(&temporal_index)
        || dependencies.len() > MAX_NUM_FRAME_DEPENDENCIES
    {
        return Vec::new();
    }

    // Diffs that do not fit the descriptor are left out.
    let diffs: Vec<u16> = dependencies
        .iter()
        .filter_map(|dependency| frame_id.checked_sub(*dependency))
        .filter(|diff| *diff > 0 && *diff < MAX_FRAME_ID_DIFF)
        .map(|diff| diff as u16)
        .collect();

    let mut data = Vec::with_capacity(4 + 4 + 2 * diffs.len());

    let mut base = FLAG_BEGIN_OF_SUBFRAME | FLAG_FIRST_SUBFRAME_V00 | FLAG_LAST_SUBFRAME_V00;
    base |= temporal_index as u8 & MASK_TEMPORAL_LAYER;
    if !diffs.is_empty() {
        base |= FLAG_DEPENDENCIES;
    }
    data.push(base);
    data.push(1u8 << spatial_index);

    let wire_frame_id = (frame_id & 0xFFFF) as u16;
    data.extend_from_slice(&wire_frame_id.to_le_bytes());

    // Resolution is only signalled for frames that reference nothing.
    if dependencies.is_empty() && metadata.width() > 0 && metadata.height() > 0 {
        data.extend_from_slice(&metadata.width().to_be_bytes());
        data.extend_from_slice(&metadata.height().to_be_bytes());
    }

    for (i, diff) in diffs.iter().enumerate() {
        let extended = *diff >= (1 << 6);
        let more = i + 1 < diffs.len();
        let mut byte = ((*diff & 0x3f) as u8) << 2;
        if extended {
            byte |= FLAG_EXTENDED_OFFSET;
        }
        if more {
            byte |= FLAG_MORE_DEPENDENCIES;
        }
        data.push(byte);
        if extended {
            data.push((*diff >> 6) as u8);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::header::{GenericDescriptorInfo, VideoCodecType, VideoFrameType, VideoHeader};
    use proptest::prelude::*;

    fn header_with(generic: GenericDescriptorInfo) -> VideoHeader {
        VideoHeader::new(VideoCodecType::Generic, VideoFrameType::Key)
            .with_resolution(640, 360)
            .with_generic(generic)
    }

    #[test]
    fn test_no_generic_descriptor_gives_empty_tag() {
        let header = VideoHeader::new(VideoCodecType::Vp8, VideoFrameType::Key).with_resolution(640, 360);
        assert!(descriptor_authentication(&header.as_metadata()).is_empty());
    }

    #[test]
    fn test_key_frame_layout_carries_resolution() {
        let header = header_with(GenericDescriptorInfo {
            frame_id: 0x1234,
            spatial_index: 0,
            temporal_index: 1,
            ..Default::default()
        });
        assert_eq!(
            descriptor_authentication(&header.as_metadata()),
            vec![0xB1, 0x01, 0x34, 0x12, 0x02, 0x80, 0x01, 0x68]
        );
    }

    #[test]
    fn test_dependencies_are_encoded_as_diffs() {
        let header = header_with(GenericDescriptorInfo {
            frame_id: 100,
            spatial_index: 0,
            temporal_index: 0,
            dependencies: vec![99, 30],
            ..Default::default()
        });
        assert_eq!(
            descriptor_authentication(&header.as_metadata()),
            vec![0xB8, 0x01, 0x64, 0x00, 0x05, 0x1A, 0x01]
        );
    }

    #[test]
    fn test_dependency_order_matters() {
        let forward = header_with(GenericDescriptorInfo {
            frame_id: 100,
            dependencies: vec![99, 98],
            ..Default::default()
        });
        let reversed = header_with(GenericDescriptorInfo {
            frame_id: 100,
            dependencies: vec![98, 99],
            ..Default::default()
        });
        assert_ne!(
            descriptor_authentication(&forward.as_metadata()),
            descriptor_authentication(&reversed.as_metadata())
        );
    }

    #[test]
    fn test_out_of_range_layers_give_empty_tag() {
        let header = header_with(GenericDescriptorInfo {
            frame_id: 1,
            spatial_index: MAX_SPATIAL_LAYERS,
            ..Default::default()
        });
        assert!(descriptor_authentication(&header.as_metadata()).is_empty());

        let header = header_with(GenericDescriptorInfo {
            frame_id: 20,
            dependencies: (0..=MAX_NUM_FRAME_DEPENDENCIES as i64).collect(),
            ..Default::default()
        });
        assert!(descriptor_authentication(&header.as_metadata()).is_empty());
    }

    #[test]
    fn test_extreme_dependencies_are_dropped() {
        let header = header_with(GenericDescriptorInfo {
            frame_id: 0,
            dependencies: vec![i64::MIN],
            ..Default::default()
        });
        let tag = descriptor_authentication(&header.as_metadata());
        assert_eq!(tag[0] & FLAG_DEPENDENCIES, 0);
        assert_eq!(tag.len(), 4);

        let header = header_with(GenericDescriptorInfo {
            frame_id: i64::MIN,
            dependencies: vec![i64::MAX, 1],
            ..Default::default()
        });
        let tag = descriptor_authentication(&header.as_metadata());
        assert_eq!(tag[0] & FLAG_DEPENDENCIES, 0);
    }

    proptest! {
        #[test]
        fn prop_arbitrary_dependencies_never_panic(
            frame_id in any::<i64>(),
            dependencies in proptest::collection::vec(any::<i64>(), 0..=MAX_NUM_FRAME_DEPENDENCIES),
        ) {
            let header = header_with(GenericDescriptorInfo {
                frame_id,
                dependencies,
                ..Default::default()
            });
            let tag = descriptor_authentication(&header.as_metadata());
            prop_assert!(tag.len() >= 4);
        }

        #[test]
        fn prop_tag_is_deterministic(
            frame_id in 0i64..100_000,
            spatial in 0i32..8,
            temporal in 0i32..8,
            width in 0u16..4096,
            height in 0u16..4096,
        ) {
            let header = VideoHeader::new(VideoCodecType::Generic, VideoFrameType::Delta)
                .with_resolution(width, height)
                .with_generic(GenericDescriptorInfo {
                    frame_id,
                    spatial_index: spatial,
                    temporal_index: temporal,
                    ..Default::default()
                });
            let first = descriptor_authentication(&header.as_metadata());
            let second = descriptor_authentication(&header.clone().as_metadata());
            prop_assert_eq!(&first, &second);
            prop_assert!(first.len() == 4 || first.len() == 8);
            prop_assert_eq!(first[1], 1u8 << spatial);
        }
    }
}
