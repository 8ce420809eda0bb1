use super::header::{
    DecodeTargetIndication, VideoCodecType, VideoContentType, VideoFrameType, VideoHeader,
    VideoRotation,
};

/// Read-only projection of a [`VideoHeader`] exposed to transformers.
///
/// Both outbound and inbound envelopes carry one, so a transformer can make
/// decisions (or build authentication data) without knowing the direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoFrameMetadata {
    frame_type: VideoFrameType,
    width: u16,
    height: u16,
    rotation: VideoRotation,
    content_type: VideoContentType,
    frame_id: Option<i64>,
    spatial_index: i32,
    temporal_index: i32,
    frame_dependencies: Vec<i64>,
    decode_target_indications: Vec<DecodeTargetIndication>,
    is_last_frame_in_picture: bool,
    simulcast_idx: u8,
    codec: VideoCodecType,
}

impl VideoFrameMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_type(&self) -> VideoFrameType {
        self.frame_type
    }

    pub fn set_frame_type(&mut self, frame_type: VideoFrameType) {
        self.frame_type = frame_type;
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width;
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn set_height(&mut self, height: u16) {
        self.height = height;
    }

    pub fn rotation(&self) -> VideoRotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: VideoRotation) {
        self.rotation = rotation;
    }

    pub fn content_type(&self) -> VideoContentType {
        self.content_type
    }

    pub fn set_content_type(&mut self, content_type: VideoContentType) {
        self.content_type = content_type;
    }

    /// Frame id from the generic descriptor, `None` if the header had none
    pub fn frame_id(&self) -> Option<i64> {
        self.frame_id
    }

    pub fn set_frame_id(&mut self, frame_id: Option<i64>) {
        self.frame_id = frame_id;
    }

    pub fn spatial_index(&self) -> i32 {
        self.spatial_index
    }

    pub fn set_spatial_index(&mut self, spatial_index: i32) {
        self.spatial_index = spatial_index;
    }

    pub fn temporal_index(&self) -> i32 {
        self.temporal_index
    }

    pub fn set_temporal_index(&mut self, temporal_index: i32) {
        self.temporal_index = temporal_index;
    }

    pub fn frame_dependencies(&self) -> &[i64] {
        &self.frame_dependencies
    }

    pub fn set_frame_dependencies(&mut self, frame_dependencies: &[i64]) {
        self.frame_dependencies = frame_dependencies.to_vec();
    }

    pub fn decode_target_indications(&self) -> &[DecodeTargetIndication] {
        &self.decode_target_indications
    }

    pub fn set_decode_target_indications(&mut self, indications: &[DecodeTargetIndication]) {
        self.decode_target_indications = indications.to_vec();
    }

    pub fn is_last_frame_in_picture(&self) -> bool {
        self.is_last_frame_in_picture
    }

    pub fn set_is_last_frame_in_picture(&mut self, is_last: bool) {
        self.is_last_frame_in_picture = is_last;
    }

    pub fn simulcast_idx(&self) -> u8 {
        self.simulcast_idx
    }

    pub fn set_simulcast_idx(&mut self, simulcast_idx: u8) {
        self.simulcast_idx = simulcast_idx;
    }

    pub fn codec(&self) -> VideoCodecType {
        self.codec
    }

    pub fn set_codec(&mut self, codec: VideoCodecType) {
        self.codec = codec;
    }
}

impl VideoHeader {
    /// Project this header into the metadata view handed to transformers
    pub fn as_metadata(&self) -> VideoFrameMetadata {
        let mut metadata = VideoFrameMetadata::new();
        metadata.set_frame_type(self.frame_type);
        metadata.set_width(self.width);
        metadata.set_height(self.height);
        metadata.set_rotation(self.rotation);
        metadata.set_content_type(self.content_type);
        if let Some(generic) = &self.generic {
            metadata.set_frame_id(Some(generic.frame_id));
            metadata.set_spatial_index(generic.spatial_index);
            metadata.set_temporal_index(generic.temporal_index);
            metadata.set_frame_dependencies(&generic.dependencies);
            metadata.set_decode_target_indications(&generic.decode_target_indications);
        }
        metadata.set_is_last_frame_in_picture(self.is_last_frame_in_picture);
        metadata.set_simulcast_idx(self.simulcast_idx);
        metadata.set_codec(self.codec);
        metadata
    }
}
