//! Stream structure and layer allocation values the sender is configured
//! with once transformation is in the path.

/// Resolution of one spatial layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderResolution {
    pub width: u16,
    pub height: u16,
}

/// One template of the dependency descriptor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameDependencyTemplate {
    pub spatial_id: i32,
    pub temporal_id: i32,
    pub decode_target_indications: Vec<super::DecodeTargetIndication>,
    pub frame_diffs: Vec<i32>,
    pub chain_diffs: Vec<i32>,
}

/// Dependency descriptor template structure for a stream
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameDependencyStructure {
    pub structure_id: i32,
    pub num_decode_targets: i32,
    pub num_chains: i32,
    pub decode_target_protected_by_chain: Vec<i32>,
    pub resolutions: Vec<RenderResolution>,
    pub templates: Vec<FrameDependencyTemplate>,
}

/// Allocation of one active spatial layer
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpatialLayer {
    pub rtp_stream_index: i32,
    pub spatial_id: i32,
    /// Cumulative target bitrate per temporal layer, in kbps
    pub target_bitrate_per_temporal_layer_kbps: Vec<u32>,
    pub width: u16,
    pub height: u16,
    pub frame_rate_fps: u8,
}

/// Layer allocation signalled to the receiver
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VideoLayersAllocation {
    pub rtp_stream_index: i32,
    pub resolution_and_frame_rate_is_valid: bool,
    pub active_spatial_layers: Vec<SpatialLayer>,
}
