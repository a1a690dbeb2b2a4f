//! FrameInput / FrameOutput - processor boundary structures.

use serde::{Deserialize, Serialize};

use crate::{Detection, DynamicFeature, GridMap, LineMark, Pose2, SignalWay, StaticFeature};

/// One raw input frame: a batch of signal ways plus auxiliary feature collections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameInput {
    /// Frame timestamp (microseconds)
    pub timestamp_us: u64,

    /// Raw signal-way measurements
    pub signal_ways: Vec<SignalWay>,

    /// Static features (forwarded when valid)
    pub static_features: Vec<StaticFeature>,

    /// Dynamic features (forwarded when valid)
    pub dynamic_features: Vec<DynamicFeature>,

    /// Line marks (forwarded when valid)
    pub line_marks: Vec<LineMark>,

    /// Occupancy grid (passed through as-is)
    pub grid_map: GridMap,
}

/// Per-method and post-processed detection collections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessedDetections {
    /// Signal-tracing detections
    pub tracing: Vec<Detection>,

    /// FOV-pie intersection detections
    pub fov_intersections: Vec<Detection>,

    /// Ellipse intersection detections (seeds + pairwise crossings)
    pub ellipse_intersections: Vec<Detection>,

    /// Cross-method fused detections
    pub fused: Vec<Detection>,

    /// Connectivity-clustered centroids
    pub clustered: Vec<Detection>,
}

/// One processed output frame
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameOutput {
    /// Frame timestamp (microseconds)
    pub timestamp_us: u64,

    /// Ego pose interpolated at the frame timestamp
    pub observation_pose: Pose2,

    /// Signal ways that passed the range/group filter
    pub signal_ways: Vec<SignalWay>,

    /// Valid static features
    pub static_features: Vec<StaticFeature>,

    /// Valid dynamic features
    pub dynamic_features: Vec<DynamicFeature>,

    /// Valid line marks
    pub line_marks: Vec<LineMark>,

    /// Occupancy grid (as received)
    pub grid_map: GridMap,

    /// Detection pipeline output
    pub processed: ProcessedDetections,
}
