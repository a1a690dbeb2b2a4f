//! Sink callback contracts - dispatcher output interface
//!
//! Defines the per-channel callback types the dispatch registry accepts.
//! Callbacks receive a borrowed slice plus the frame timestamp; the registry
//! never retains frame data beyond the dispatch call.

use crate::{DynamicFeature, GridMap, LineMark, ProcessedDetections, SignalWay, StaticFeature};

/// Filtered signal-way sink
pub type SignalWaySink = Box<dyn FnMut(&[SignalWay], u64) + Send>;

/// Static-feature sink
pub type StaticFeatureSink = Box<dyn FnMut(&[StaticFeature], u64) + Send>;

/// Dynamic-feature sink
pub type DynamicFeatureSink = Box<dyn FnMut(&[DynamicFeature], u64) + Send>;

/// Line-mark sink
pub type LineMarkSink = Box<dyn FnMut(&[LineMark], u64) + Send>;

/// Grid-map sink
pub type GridMapSink = Box<dyn FnMut(&GridMap, u64) + Send>;

/// Processed-detections sink
pub type ProcessedDetectionsSink = Box<dyn FnMut(&ProcessedDetections, u64) + Send>;

/// Dispatch registry availability report
#[derive(Debug, Clone)]
pub struct DispatchStatus {
    /// Whether the dispatch path is usable
    pub available: bool,

    /// Human-readable status line
    pub description: String,
}
