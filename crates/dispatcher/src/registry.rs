//! DispatchRegistry - per-channel sink registration and frame fan-out.

use contracts::{
    DispatchStatus, DynamicFeatureSink, FrameOutput, GridMapSink, LineMarkSink,
    ProcessedDetectionsSink, SignalWaySink, StaticFeatureSink,
};
use tracing::debug;

/// Number of dispatch channels
const CHANNEL_COUNT: usize = 6;

/// Registry of six optional sinks, one per output channel.
///
/// Registration is idempotent per channel (the latest sink wins).
/// `dispatch` invokes every registered sink exactly once with the
/// corresponding slice and the frame timestamp. Registration and dispatch
/// are not synchronized internally; callers using threads serialize access
/// externally.
#[derive(Default)]
pub struct DispatchRegistry {
    signal_ways: Option<SignalWaySink>,
    static_features: Option<StaticFeatureSink>,
    dynamic_features: Option<DynamicFeatureSink>,
    line_marks: Option<LineMarkSink>,
    grid_map: Option<GridMapSink>,
    processed_detections: Option<ProcessedDetectionsSink>,
    dispatched_frames: u64,
}

impl DispatchRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the signal-way sink (replaces any previous one)
    pub fn register_signal_ways(&mut self, sink: SignalWaySink) {
        self.signal_ways = Some(sink);
    }

    /// Register the static-feature sink
    pub fn register_static_features(&mut self, sink: StaticFeatureSink) {
        self.static_features = Some(sink);
    }

    /// Register the dynamic-feature sink
    pub fn register_dynamic_features(&mut self, sink: DynamicFeatureSink) {
        self.dynamic_features = Some(sink);
    }

    /// Register the line-mark sink
    pub fn register_line_marks(&mut self, sink: LineMarkSink) {
        self.line_marks = Some(sink);
    }

    /// Register the grid-map sink
    pub fn register_grid_map(&mut self, sink: GridMapSink) {
        self.grid_map = Some(sink);
    }

    /// Register the processed-detections sink
    pub fn register_processed_detections(&mut self, sink: ProcessedDetectionsSink) {
        self.processed_detections = Some(sink);
    }

    /// Number of channels with a registered sink
    pub fn registered_channels(&self) -> usize {
        usize::from(self.signal_ways.is_some())
            + usize::from(self.static_features.is_some())
            + usize::from(self.dynamic_features.is_some())
            + usize::from(self.line_marks.is_some())
            + usize::from(self.grid_map.is_some())
            + usize::from(self.processed_detections.is_some())
    }

    /// Frames fanned out so far
    pub fn dispatched_frames(&self) -> u64 {
        self.dispatched_frames
    }

    /// Fan one processed frame out to every registered sink
    pub fn dispatch(&mut self, frame: &FrameOutput) {
        if let Some(sink) = self.signal_ways.as_mut() {
            sink(&frame.signal_ways, frame.timestamp_us);
        }
        if let Some(sink) = self.static_features.as_mut() {
            sink(&frame.static_features, frame.timestamp_us);
        }
        if let Some(sink) = self.dynamic_features.as_mut() {
            sink(&frame.dynamic_features, frame.timestamp_us);
        }
        if let Some(sink) = self.line_marks.as_mut() {
            sink(&frame.line_marks, frame.timestamp_us);
        }
        if let Some(sink) = self.grid_map.as_mut() {
            sink(&frame.grid_map, frame.timestamp_us);
        }
        if let Some(sink) = self.processed_detections.as_mut() {
            sink(&frame.processed, frame.timestamp_us);
        }

        self.dispatched_frames += 1;
        if self.dispatched_frames % 100 == 0 {
            debug!(frames = self.dispatched_frames, "Dispatch progress");
        }
    }

    /// Remove all registered sinks
    pub fn clear(&mut self) {
        self.signal_ways = None;
        self.static_features = None;
        self.dynamic_features = None;
        self.line_marks = None;
        self.grid_map = None;
        self.processed_detections = None;
    }

    /// Availability report for the dispatch path
    pub fn status(&self) -> DispatchStatus {
        DispatchStatus {
            available: true,
            description: format!(
                "dispatch registry ready ({}/{} channels registered)",
                self.registered_channels(),
                CHANNEL_COUNT
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Detection, ProcessedDetections, SignalWay};
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn frame_with_two_ways(timestamp_us: u64) -> FrameOutput {
        FrameOutput {
            timestamp_us,
            signal_ways: vec![SignalWay::default(), SignalWay::default()],
            processed: ProcessedDetections {
                clustered: vec![Detection::new(1.0, 0.0)],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_dispatch_fans_out_to_registered_sinks() {
        let way_count = Arc::new(AtomicU64::new(0));
        let frame_count = Arc::new(AtomicU64::new(0));

        let mut registry = DispatchRegistry::new();
        let ways = Arc::clone(&way_count);
        registry.register_signal_ways(Box::new(move |slice, _ts| {
            ways.fetch_add(slice.len() as u64, Ordering::Relaxed);
        }));
        let frames = Arc::clone(&frame_count);
        registry.register_processed_detections(Box::new(move |_detections, _ts| {
            frames.fetch_add(1, Ordering::Relaxed);
        }));

        registry.dispatch(&frame_with_two_ways(1000));
        registry.dispatch(&frame_with_two_ways(2000));

        assert_eq!(way_count.load(Ordering::Relaxed), 4);
        assert_eq!(frame_count.load(Ordering::Relaxed), 2);
        assert_eq!(registry.dispatched_frames(), 2);
    }

    #[test]
    fn test_latest_registration_wins() {
        let first = Arc::new(AtomicU64::new(0));
        let second = Arc::new(AtomicU64::new(0));

        let mut registry = DispatchRegistry::new();
        let counter = Arc::clone(&first);
        registry.register_processed_detections(Box::new(move |_d, _t| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
        let counter = Arc::clone(&second);
        registry.register_processed_detections(Box::new(move |_d, _t| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
        assert_eq!(registry.registered_channels(), 1);

        registry.dispatch(&frame_with_two_ways(1000));
        assert_eq!(first.load(Ordering::Relaxed), 0);
        assert_eq!(second.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_clear_removes_all_sinks() {
        let count = Arc::new(AtomicU64::new(0));
        let mut registry = DispatchRegistry::new();
        let counter = Arc::clone(&count);
        registry.register_signal_ways(Box::new(move |_s, _t| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));

        registry.clear();
        registry.dispatch(&frame_with_two_ways(1000));

        assert_eq!(count.load(Ordering::Relaxed), 0);
        assert_eq!(registry.registered_channels(), 0);
    }

    #[test]
    fn test_status_reports_channel_count() {
        let mut registry = DispatchRegistry::new();
        let status = registry.status();
        assert!(status.available);
        assert!(status.description.contains("0/6"));

        registry.register_grid_map(Box::new(|_g, _t| {}));
        assert!(registry.status().description.contains("1/6"));
    }

    #[test]
    fn test_sink_receives_frame_timestamp() {
        let seen = Arc::new(AtomicU64::new(0));
        let mut registry = DispatchRegistry::new();
        let timestamp = Arc::clone(&seen);
        registry.register_line_marks(Box::new(move |_marks, ts| {
            timestamp.store(ts, Ordering::Relaxed);
        }));

        registry.dispatch(&frame_with_two_ways(4242));
        assert_eq!(seen.load(Ordering::Relaxed), 4242);
    }
}
