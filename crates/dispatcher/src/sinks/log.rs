//! Log sinks - frame summaries via tracing

use contracts::{ProcessedDetectionsSink, SignalWaySink};
use tracing::info;

/// Sink that logs a per-frame detection summary
pub fn detections_log_sink(name: impl Into<String>) -> ProcessedDetectionsSink {
    let name = name.into();
    Box::new(move |detections, timestamp_us| {
        info!(
            sink = %name,
            timestamp_us,
            tracing = detections.tracing.len(),
            fov = detections.fov_intersections.len(),
            ellipse = detections.ellipse_intersections.len(),
            fused = detections.fused.len(),
            clustered = detections.clustered.len(),
            "Processed detections received"
        );
    })
}

/// Sink that logs the filtered signal-way count per frame
pub fn signal_ways_log_sink(name: impl Into<String>) -> SignalWaySink {
    let name = name.into();
    Box::new(move |ways, timestamp_us| {
        info!(
            sink = %name,
            timestamp_us,
            signal_ways = ways.len(),
            "Signal ways received"
        );
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ProcessedDetections, SignalWay};

    #[test]
    fn test_log_sinks_accept_frames() {
        let mut detections_sink = detections_log_sink("test_log");
        detections_sink(&ProcessedDetections::default(), 1000);

        let mut ways_sink = signal_ways_log_sink("test_ways");
        ways_sink(&[SignalWay::default()], 1000);
    }
}
