//! Processor diagnostics - monotonic counters and per-stage timings.

use serde::{Deserialize, Serialize};

/// Per-stage wall-clock timings in microseconds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StageTimingUs {
    /// Frame validation / decode
    pub decode: u64,

    /// Ego-pose interpolation
    pub interpolate: u64,

    /// Filtering and feature conversion
    pub convert: u64,

    /// Detection, fusion, clustering
    pub postprocess: u64,

    /// Output publication
    pub publish: u64,
}

impl StageTimingUs {
    /// Add another timing sample into this accumulator
    pub fn accumulate(&mut self, other: &StageTimingUs) {
        self.decode += other.decode;
        self.interpolate += other.interpolate;
        self.convert += other.convert;
        self.postprocess += other.postprocess;
        self.publish += other.publish;
    }

    /// Total time across all stages
    pub fn total(&self) -> u64 {
        self.decode + self.interpolate + self.convert + self.postprocess + self.publish
    }
}

/// Monotonic processor counters plus stage timings
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Frames successfully processed
    pub processed_frames: u64,

    /// Frames rejected for any reason
    pub dropped_frames: u64,

    /// Frames rejected for a non-increasing timestamp
    pub out_of_order_frames: u64,

    /// Frames rejected because no vehicle state was available
    pub missing_state_frames: u64,

    /// Frames rejected as invalid input
    pub invalid_input_frames: u64,

    /// Signal ways discarded by the range/group filter
    pub filtered_signal_ways: u64,

    /// Total clustered detections across all processed frames
    pub clustered_detections: u64,

    /// Stage timings of the most recent frame
    pub last_stage_timing_us: StageTimingUs,

    /// Stage timings accumulated over the run
    pub cumulative_stage_timing_us: StageTimingUs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_timing_accumulate() {
        let mut total = StageTimingUs::default();
        let sample = StageTimingUs {
            decode: 1,
            interpolate: 2,
            convert: 3,
            postprocess: 4,
            publish: 5,
        };
        total.accumulate(&sample);
        total.accumulate(&sample);
        assert_eq!(total.decode, 2);
        assert_eq!(total.publish, 10);
        assert_eq!(total.total(), 30);
    }
}
