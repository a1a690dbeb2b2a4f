//! Pipeline orchestrator - coordinates replay input, processing, and dispatch.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use contracts::{Pose2, ProcessorConfig, VehicleState};
use dispatcher::{sinks, DispatchRegistry};
use observability::{record_frame_dropped, record_frame_metrics, DiagnosticsAggregator};
use processor::{SensorRing, UltrasoundProcessor};
use tracing::{info, warn};

use super::ReplayStats;

/// Span of deterministic seeded vehicle states (microseconds)
const STATE_SEED_SPAN_US: u64 = 5_000_000;

/// Interval between seeded vehicle states (microseconds)
const STATE_SEED_STEP_US: u64 = 50_000;

/// Pipeline configuration
pub struct PipelineConfig {
    /// Processor configuration
    pub processor_config: ProcessorConfig,

    /// Sensor ring override from vehicle geometry (None = built-in ring)
    pub ring: Option<SensorRing>,

    /// Replay input CSV
    pub input_csv: PathBuf,

    /// Output CSV path
    pub output_csv: PathBuf,

    /// Optional clustered-detections CSV path
    pub clustered_csv: Option<PathBuf>,

    /// Maximum number of frames to process (None = unlimited)
    pub max_frames: Option<u64>,
}

/// Main replay pipeline
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub fn run(self) -> Result<ReplayStats> {
        let start_time = Instant::now();

        let mut processor = match &self.config.ring {
            Some(ring) => {
                UltrasoundProcessor::with_ring(self.config.processor_config, ring.clone())
            }
            None => UltrasoundProcessor::new(self.config.processor_config),
        };

        seed_vehicle_states(&mut processor);

        info!(input = %self.config.input_csv.display(), "Loading replay frames");
        let frames = replay::load_replay_csv(&self.config.input_csv).with_context(|| {
            format!(
                "Failed to load replay input {}",
                self.config.input_csv.display()
            )
        })?;
        info!(frames = frames.len(), "Replay frames loaded");

        // Processed detections go to a CSV sink when requested, a log sink
        // otherwise (latest registration per channel wins).
        let mut registry = DispatchRegistry::new();
        match &self.config.clustered_csv {
            Some(path) => {
                let sink = sinks::clustered_csv_sink(path).with_context(|| {
                    format!("Failed to create clustered CSV sink {}", path.display())
                })?;
                registry.register_processed_detections(sink);
            }
            None => {
                registry.register_processed_detections(sinks::detections_log_sink("replay_log"));
            }
        }

        let mut aggregator = DiagnosticsAggregator::new();
        let mut outputs = Vec::with_capacity(frames.len());
        let mut frames_dropped = 0u64;

        for frame in &frames {
            match processor.process_frame(frame) {
                Ok(()) => {
                    let Some(output) = processor.last_output() else {
                        continue;
                    };
                    let output = output.clone();
                    let diag = processor.diagnostics();

                    record_frame_metrics(&output, &diag);
                    aggregator.update(&output, &diag.last_stage_timing_us);
                    registry.dispatch(&output);
                    outputs.push(output);

                    if let Some(max) = self.config.max_frames {
                        if outputs.len() as u64 >= max {
                            info!(frames = outputs.len(), "Reached max frames limit");
                            break;
                        }
                    }
                }
                Err(e) => {
                    frames_dropped += 1;
                    record_frame_dropped(e.kind());
                    warn!(
                        timestamp_us = frame.timestamp_us,
                        error = %e,
                        "Dropped frame"
                    );
                }
            }
        }

        replay::write_output_csv(&self.config.output_csv, &outputs).with_context(|| {
            format!(
                "Failed to write output CSV {}",
                self.config.output_csv.display()
            )
        })?;

        let status = registry.status();
        info!(
            available = status.available,
            description = %status.description,
            "Dispatch status"
        );

        let diagnostics = processor.diagnostics();
        Ok(ReplayStats {
            frames_loaded: frames.len() as u64,
            frames_processed: outputs.len() as u64,
            frames_dropped,
            dispatched_frames: registry.dispatched_frames(),
            duration: start_time.elapsed(),
            diagnostics,
            summary: aggregator.summary(&diagnostics),
            dispatch_description: status.description,
        })
    }
}

/// Seed deterministic vehicle states covering the replay span.
///
/// States run from t = 0 over five seconds in 50 ms steps with the vehicle
/// creeping forward along +x.
fn seed_vehicle_states(processor: &mut UltrasoundProcessor) {
    let mut t = 0u64;
    while t <= STATE_SEED_SPAN_US {
        let state = VehicleState {
            timestamp_us: t,
            pose: Pose2 {
                x_m: t as f32 * 1.0e-6,
                y_m: 0.0,
                yaw_rad: 0.0,
            },
            ..Default::default()
        };
        let _ = processor.push_vehicle_state(state);
        t += STATE_SEED_STEP_US;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_processes_replay_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(
            &input,
            "50000,1.5,0,1\n100000,2.0,0,2\n100000,2.1,1,3\n",
        )
        .unwrap();

        let pipeline = Pipeline::new(PipelineConfig {
            processor_config: ProcessorConfig::default(),
            ring: None,
            input_csv: input,
            output_csv: output.clone(),
            clustered_csv: None,
            max_frames: None,
        });

        let stats = pipeline.run().unwrap();
        assert_eq!(stats.frames_loaded, 2);
        assert_eq!(stats.frames_processed, 2);
        assert_eq!(stats.frames_dropped, 0);
        assert_eq!(stats.dispatched_frames, 2);

        let content = std::fs::read_to_string(&output).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_pipeline_respects_max_frames() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(
            &input,
            "50000,1.5,0,1\n100000,2.0,0,2\n150000,2.1,0,3\n",
        )
        .unwrap();

        let pipeline = Pipeline::new(PipelineConfig {
            processor_config: ProcessorConfig::default(),
            ring: None,
            input_csv: input,
            output_csv: output,
            clustered_csv: None,
            max_frames: Some(1),
        });

        let stats = pipeline.run().unwrap();
        assert_eq!(stats.frames_processed, 1);
    }

    #[test]
    fn test_pipeline_writes_clustered_csv() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.csv");
        let output = dir.path().join("out.csv");
        let clustered = dir.path().join("clustered.csv");
        std::fs::write(&input, "50000,1.5,0,1\n").unwrap();

        let pipeline = Pipeline::new(PipelineConfig {
            processor_config: ProcessorConfig::default(),
            ring: None,
            input_csv: input,
            output_csv: output,
            clustered_csv: Some(clustered.clone()),
            max_frames: None,
        });

        pipeline.run().unwrap();
        let content = std::fs::read_to_string(&clustered).unwrap();
        assert!(content.starts_with("timestamp_us,x_m,y_m"));
        assert!(content.lines().count() > 1);
    }
}
