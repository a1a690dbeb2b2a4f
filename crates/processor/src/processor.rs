//! Per-frame orchestrator.
//!
//! Runs validate -> interpolate -> filter -> detect -> fuse -> cluster ->
//! publish for each frame, maintaining diagnostics counters and stage
//! timings. Failures are non-fatal: counters update, the last-good output
//! and timestamp stay untouched, and the processor remains usable.

use std::time::Instant;

use contracts::{
    Diagnostics, FrameInput, FrameOutput, PipelineError, ProcessedDetections, ProcessorConfig,
    Result, SignalWay, StageTimingUs,
};
use tracing::{debug, instrument};

use crate::cluster::cluster_detections;
use crate::detect::ellipse::{
    collect_intersections_sampled, collect_intersections_traverse, signal_way_ellipse, SEED_PARAM,
};
use crate::detect::fov::{fov_cone_model, fov_pie_detection};
use crate::detect::tracing::tracing_detection;
use crate::fuse::fuse_method_detections;
use crate::pose_buffer::PoseBuffer;
use crate::ring::SensorRing;

/// Implicit-error acceptance for ellipse/ellipse sample harvesting
const ELLIPSE_TOLERANCE: f64 = 0.08;

/// Implicit-error limit for the best ellipse/ellipse sample
const ELLIPSE_BEST_LIMIT: f64 = 0.20;

/// Implicit-error acceptance for FOV-cone approximations
const FOV_CONE_TOLERANCE: f64 = 0.10;

/// Implicit-error limit for the best FOV-cone sample
const FOV_CONE_BEST_LIMIT: f64 = 0.25;

/// The per-frame ultrasonic detection processor.
///
/// Owns the ego-pose buffer, the last published output, the last processed
/// timestamp, the diagnostics accumulator, and an immutable configuration.
/// Not reentrant; callers serialize `push_vehicle_state` and
/// `process_frame`.
pub struct UltrasoundProcessor {
    config: ProcessorConfig,
    ring: SensorRing,
    pose_buffer: PoseBuffer,
    last_output: Option<FrameOutput>,
    last_timestamp_us: u64,
    diagnostics: Diagnostics,
}

impl UltrasoundProcessor {
    /// Create a processor with the default sensor ring
    pub fn new(config: ProcessorConfig) -> Self {
        Self::with_ring(config, SensorRing::default())
    }

    /// Create a processor with an explicit ring calibration
    pub fn with_ring(config: ProcessorConfig, ring: SensorRing) -> Self {
        Self {
            config,
            ring,
            pose_buffer: PoseBuffer::new(),
            last_output: None,
            last_timestamp_us: 0,
            diagnostics: Diagnostics::default(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// The sensor ring in use
    pub fn ring(&self) -> &SensorRing {
        &self.ring
    }

    /// Append an ego vehicle state to the pose buffer.
    ///
    /// # Errors
    /// `InvalidInput` when the state timestamp does not strictly increase.
    pub fn push_vehicle_state(&mut self, state: contracts::VehicleState) -> Result<()> {
        self.pose_buffer.push(state)
    }

    /// Process one input frame.
    ///
    /// On success the output is published (`last_output`), the last
    /// timestamp advances, and `processed_frames` increments. On failure
    /// only the drop counters change.
    #[instrument(
        level = "debug",
        name = "process_frame",
        skip(self, input),
        fields(timestamp_us = input.timestamp_us, signal_ways = input.signal_ways.len())
    )]
    pub fn process_frame(&mut self, input: &FrameInput) -> Result<()> {
        let t_decode = Instant::now();
        self.diagnostics.last_stage_timing_us = StageTimingUs::default();

        if self.config.strict_monotonic_timestamps && input.timestamp_us <= self.last_timestamp_us
        {
            self.diagnostics.dropped_frames += 1;
            self.diagnostics.out_of_order_frames += 1;
            debug!(
                timestamp_us = input.timestamp_us,
                last_timestamp_us = self.last_timestamp_us,
                "Frame dropped: timestamp out of order"
            );
            return Err(PipelineError::out_of_order("frame timestamp out of order"));
        }

        if input.signal_ways.is_empty() && input.static_features.is_empty() {
            self.diagnostics.dropped_frames += 1;
            self.diagnostics.invalid_input_frames += 1;
            debug!(
                timestamp_us = input.timestamp_us,
                "Frame dropped: no signal ways or static features"
            );
            return Err(PipelineError::invalid_input(
                "frame has no signal ways or static features",
            ));
        }
        let decode = t_decode.elapsed().as_micros() as u64;

        let t_interpolate = Instant::now();
        let Some(pose) = self.pose_buffer.interpolate(input.timestamp_us) else {
            self.diagnostics.dropped_frames += 1;
            self.diagnostics.missing_state_frames += 1;
            debug!(
                timestamp_us = input.timestamp_us,
                "Frame dropped: no vehicle state available"
            );
            return Err(PipelineError::missing_state(
                "no vehicle state available for frame",
            ));
        };
        let interpolate = t_interpolate.elapsed().as_micros() as u64;

        let t_convert = Instant::now();
        let mut output = FrameOutput {
            timestamp_us: input.timestamp_us,
            observation_pose: pose,
            ..Default::default()
        };

        for sw in &input.signal_ways {
            let range_ok = sw.distance_m > self.config.min_range_m
                && sw.distance_m <= self.config.max_range_m;
            let group_ok = self.config.group_filter.matches(sw.group_id);
            if range_ok && group_ok {
                output.signal_ways.push(*sw);
            } else {
                self.diagnostics.filtered_signal_ways += 1;
            }
        }

        output
            .static_features
            .extend(input.static_features.iter().filter(|f| f.valid));
        output
            .dynamic_features
            .extend(input.dynamic_features.iter().filter(|f| f.valid));
        output
            .line_marks
            .extend(input.line_marks.iter().filter(|f| f.valid));
        output.grid_map = input.grid_map.clone();
        let convert = t_convert.elapsed().as_micros() as u64;

        let t_postprocess = Instant::now();
        output.processed = self.post_process(&output.signal_ways);
        let postprocess = t_postprocess.elapsed().as_micros() as u64;

        let t_publish = Instant::now();
        self.diagnostics.clustered_detections += output.processed.clustered.len() as u64;
        self.last_timestamp_us = input.timestamp_us;
        self.last_output = Some(output);
        self.diagnostics.processed_frames += 1;
        let publish = t_publish.elapsed().as_micros() as u64;

        let timing = StageTimingUs {
            decode,
            interpolate,
            convert,
            postprocess,
            publish,
        };
        self.diagnostics.last_stage_timing_us = timing;
        self.diagnostics.cumulative_stage_timing_us.accumulate(&timing);

        Ok(())
    }

    /// The most recent successfully published output
    pub fn last_output(&self) -> Option<&FrameOutput> {
        self.last_output.as_ref()
    }

    /// Snapshot of the diagnostics accumulator
    pub fn diagnostics(&self) -> Diagnostics {
        self.diagnostics
    }

    /// Run the selected detection methods, fusion, and clustering over the
    /// filtered signal ways.
    fn post_process(&self, signal_ways: &[SignalWay]) -> ProcessedDetections {
        let method = self.config.processing_method;
        let mut out = ProcessedDetections::default();
        let mut ellipses = Vec::with_capacity(signal_ways.len());
        let mut fov_models = Vec::with_capacity(signal_ways.len());

        for sw in signal_ways {
            if method.runs_tracing() {
                let det = tracing_detection(&self.ring, sw);
                if !self.ring.is_inside_contour(det.x_m, det.y_m) {
                    out.tracing.push(det);
                }
            }

            if method.runs_fov() {
                if let Some(det) = fov_pie_detection(&self.ring, sw) {
                    if !self.ring.is_inside_contour(det.x_m, det.y_m) {
                        out.fov_intersections.push(det);
                    }
                }
                if let Some(model) = fov_cone_model(&self.ring, sw) {
                    fov_models.push(model);
                }
            }

            if method.runs_ellipse() {
                if let Some(model) = signal_way_ellipse(&self.ring, sw) {
                    let seed = model.point_at(SEED_PARAM);
                    if !self.ring.is_inside_contour(seed.x_m, seed.y_m) {
                        out.ellipse_intersections.push(seed);
                    }
                    ellipses.push(model);
                }
            }
        }

        if method.runs_ellipse() && ellipses.len() > 1 {
            collect_intersections_traverse(&self.ring, &ellipses, &mut out.ellipse_intersections);
            collect_intersections_sampled(
                &self.ring,
                &ellipses,
                &mut out.ellipse_intersections,
                ELLIPSE_TOLERANCE,
                ELLIPSE_BEST_LIMIT,
            );
        }

        if method.runs_fov() && fov_models.len() > 1 {
            collect_intersections_sampled(
                &self.ring,
                &fov_models,
                &mut out.fov_intersections,
                FOV_CONE_TOLERANCE,
                FOV_CONE_BEST_LIMIT,
            );
        }

        out.fused = fuse_method_detections(&out);
        out.clustered =
            cluster_detections(&out.fused, f64::from(self.config.cluster_radius_m));

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        ErrorKind, GroupFilter, Pose2, ProcessingMethod, StaticFeature, VehicleState,
    };

    fn seed_states(p: &mut UltrasoundProcessor) {
        p.push_vehicle_state(VehicleState {
            timestamp_us: 1000,
            pose: Pose2 {
                x_m: 1.0,
                y_m: 0.0,
                yaw_rad: 0.0,
            },
            ..Default::default()
        })
        .unwrap();
        p.push_vehicle_state(VehicleState {
            timestamp_us: 2000,
            pose: Pose2 {
                x_m: 3.0,
                y_m: 2.0,
                yaw_rad: 0.4,
            },
            ..Default::default()
        })
        .unwrap();
    }

    fn make_signal_way(distance_m: f32, group_id: u8, signal_way_id: u8) -> SignalWay {
        SignalWay {
            timestamp_us: 0,
            distance_m,
            group_id,
            signal_way_id,
        }
    }

    fn frame_with_ways(timestamp_us: u64, ways: &[SignalWay]) -> FrameInput {
        FrameInput {
            timestamp_us,
            signal_ways: ways.to_vec(),
            ..Default::default()
        }
    }

    #[test]
    fn test_push_vehicle_state_rejects_non_monotonic() {
        let mut p = UltrasoundProcessor::new(ProcessorConfig::default());
        p.push_vehicle_state(VehicleState {
            timestamp_us: 5000,
            ..Default::default()
        })
        .unwrap();

        let err = p
            .push_vehicle_state(VehicleState {
                timestamp_us: 5000,
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_strict_ordering_rejects_regressing_frames() {
        let mut p = UltrasoundProcessor::new(ProcessorConfig::default());
        seed_states(&mut p);

        let sw = make_signal_way(1.0, 0, 1);
        p.process_frame(&frame_with_ways(1500, &[sw])).unwrap();

        let err = p
            .process_frame(&frame_with_ways(1400, &[sw]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfOrderTimestamp);

        let diag = p.diagnostics();
        assert_eq!(diag.processed_frames, 1);
        assert_eq!(diag.out_of_order_frames, 1);
        assert_eq!(diag.dropped_frames, 1);
        // The published output and timestamp stay at the last good frame
        assert_eq!(p.last_output().unwrap().timestamp_us, 1500);
    }

    #[test]
    fn test_frame_without_state_is_dropped() {
        let mut p = UltrasoundProcessor::new(ProcessorConfig::default());

        let err = p
            .process_frame(&frame_with_ways(1500, &[make_signal_way(1.0, 0, 1)]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingVehicleState);

        let diag = p.diagnostics();
        assert_eq!(diag.processed_frames, 0);
        assert_eq!(diag.missing_state_frames, 1);
        assert!(p.last_output().is_none());
    }

    #[test]
    fn test_empty_frame_is_invalid() {
        let mut p = UltrasoundProcessor::new(ProcessorConfig::default());
        seed_states(&mut p);

        let err = p.process_frame(&frame_with_ways(1500, &[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(p.diagnostics().invalid_input_frames, 1);
    }

    #[test]
    fn test_empty_frame_with_static_features_is_valid() {
        let mut p = UltrasoundProcessor::new(ProcessorConfig::default());
        seed_states(&mut p);

        let frame = FrameInput {
            timestamp_us: 1500,
            static_features: vec![StaticFeature {
                x_m: 1.0,
                y_m: 2.0,
                valid: true,
                ..Default::default()
            }],
            ..Default::default()
        };
        p.process_frame(&frame).unwrap();
        assert_eq!(p.last_output().unwrap().static_features.len(), 1);
    }

    #[test]
    fn test_pose_interpolated_at_frame_timestamp() {
        let mut p = UltrasoundProcessor::new(ProcessorConfig::default());
        seed_states(&mut p);

        p.process_frame(&frame_with_ways(1500, &[make_signal_way(1.0, 0, 1)]))
            .unwrap();

        let pose = p.last_output().unwrap().observation_pose;
        assert!((pose.x_m - 2.0).abs() < 1e-6);
        assert!((pose.y_m - 1.0).abs() < 1e-6);
        assert!((pose.yaw_rad - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_range_and_group_filter() {
        let config = ProcessorConfig {
            group_filter: GroupFilter::Front,
            processing_method: ProcessingMethod::SignalTracing,
            min_range_m: 0.5,
            max_range_m: 3.0,
            ..Default::default()
        };
        let mut p = UltrasoundProcessor::new(config);
        seed_states(&mut p);

        let frame = frame_with_ways(
            1500,
            &[
                make_signal_way(2.0, 0, 1),  // kept
                make_signal_way(0.1, 0, 2),  // filtered: below min range
                make_signal_way(2.5, 1, 3),  // filtered: rear group
            ],
        );
        p.process_frame(&frame).unwrap();

        let output = p.last_output().unwrap();
        assert_eq!(output.signal_ways.len(), 1);
        assert_eq!(output.processed.tracing.len(), 1);
        assert_eq!(p.diagnostics().filtered_signal_ways, 2);
    }

    #[test]
    fn test_tracing_only_method_leaves_other_lists_empty() {
        let config = ProcessorConfig {
            processing_method: ProcessingMethod::SignalTracing,
            ..Default::default()
        };
        let mut p = UltrasoundProcessor::new(config);
        seed_states(&mut p);

        p.process_frame(&frame_with_ways(
            1500,
            &[make_signal_way(2.0, 0, 1), make_signal_way(2.1, 0, 2)],
        ))
        .unwrap();

        let processed = &p.last_output().unwrap().processed;
        assert!(!processed.tracing.is_empty());
        assert!(processed.fov_intersections.is_empty());
        assert!(processed.ellipse_intersections.is_empty());
        assert!(!processed.fused.is_empty());
    }

    #[test]
    fn test_single_signal_way_yields_seed_and_tracing() {
        let mut p = UltrasoundProcessor::new(ProcessorConfig::default());
        seed_states(&mut p);

        p.process_frame(&frame_with_ways(1500, &[make_signal_way(2.0, 0, 1)]))
            .unwrap();

        let processed = &p.last_output().unwrap().processed;
        assert_eq!(processed.tracing.len(), 1);
        // Single ellipse: seed point only, no pairwise intersections
        assert_eq!(processed.ellipse_intersections.len(), 1);
    }

    #[test]
    fn test_full_fusion_produces_clustered_output() {
        let mut p = UltrasoundProcessor::new(ProcessorConfig::default());
        seed_states(&mut p);

        let frame = frame_with_ways(
            1500,
            &[
                make_signal_way(2.0, 0, 1),
                make_signal_way(2.1, 0, 2),
                make_signal_way(2.3, 1, 13),
                make_signal_way(2.4, 1, 14),
            ],
        );
        p.process_frame(&frame).unwrap();

        let processed = &p.last_output().unwrap().processed;
        assert!(!processed.tracing.is_empty());
        assert!(!processed.fov_intersections.is_empty());
        assert!(!processed.ellipse_intersections.is_empty());
        assert!(!processed.fused.is_empty());
        assert!(processed.clustered.len() <= processed.fused.len());
        assert_eq!(
            p.diagnostics().clustered_detections,
            processed.clustered.len() as u64
        );
    }

    #[test]
    fn test_no_detection_inside_vehicle_contour() {
        let mut p = UltrasoundProcessor::new(ProcessorConfig::default());
        seed_states(&mut p);

        let frame = frame_with_ways(
            1500,
            &[
                make_signal_way(0.4, 0, 1),
                make_signal_way(0.5, 0, 2),
                make_signal_way(0.6, 1, 7),
                make_signal_way(0.7, 1, 8),
            ],
        );
        p.process_frame(&frame).unwrap();

        let processed = &p.last_output().unwrap().processed;
        let ring = SensorRing::default();
        for list in [
            &processed.tracing,
            &processed.fov_intersections,
            &processed.ellipse_intersections,
            &processed.fused,
        ] {
            for det in list.iter() {
                assert!(
                    !ring.is_inside_contour(det.x_m, det.y_m),
                    "detection ({}, {}) inside vehicle contour",
                    det.x_m,
                    det.y_m
                );
            }
        }
    }

    #[test]
    fn test_identical_inputs_give_identical_outputs() {
        let run = || {
            let mut p = UltrasoundProcessor::new(ProcessorConfig::default());
            seed_states(&mut p);
            p.process_frame(&frame_with_ways(
                1500,
                &[
                    make_signal_way(2.0, 0, 1),
                    make_signal_way(2.1, 0, 2),
                    make_signal_way(2.3, 1, 13),
                ],
            ))
            .unwrap();
            p.last_output().unwrap().processed.clone()
        };

        let a = run();
        let b = run();
        assert_eq!(a.fused, b.fused);
        assert_eq!(a.clustered, b.clustered);
    }

    #[test]
    fn test_stage_timings_accumulate() {
        let mut p = UltrasoundProcessor::new(ProcessorConfig::default());
        seed_states(&mut p);

        p.process_frame(&frame_with_ways(1500, &[make_signal_way(2.0, 0, 1)]))
            .unwrap();
        p.process_frame(&frame_with_ways(1600, &[make_signal_way(2.0, 0, 1)]))
            .unwrap();

        let diag = p.diagnostics();
        assert!(
            diag.cumulative_stage_timing_us.total() >= diag.last_stage_timing_us.total()
        );
    }
}
