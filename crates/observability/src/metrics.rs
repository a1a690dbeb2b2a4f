//! 帧级指标收集模块
//!
//! 基于 FrameOutput 与 Diagnostics 记录指标，并在内存中聚合运行摘要。

use std::collections::HashMap;

use contracts::{Diagnostics, ErrorKind, FrameOutput, StageTimingUs};
use metrics::{counter, gauge, histogram};

/// 记录一帧处理成功的指标
///
/// 每次 `process_frame` 成功后调用。
///
/// # Example
///
/// ```ignore
/// use observability::record_frame_metrics;
///
/// if processor.process_frame(&frame).is_ok() {
///     if let Some(output) = processor.last_output() {
///         record_frame_metrics(output, &processor.diagnostics());
///     }
/// }
/// ```
pub fn record_frame_metrics(output: &FrameOutput, diag: &Diagnostics) {
    // 帧计数器
    counter!("uss_pipeline_frames_total").increment(1);

    // 检测数量
    gauge!("uss_pipeline_fused_detections").set(output.processed.fused.len() as f64);
    gauge!("uss_pipeline_clustered_detections").set(output.processed.clustered.len() as f64);
    histogram!("uss_pipeline_clustered_detections_hist")
        .record(output.processed.clustered.len() as f64);

    // 过滤计数（累计值）
    gauge!("uss_pipeline_filtered_signal_ways_total").set(diag.filtered_signal_ways as f64);

    // 分阶段耗时
    let timing = &diag.last_stage_timing_us;
    histogram!("uss_pipeline_stage_us", "stage" => "decode").record(timing.decode as f64);
    histogram!("uss_pipeline_stage_us", "stage" => "interpolate")
        .record(timing.interpolate as f64);
    histogram!("uss_pipeline_stage_us", "stage" => "convert").record(timing.convert as f64);
    histogram!("uss_pipeline_stage_us", "stage" => "postprocess")
        .record(timing.postprocess as f64);
    histogram!("uss_pipeline_stage_us", "stage" => "publish").record(timing.publish as f64);
}

/// 记录一帧被丢弃
pub fn record_frame_dropped(kind: ErrorKind) {
    let reason = match kind {
        ErrorKind::OutOfOrderTimestamp => "out_of_order",
        ErrorKind::MissingVehicleState => "missing_state",
        ErrorKind::InvalidInput => "invalid_input",
        ErrorKind::InternalError => "internal",
    };
    counter!("uss_pipeline_frames_dropped_total", "reason" => reason).increment(1);
}

/// 诊断聚合器
///
/// 在内存中聚合每帧统计，便于运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsAggregator {
    /// 成功处理帧数
    pub total_frames: u64,

    /// 融合检测数统计
    pub fused_stats: RunningStats,

    /// 聚类检测数统计
    pub clustered_stats: RunningStats,

    /// 各阶段耗时统计（微秒）
    pub stage_stats: HashMap<&'static str, RunningStats>,
}

impl DiagnosticsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 聚合一帧输出
    pub fn update(&mut self, output: &FrameOutput, timing: &StageTimingUs) {
        self.total_frames += 1;
        self.fused_stats.push(output.processed.fused.len() as f64);
        self.clustered_stats
            .push(output.processed.clustered.len() as f64);

        for (stage, value) in [
            ("decode", timing.decode),
            ("interpolate", timing.interpolate),
            ("convert", timing.convert),
            ("postprocess", timing.postprocess),
            ("publish", timing.publish),
        ] {
            self.stage_stats
                .entry(stage)
                .or_default()
                .push(value as f64);
        }
    }

    /// 生成摘要报告
    pub fn summary(&self, diag: &Diagnostics) -> DiagnosticsSummary {
        DiagnosticsSummary {
            processed_frames: diag.processed_frames,
            dropped_frames: diag.dropped_frames,
            out_of_order_frames: diag.out_of_order_frames,
            missing_state_frames: diag.missing_state_frames,
            invalid_input_frames: diag.invalid_input_frames,
            filtered_signal_ways: diag.filtered_signal_ways,
            clustered_detections: diag.clustered_detections,
            fused_per_frame: StatsSummary::from(&self.fused_stats),
            clustered_per_frame: StatsSummary::from(&self.clustered_stats),
            postprocess_us: self
                .stage_stats
                .get("postprocess")
                .map(StatsSummary::from)
                .unwrap_or_default(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 诊断摘要
#[derive(Debug, Clone, Default)]
pub struct DiagnosticsSummary {
    pub processed_frames: u64,
    pub dropped_frames: u64,
    pub out_of_order_frames: u64,
    pub missing_state_frames: u64,
    pub invalid_input_frames: u64,
    pub filtered_signal_ways: u64,
    pub clustered_detections: u64,
    pub fused_per_frame: StatsSummary,
    pub clustered_per_frame: StatsSummary,
    pub postprocess_us: StatsSummary,
}

impl std::fmt::Display for DiagnosticsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Pipeline Diagnostics Summary ===")?;
        writeln!(f, "Processed frames: {}", self.processed_frames)?;
        writeln!(
            f,
            "Dropped frames: {} (out-of-order={}, missing-state={}, invalid-input={})",
            self.dropped_frames,
            self.out_of_order_frames,
            self.missing_state_frames,
            self.invalid_input_frames
        )?;
        writeln!(f, "Filtered signal ways: {}", self.filtered_signal_ways)?;
        writeln!(f, "Clustered detections: {}", self.clustered_detections)?;
        writeln!(f, "Fused per frame: {}", self.fused_per_frame)?;
        writeln!(f, "Clustered per frame: {}", self.clustered_per_frame)?;
        writeln!(f, "Postprocess time (us): {}", self.postprocess_us)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Detection, ProcessedDetections};

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        stats.push(1.0);
        stats.push(2.0);
        stats.push(3.0);
        stats.push(4.0);
        stats.push(5.0);

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = DiagnosticsAggregator::new();

        let output = FrameOutput {
            timestamp_us: 1000,
            processed: ProcessedDetections {
                fused: vec![Detection::new(1.0, 0.0), Detection::new(2.0, 0.0)],
                clustered: vec![Detection::new(1.5, 0.0)],
                ..Default::default()
            },
            ..Default::default()
        };
        let timing = StageTimingUs {
            postprocess: 120,
            ..Default::default()
        };

        aggregator.update(&output, &timing);

        assert_eq!(aggregator.total_frames, 1);
        assert!((aggregator.fused_stats.mean() - 2.0).abs() < 1e-10);
        assert!((aggregator.clustered_stats.mean() - 1.0).abs() < 1e-10);
        assert_eq!(aggregator.stage_stats.get("postprocess").unwrap().count(), 1);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = DiagnosticsAggregator::new();
        aggregator.update(&FrameOutput::default(), &StageTimingUs::default());

        let diag = Diagnostics {
            processed_frames: 1,
            dropped_frames: 2,
            out_of_order_frames: 1,
            invalid_input_frames: 1,
            ..Default::default()
        };
        let output = format!("{}", aggregator.summary(&diag));
        assert!(output.contains("Processed frames: 1"));
        assert!(output.contains("out-of-order=1"));
    }
}
