//! 回放运行统计与摘要输出。

use std::time::Duration;

use contracts::Diagnostics;
use observability::DiagnosticsSummary;

/// 一次回放运行的统计
#[derive(Debug, Clone, Default)]
pub struct ReplayStats {
    /// 从回放文件加载的帧数
    pub frames_loaded: u64,

    /// 成功处理的帧数
    pub frames_processed: u64,

    /// 被处理器拒绝的帧数
    pub frames_dropped: u64,

    /// 分发到 sink 的帧数
    pub dispatched_frames: u64,

    /// 运行总时长
    pub duration: Duration,

    /// 处理器诊断快照
    pub diagnostics: Diagnostics,

    /// 聚合摘要
    pub summary: DiagnosticsSummary,

    /// 分发注册表状态描述
    pub dispatch_description: String,
}

impl ReplayStats {
    /// 帧处理吞吐（帧/秒）
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames_processed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// 丢帧率（百分比）
    pub fn drop_rate(&self) -> f64 {
        let total = self.frames_processed + self.frames_dropped;
        if total > 0 {
            (self.frames_dropped as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// 输出详细摘要
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Replay Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Frames loaded: {}", self.frames_loaded);
        println!("   ├─ Frames processed: {}", self.frames_processed);
        println!(
            "   ├─ Frames dropped: {} ({:.2}%)",
            self.frames_dropped,
            self.drop_rate()
        );
        println!("   ├─ FPS: {:.2}", self.fps());
        println!("   └─ Dispatched frames: {}", self.dispatched_frames);

        let diag = &self.diagnostics;
        println!("\n📈 Processor Diagnostics");
        println!("   ├─ Out-of-order frames: {}", diag.out_of_order_frames);
        println!("   ├─ Missing-state frames: {}", diag.missing_state_frames);
        println!("   ├─ Invalid-input frames: {}", diag.invalid_input_frames);
        println!("   ├─ Filtered signal ways: {}", diag.filtered_signal_ways);
        println!("   └─ Clustered detections: {}", diag.clustered_detections);

        let timing = &diag.last_stage_timing_us;
        println!("\n⏱  Stage Timings (last frame, µs)");
        println!("   ├─ Decode: {}", timing.decode);
        println!("   ├─ Interpolate: {}", timing.interpolate);
        println!("   ├─ Convert: {}", timing.convert);
        println!("   ├─ Postprocess: {}", timing.postprocess);
        println!("   └─ Publish: {}", timing.publish);

        println!("\n📡 Dispatch");
        println!("   └─ {}", self.dispatch_description);

        println!("\n{}", self.summary);
    }
}
