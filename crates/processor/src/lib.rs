//! # Processor
//!
//! 超声波障碍物检测核心（逐帧处理）。
//!
//! 负责：
//! - 帧时间戳严格排序校验
//! - 自车位姿插值
//! - 量程/分组过滤
//! - 三种几何重建（信号追踪 / FOV 扇区交点 / 椭圆交点）
//! - 跨方法融合与连通域聚类
//!
//! ## 使用示例
//!
//! ```ignore
//! use processor::UltrasoundProcessor;
//! use contracts::{FrameInput, ProcessorConfig, VehicleState};
//!
//! let mut processor = UltrasoundProcessor::new(ProcessorConfig::default());
//! processor.push_vehicle_state(state)?;
//!
//! processor.process_frame(&frame)?;
//! if let Some(output) = processor.last_output() {
//!     // Handle processed frame
//! }
//! ```

mod cluster;
mod detect;
mod fuse;
mod geometry;
mod pose_buffer;
mod processor;
mod ring;

pub use pose_buffer::PoseBuffer;
pub use processor::UltrasoundProcessor;
pub use ring::{SensorPose, SensorRing, RING_SENSOR_COUNT};

// Re-export contracts types
pub use contracts::{
    Detection, Diagnostics, FrameInput, FrameOutput, ProcessedDetections, ProcessorConfig,
    StageTimingUs, VehicleState,
};
