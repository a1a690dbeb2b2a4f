//! SignalWay 与辅助特征 - 传感器输入
//!
//! 超声波信号路与上游融合特征的原始数据结构。

use serde::{Deserialize, Serialize};

/// 超声波信号路（一次发射/接收回波路径）
///
/// `signal_way_id` 编码组内的 TX/RX 传感器对，见处理器的环形映射表。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SignalWay {
    /// 测量时间戳（微秒）
    pub timestamp_us: u64,

    /// 飞行时间换算距离（米）
    pub distance_m: f32,

    /// 传感器组：0 = 前，1 = 后
    pub group_id: u8,

    /// 组内信号路编号（0..15）
    pub signal_way_id: u8,
}

/// 静态特征（上游融合产物，本管线不解释内容，仅按 valid 透传）
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StaticFeature {
    /// 车体系 x（米）
    pub x_m: f32,

    /// 车体系 y（米）
    pub y_m: f32,

    /// x 标准差（米）
    pub std_x_m: f32,

    /// y 标准差（米）
    pub std_y_m: f32,

    /// 朝向（弧度）
    pub angle_rad: f32,

    /// 存在概率
    pub existence: f32,

    /// 自由空间概率
    pub free_prob: f32,

    /// 高度等级
    pub height: u8,

    /// 跟踪状态
    pub track_state: u8,

    /// 来源掩码
    pub source_mask: u8,

    /// 有效标志
    pub valid: bool,
}

/// 动态特征
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DynamicFeature {
    /// 车体系 x（米）
    pub x_m: f32,

    /// 车体系 y（米）
    pub y_m: f32,

    /// x 速度（米/秒）
    pub vx_mps: f32,

    /// y 速度（米/秒）
    pub vy_mps: f32,

    /// 有效标志
    pub valid: bool,
}

/// 线标（线段特征）
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct LineMark {
    /// 起点 x（米）
    pub x0_m: f32,

    /// 起点 y（米）
    pub y0_m: f32,

    /// 终点 x（米）
    pub x1_m: f32,

    /// 终点 y（米）
    pub y1_m: f32,

    /// 有效标志
    pub valid: bool,
}

/// 占据栅格图（整体透传，不做逐格解释）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GridMap {
    /// 行数
    pub rows: u32,

    /// 列数
    pub cols: u32,

    /// 栅格边长（米）
    pub cell_size_m: f32,

    /// 原点 x（米）
    pub origin_x_m: f32,

    /// 原点 y（米）
    pub origin_y_m: f32,

    /// 占据概率（rows * cols 个）
    pub occupancy: Vec<f32>,

    /// 有效标志
    pub valid: bool,
}
