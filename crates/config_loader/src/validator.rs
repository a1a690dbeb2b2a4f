//! 配置校验模块
//!
//! 校验规则：
//! - `0 <= minRangeM < maxRangeM`
//! - `clusterRadiusM > 0`
//! - 车辆几何的轮廓与传感器列表均非空

use contracts::{PipelineError, ProcessorConfig, Result, VehicleGeometry};

/// 校验处理器配置数值约束
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate_processor_config(config: &ProcessorConfig) -> Result<()> {
    if config.min_range_m < 0.0
        || config.max_range_m <= config.min_range_m
        || config.cluster_radius_m <= 0.0
    {
        return Err(PipelineError::invalid_input(
            "invalid numeric constraints in config",
        ));
    }
    Ok(())
}

/// 校验车辆几何完整性
pub fn validate_vehicle_geometry(geometry: &VehicleGeometry) -> Result<()> {
    if geometry.contour.is_empty() || geometry.sensors.is_empty() {
        return Err(PipelineError::invalid_input(
            "vehicle geometry missing contour and/or uss sensors",
        ));
    }
    Ok(())
}
