//! # Config Loader
//!
//! 配置加载与解析模块。
//!
//! 负责：
//! - 解析处理器 INI 配置（General / Conversion / SignalWays 各节）
//! - 解析车辆几何 INI（轮廓 + USS 传感器标定）
//! - 校验数值约束
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let config = ConfigLoader::load_processor_config(Path::new("processor.ini")).unwrap();
//! println!("cluster radius: {}", config.cluster_radius_m);
//! ```

mod parser;
mod validator;

pub use contracts::{ProcessorConfig, VehicleGeometry};

use std::path::Path;

use contracts::{PipelineError, Result};

/// 配置加载器
///
/// 提供从文件或字符串加载配置的静态方法。
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从文件路径加载处理器配置
    ///
    /// # Errors
    /// - 文件读取失败
    /// - 数值解析失败（含行号）
    /// - 约束校验失败
    pub fn load_processor_config(path: &Path) -> Result<ProcessorConfig> {
        let content = Self::read_file(path, "config")?;
        Self::processor_config_from_str(&content)
    }

    /// 从字符串加载处理器配置
    pub fn processor_config_from_str(content: &str) -> Result<ProcessorConfig> {
        let config = parser::parse_processor_config(content)?;
        validator::validate_processor_config(&config)?;
        Ok(config)
    }

    /// 从文件路径加载车辆几何
    ///
    /// # Errors
    /// - 文件读取失败
    /// - 键值格式非法（含行号）
    /// - 轮廓或传感器列表为空
    pub fn load_vehicle_geometry(path: &Path) -> Result<VehicleGeometry> {
        let content = Self::read_file(path, "vehicle geometry")?;
        Self::vehicle_geometry_from_str(&content)
    }

    /// 从字符串加载车辆几何
    pub fn vehicle_geometry_from_str(content: &str) -> Result<VehicleGeometry> {
        let geometry = parser::parse_vehicle_geometry(content)?;
        validator::validate_vehicle_geometry(&geometry)?;
        Ok(geometry)
    }
}

impl ConfigLoader {
    /// 读取配置文件内容
    fn read_file(path: &Path, what: &str) -> Result<String> {
        std::fs::read_to_string(path).map_err(|_| {
            PipelineError::invalid_input(format!(
                "unable to open {what} file: {}",
                path.display()
            ))
        })
    }
}
