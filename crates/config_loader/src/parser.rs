//! INI 解析模块
//!
//! 两种方言共享同一行扫描器：
//! - 处理器配置：`;`/`#` 整行注释，未知键静默忽略
//! - 车辆几何：额外剥离行尾 `;` 注释，`(0,0)` 点视为占位符丢弃

use std::collections::BTreeMap;

use contracts::{
    ContourPoint, GroupFilter, PipelineError, ProcessingMethod, ProcessorConfig, Result,
    SensorCalibration, VehicleGeometry,
};

/// 一条 `key = value` 记录及其所在节与行号
struct IniEntry {
    line_number: usize,
    section: String,
    key: String,
    value: String,
}

/// 扫描 INI 内容为记录序列
fn scan_ini(content: &str, strip_inline_comments: bool) -> Vec<IniEntry> {
    let mut entries = Vec::new();
    let mut section = String::new();

    for (index, raw_line) in content.lines().enumerate() {
        let line_number = index + 1;
        let mut line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if strip_inline_comments {
            if let Some(pos) = line.find(';') {
                line = line[..pos].trim();
                if line.is_empty() {
                    continue;
                }
            }
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = line[1..line.len() - 1].trim().to_string();
            continue;
        }

        let Some(equal_pos) = line.find('=') else {
            continue;
        };
        entries.push(IniEntry {
            line_number,
            section: section.clone(),
            key: line[..equal_pos].trim().to_string(),
            value: line[equal_pos + 1..].trim().to_string(),
        });
    }

    entries
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_float(value: &str, line_number: usize) -> Result<f32> {
    value.parse::<f32>().map_err(|_| {
        PipelineError::invalid_input(format!("failed parsing config at line {line_number}"))
    })
}

fn parse_float_pair(value: &str, line_number: usize, what: &str) -> Result<(f32, f32)> {
    let mut parts = value.splitn(2, ',');
    let bad = || {
        PipelineError::invalid_input(format!("invalid {what} format at line {line_number}"))
    };
    let first = parts.next().ok_or_else(bad)?.trim();
    let second = parts.next().ok_or_else(bad)?.trim();
    Ok((
        first.parse::<f32>().map_err(|_| bad())?,
        second.parse::<f32>().map_err(|_| bad())?,
    ))
}

fn parse_index(key: &str, prefix: &str, line_number: usize) -> Result<usize> {
    key[prefix.len()..].parse::<usize>().map_err(|_| {
        PipelineError::invalid_input(format!("failed parsing config at line {line_number}"))
    })
}

/// 解析处理器配置；未知节/键忽略，数值失败带行号报错
pub fn parse_processor_config(content: &str) -> Result<ProcessorConfig> {
    let mut config = ProcessorConfig::default();

    for entry in scan_ini(content, false) {
        match (entry.section.as_str(), entry.key.as_str()) {
            ("Conversion", "nSigmaValeo") => {
                config.n_sigma_valeo = parse_float(&entry.value, entry.line_number)?;
            }
            ("Conversion", "legacyValeoBugfix") => {
                config.use_legacy_valeo_bugfix = parse_bool(&entry.value).ok_or_else(|| {
                    PipelineError::invalid_input("invalid bool for Conversion.legacyValeoBugfix")
                })?;
            }
            ("SignalWays", "groupID") => {
                config.group_filter = match entry.value.as_str() {
                    "FRONT" | "0" => GroupFilter::Front,
                    "REAR" | "1" => GroupFilter::Rear,
                    "SURROUND" | "2" => GroupFilter::Surround,
                    _ => {
                        return Err(PipelineError::invalid_input("invalid SignalWays.groupID"));
                    }
                };
            }
            ("SignalWays", "method") => {
                config.processing_method = match entry.value.as_str() {
                    "SIGNAL_TRACING" | "0" => ProcessingMethod::SignalTracing,
                    "FOV_INTERSECTION" | "1" => ProcessingMethod::FovIntersection,
                    "ELLIPSE_INTERSECTION" | "2" => ProcessingMethod::EllipseIntersection,
                    "ALL" | "3" => ProcessingMethod::All,
                    _ => {
                        return Err(PipelineError::invalid_input("invalid SignalWays.method"));
                    }
                };
            }
            ("SignalWays", "clusterRadiusM") => {
                config.cluster_radius_m = parse_float(&entry.value, entry.line_number)?;
            }
            ("General", "minRangeM") => {
                config.min_range_m = parse_float(&entry.value, entry.line_number)?;
            }
            ("General", "maxRangeM") => {
                config.max_range_m = parse_float(&entry.value, entry.line_number)?;
            }
            ("General", "strictMonotonicTimestamps") => {
                config.strict_monotonic_timestamps =
                    parse_bool(&entry.value).ok_or_else(|| {
                        PipelineError::invalid_input(
                            "invalid bool for General.strictMonotonicTimestamps",
                        )
                    })?;
            }
            _ => {}
        }
    }

    Ok(config)
}

/// 解析车辆几何；`contourPt<i>` 与 `uss_position_<i>` / `uss_mounting_<i>` 按索引归并
pub fn parse_vehicle_geometry(content: &str) -> Result<VehicleGeometry> {
    let mut contour_points: BTreeMap<usize, ContourPoint> = BTreeMap::new();
    let mut sensor_positions: BTreeMap<usize, (f32, f32)> = BTreeMap::new();
    let mut sensor_mountings: BTreeMap<usize, (f32, f32)> = BTreeMap::new();

    for entry in scan_ini(content, true) {
        match entry.section.as_str() {
            "Contour" if entry.key.starts_with("contourPt") => {
                let index = parse_index(&entry.key, "contourPt", entry.line_number)?;
                let (x_m, y_m) =
                    parse_float_pair(&entry.value, entry.line_number, "contour point")?;
                contour_points.insert(index, ContourPoint { x_m, y_m });
            }
            "USS SENSORS" if entry.key.starts_with("uss_position_") => {
                let index = parse_index(&entry.key, "uss_position_", entry.line_number)?;
                let pair = parse_float_pair(&entry.value, entry.line_number, "uss_position")?;
                sensor_positions.insert(index, pair);
            }
            "USS SENSORS" if entry.key.starts_with("uss_mounting_") => {
                let index = parse_index(&entry.key, "uss_mounting_", entry.line_number)?;
                let pair = parse_float_pair(&entry.value, entry.line_number, "uss_mounting")?;
                sensor_mountings.insert(index, pair);
            }
            _ => {}
        }
    }

    let mut geometry = VehicleGeometry::default();
    geometry.contour.reserve(contour_points.len());
    for point in contour_points.values() {
        // (0,0) 为模板占位点
        if point.x_m == 0.0 && point.y_m == 0.0 {
            continue;
        }
        geometry.contour.push(*point);
    }

    let sensor_count = sensor_positions.len().max(sensor_mountings.len());
    geometry.sensors = vec![SensorCalibration::default(); sensor_count];
    for (i, sensor) in geometry.sensors.iter_mut().enumerate() {
        if let Some((x_m, y_m)) = sensor_positions.get(&i) {
            sensor.x_m = *x_m;
            sensor.y_m = *y_m;
        }
        if let Some((mounting_deg, fov_deg)) = sensor_mountings.get(&i) {
            sensor.mounting_deg = *mounting_deg;
            sensor.fov_deg = *fov_deg;
        }
    }

    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_ignored() {
        let config =
            parse_processor_config("[General]\nunknownKey = 42\n[Mystery]\nfoo = bar\n").unwrap();
        assert_eq!(config.max_range_m, ProcessorConfig::default().max_range_m);
    }

    #[test]
    fn test_numeric_values_by_index() {
        let config =
            parse_processor_config("[SignalWays]\ngroupID = 1\nmethod = 0\n").unwrap();
        assert_eq!(config.group_filter, GroupFilter::Rear);
        assert_eq!(config.processing_method, ProcessingMethod::SignalTracing);
    }

    #[test]
    fn test_bad_float_reports_line_number() {
        let err = parse_processor_config("[General]\n\nminRangeM = abc\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_bad_bool_rejected() {
        let err =
            parse_processor_config("[General]\nstrictMonotonicTimestamps = maybe\n").unwrap_err();
        assert!(err.to_string().contains("strictMonotonicTimestamps"));
    }

    #[test]
    fn test_bad_enum_rejected() {
        assert!(parse_processor_config("[SignalWays]\ngroupID = SIDEWAYS\n").is_err());
        assert!(parse_processor_config("[SignalWays]\nmethod = 7\n").is_err());
    }

    #[test]
    fn test_geometry_parses_contour_and_sensors() {
        let content = r"
[Contour]
contourPt0 = -0.775, 0.822
contourPt1 = 0.0, 0.0   ; placeholder, dropped
contourPt2 = 3.238, 0.913

[USS SENSORS]
uss_position_0 = 3.238, 0.913   ; front left corner
uss_mounting_0 = 87.0, 60.0
uss_position_1 = 3.6, 0.715
uss_mounting_1 = 38.0, 100.0
";
        let geometry = parse_vehicle_geometry(content).unwrap();
        assert_eq!(geometry.contour.len(), 2);
        assert_eq!(geometry.sensors.len(), 2);
        assert_eq!(geometry.sensors[0].mounting_deg, 87.0);
        assert_eq!(geometry.sensors[1].fov_deg, 100.0);
    }

    #[test]
    fn test_geometry_bad_pair_reports_line() {
        let err = parse_vehicle_geometry("[Contour]\ncontourPt0 = 1.0\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_geometry_position_without_mounting_gets_defaults() {
        let content = "[USS SENSORS]\nuss_position_0 = 1.0, 2.0\n";
        let geometry = parse_vehicle_geometry(content).unwrap();
        assert_eq!(geometry.sensors.len(), 1);
        assert_eq!(geometry.sensors[0].fov_deg, 100.0);
    }
}
