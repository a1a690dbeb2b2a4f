//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use config_loader::ConfigLoader;
use processor::RING_SENSOR_COUNT;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    group_filter: String,
    processing_method: String,
    min_range_m: f32,
    max_range_m: f32,
    cluster_radius_m: f32,
    strict_monotonic_timestamps: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    geometry: Option<GeometrySummary>,
}

#[derive(Serialize)]
struct GeometrySummary {
    contour_points: usize,
    sensors: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    let config = match ConfigLoader::load_processor_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            return ValidationResult {
                valid: false,
                config_path,
                error: Some(e.to_string()),
                warnings: None,
                summary: None,
            };
        }
    };

    let mut warnings = collect_warnings(&config);

    let geometry = match &args.geometry {
        Some(path) => match ConfigLoader::load_vehicle_geometry(path) {
            Ok(geometry) => {
                if geometry.sensors.len() != RING_SENSOR_COUNT {
                    warnings.push(format!(
                        "Vehicle geometry has {} sensors, not {} - the built-in ring will be used",
                        geometry.sensors.len(),
                        RING_SENSOR_COUNT
                    ));
                }
                Some(GeometrySummary {
                    contour_points: geometry.contour.len(),
                    sensors: geometry.sensors.len(),
                })
            }
            Err(e) => {
                return ValidationResult {
                    valid: false,
                    config_path,
                    error: Some(e.to_string()),
                    warnings: None,
                    summary: None,
                };
            }
        },
        None => None,
    };

    ValidationResult {
        valid: true,
        config_path,
        error: None,
        warnings: if warnings.is_empty() {
            None
        } else {
            Some(warnings)
        },
        summary: Some(ConfigSummary {
            group_filter: format!("{:?}", config.group_filter),
            processing_method: format!("{:?}", config.processing_method),
            min_range_m: config.min_range_m,
            max_range_m: config.max_range_m,
            cluster_radius_m: config.cluster_radius_m,
            strict_monotonic_timestamps: config.strict_monotonic_timestamps,
            geometry,
        }),
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &contracts::ProcessorConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.strict_monotonic_timestamps {
        warnings.push(
            "strictMonotonicTimestamps disabled - out-of-order frames will be accepted"
                .to_string(),
        );
    }

    if config.cluster_radius_m > config.max_range_m {
        warnings.push(format!(
            "clusterRadiusM ({}) exceeds maxRangeM ({}) - every frame will cluster to a single point",
            config.cluster_radius_m, config.max_range_m
        ));
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Group filter: {}", summary.group_filter);
            println!("  Method: {}", summary.processing_method);
            println!(
                "  Range band: ({}, {}] m",
                summary.min_range_m, summary.max_range_m
            );
            println!("  Cluster radius: {} m", summary.cluster_radius_m);
            println!(
                "  Strict timestamps: {}",
                summary.strict_monotonic_timestamps
            );
            if let Some(ref geometry) = summary.geometry {
                println!(
                    "  Geometry: {} contour points, {} sensors",
                    geometry.contour_points, geometry.sensors
                );
            }
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args_for(config: PathBuf) -> ValidateArgs {
        ValidateArgs {
            config,
            geometry: None,
            json: false,
        }
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let result = validate_config(&args_for(PathBuf::from("/nonexistent/cfg.ini")));
        assert!(!result.valid);
        assert!(result.error.unwrap().contains("File not found"));
    }

    #[test]
    fn test_valid_config_produces_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.ini");
        std::fs::write(&path, "[SignalWays]\ngroupID = REAR\n").unwrap();

        let result = validate_config(&args_for(path));
        assert!(result.valid);
        assert_eq!(result.summary.unwrap().group_filter, "Rear");
    }

    #[test]
    fn test_constraint_violation_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.ini");
        std::fs::write(&path, "[General]\nminRangeM = 9.0\nmaxRangeM = 1.0\n").unwrap();

        let result = validate_config(&args_for(path));
        assert!(!result.valid);
    }

    #[test]
    fn test_strict_disabled_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg.ini");
        std::fs::write(&path, "[General]\nstrictMonotonicTimestamps = off\n").unwrap();

        let result = validate_config(&args_for(path));
        assert!(result.valid);
        assert!(result.warnings.unwrap()[0].contains("strictMonotonicTimestamps"));
    }
}
