//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::{info, warn};

use config_loader::ConfigLoader;
use contracts::ProcessorConfig;
use processor::SensorRing;

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        "Starting replay run"
    );

    if !args.input.exists() {
        anyhow::bail!("Replay input not found: {}", args.input.display());
    }

    // Load and validate configuration
    let processor_config = match &args.config {
        Some(path) => ConfigLoader::load_processor_config(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ProcessorConfig::default(),
    };

    info!(
        group_filter = ?processor_config.group_filter,
        method = ?processor_config.processing_method,
        min_range_m = processor_config.min_range_m,
        max_range_m = processor_config.max_range_m,
        cluster_radius_m = processor_config.cluster_radius_m,
        "Configuration loaded"
    );

    let ring = load_ring(args)?;

    // Install the metrics recorder before any frame is processed
    let metrics_handle = if args.metrics_dump {
        Some(observability::init_metrics_recorder()?)
    } else {
        None
    };

    let pipeline = Pipeline::new(PipelineConfig {
        processor_config,
        ring,
        input_csv: args.input.clone(),
        output_csv: args.output.clone(),
        clustered_csv: args.clustered_csv.clone(),
        max_frames: if args.max_frames == 0 {
            None
        } else {
            Some(args.max_frames)
        },
    });

    let stats = pipeline.run().context("Pipeline execution failed")?;

    info!(
        frames_processed = stats.frames_processed,
        frames_dropped = stats.frames_dropped,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Replay completed"
    );

    stats.print_summary();

    if let Some(handle) = metrics_handle {
        println!("=== Metrics ===\n{}", handle.render());
    }

    Ok(())
}

/// Build a sensor ring from the vehicle geometry file, when one is given
/// and describes a full twelve-sensor ring.
fn load_ring(args: &RunArgs) -> Result<Option<SensorRing>> {
    let Some(path) = &args.geometry else {
        return Ok(None);
    };

    let geometry = ConfigLoader::load_vehicle_geometry(path)
        .with_context(|| format!("Failed to load vehicle geometry from {}", path.display()))?;

    match SensorRing::from_calibrations(&geometry.sensors) {
        Some(ring) => Ok(Some(ring)),
        None => {
            warn!(
                sensors = geometry.sensors.len(),
                "Vehicle geometry does not describe a twelve-sensor ring; using built-in ring"
            );
            Ok(None)
        }
    }
}
