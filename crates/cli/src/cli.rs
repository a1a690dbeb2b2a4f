//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// USS Pipeline - Ultrasonic obstacle detection pipeline
#[derive(Parser, Debug)]
#[command(
    name = "uss-pipeline",
    author,
    version,
    about = "Ultrasonic sensor processing pipeline",
    long_about = "An ultrasonic obstacle detection pipeline for a twelve-transducer ring.\n\n\
                  Replays recorded signal-way measurements, reconstructs obstacle \n\
                  detections with three geometric methods, fuses and clusters them, \n\
                  and writes per-frame summaries."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "USS_PIPELINE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "USS_PIPELINE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded CSV through the processor
    Run(RunArgs),

    /// Convert a legacy binary capture into replay CSV
    Convert(ConvertArgs),

    /// Render processed frames as a top-down view
    View(ViewArgs),

    /// Validate configuration files without running
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Replay input CSV
    pub input: PathBuf,

    /// Output CSV (per-frame fused/clustered counts)
    pub output: PathBuf,

    /// Processor configuration INI
    #[arg(short, long, env = "USS_PIPELINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Vehicle geometry INI (overrides the built-in sensor ring)
    #[arg(long, env = "USS_PIPELINE_GEOMETRY")]
    pub geometry: Option<PathBuf>,

    /// Also write clustered detections to this CSV
    #[arg(long)]
    pub clustered_csv: Option<PathBuf>,

    /// Maximum number of frames to process (0 = unlimited)
    #[arg(long, default_value = "0", env = "USS_PIPELINE_MAX_FRAMES")]
    pub max_frames: u64,

    /// Print Prometheus-format metrics when the run completes
    #[arg(long)]
    pub metrics_dump: bool,
}

/// Arguments for the `convert` command
#[derive(Parser, Debug)]
pub struct ConvertArgs {
    /// Legacy capture file or directory (.mudp/.pcap/.dvl/.tapi/.tavi/.ffs)
    pub input: PathBuf,

    /// Output replay CSV
    pub output: PathBuf,
}

/// Arguments for the `view` command
#[derive(Parser, Debug)]
pub struct ViewArgs {
    /// Replay input CSV
    pub input: PathBuf,

    /// Processor configuration INI
    #[arg(short, long, env = "USS_PIPELINE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Vehicle geometry INI (drawn as the contour)
    #[arg(long, env = "USS_PIPELINE_GEOMETRY")]
    pub geometry: Option<PathBuf>,

    /// Maximum number of frames to render (0 = unlimited)
    #[arg(long, default_value = "0")]
    pub max_frames: u64,

    /// Hide the vehicle contour
    #[arg(long)]
    pub no_contour: bool,

    /// Hide the sensor positions
    #[arg(long)]
    pub no_sensors: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Processor configuration INI to validate
    #[arg(short, long, default_value = "processor.ini")]
    pub config: PathBuf,

    /// Vehicle geometry INI to validate
    #[arg(long)]
    pub geometry: Option<PathBuf>,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
