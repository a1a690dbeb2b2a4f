//! `convert` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ConvertArgs;

/// Execute the `convert` command
pub fn run_convert(args: &ConvertArgs) -> Result<()> {
    info!(
        input = %args.input.display(),
        output = %args.output.display(),
        "Converting legacy capture"
    );

    replay::convert_legacy_capture_to_replay_csv(&args.input, &args.output)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    println!("Conversion completed: {}", args.output.display());
    Ok(())
}
