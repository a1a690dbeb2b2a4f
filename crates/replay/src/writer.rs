//! Replay-output CSV writing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use contracts::{FrameOutput, Result};

/// Write one summary row per processed frame.
///
/// Header: `timestamp_us,fused_count,clustered_count`.
pub fn write_output_csv(path: &Path, frames: &[FrameOutput]) -> Result<()> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "timestamp_us,fused_count,clustered_count")?;
    for frame in frames {
        writeln!(
            out,
            "{},{},{}",
            frame.timestamp_us,
            frame.processed.fused.len(),
            frame.processed.clustered.len()
        )?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Detection, ProcessedDetections};

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let frames = vec![
            FrameOutput {
                timestamp_us: 1000,
                processed: ProcessedDetections {
                    fused: vec![Detection::new(1.0, 0.0), Detection::new(2.0, 0.0)],
                    clustered: vec![Detection::new(1.5, 0.0)],
                    ..Default::default()
                },
                ..Default::default()
            },
            FrameOutput {
                timestamp_us: 2000,
                ..Default::default()
            },
        ];

        write_output_csv(&path, &frames).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "timestamp_us,fused_count,clustered_count");
        assert_eq!(lines[1], "1000,2,1");
        assert_eq!(lines[2], "2000,0,0");
    }
}
