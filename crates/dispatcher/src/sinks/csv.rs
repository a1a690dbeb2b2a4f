//! CSV sink - appends clustered detections to a file

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use contracts::ProcessedDetectionsSink;
use tracing::error;

/// Sink that appends one `timestamp_us,x_m,y_m` row per clustered detection.
///
/// Write failures are logged and swallowed; dispatch never raises.
pub fn clustered_csv_sink(path: &Path) -> std::io::Result<ProcessedDetectionsSink> {
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    writeln!(out, "timestamp_us,x_m,y_m")?;

    let path = path.display().to_string();
    Ok(Box::new(move |detections, timestamp_us| {
        for det in &detections.clustered {
            if let Err(e) = writeln!(out, "{},{},{}", timestamp_us, det.x_m, det.y_m) {
                error!(sink = %path, error = %e, "Write failed");
                return;
            }
        }
        if let Err(e) = out.flush() {
            error!(sink = %path, error = %e, "Flush failed");
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Detection, ProcessedDetections};

    #[test]
    fn test_csv_sink_writes_clustered_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clustered.csv");

        let mut sink = clustered_csv_sink(&path).unwrap();
        let detections = ProcessedDetections {
            clustered: vec![Detection::new(1.5, -0.5), Detection::new(2.0, 0.25)],
            ..Default::default()
        };
        sink(&detections, 1000);
        sink(&ProcessedDetections::default(), 2000);
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "timestamp_us,x_m,y_m");
        assert_eq!(lines[1], "1000,1.5,-0.5");
        assert_eq!(lines[2], "1000,2,0.25");
        assert_eq!(lines.len(), 3);
    }
}
