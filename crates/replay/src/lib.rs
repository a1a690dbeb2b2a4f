//! # Replay
//!
//! Replay-file I/O for the ultrasonic pipeline.
//!
//! Responsibilities:
//! - Decode replay-input CSV (legacy and typed rows) into timestamp-grouped frames
//! - Write replay-output CSV summaries
//! - Convert opaque legacy captures into replay CSV

mod legacy;
mod reader;
mod writer;

pub use legacy::convert_legacy_capture_to_replay_csv;
pub use reader::load_replay_csv;
pub use writer::write_output_csv;

// Re-export contracts types
pub use contracts::{FrameInput, FrameOutput};
