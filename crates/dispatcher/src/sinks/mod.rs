//! Ready-made sink constructors.

mod csv;
mod log;

pub use csv::clustered_csv_sink;
pub use log::{detections_log_sink, signal_ways_log_sink};
