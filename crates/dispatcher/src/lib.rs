//! # Dispatcher
//!
//! Runtime dispatch hook: fans processed frames out to externally
//! registered per-channel sinks. Purely a boundary concern; the registry
//! is explicitly owned state, not a process-wide global, so tests can
//! reset it between cases.

mod registry;
pub mod sinks;

pub use registry::DispatchRegistry;

// Re-export contracts types
pub use contracts::{
    DispatchStatus, DynamicFeatureSink, GridMapSink, LineMarkSink, ProcessedDetectionsSink,
    SignalWaySink, StaticFeatureSink,
};
