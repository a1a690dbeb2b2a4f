//! # Integration Tests
//!
//! Integration tests and end-to-end tests.
//!
//! Responsibilities:
//! - Contract snapshot tests
//! - Replay-file round trips (CSV in, processed CSV out)
//! - Full-pipeline flows (replay -> processor -> dispatcher)
