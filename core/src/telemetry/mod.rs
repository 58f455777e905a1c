//! telemetry/mod.rs
//! Deaggregation counters and immutable snapshots.
//!
//! Observation only: nothing here changes what a call returns.

pub mod counters;
pub mod snapshot;

pub use counters::*;
pub use snapshot::*;
