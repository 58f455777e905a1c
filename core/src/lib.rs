//! deagg-core
//!
//! Pure Rust deaggregation of batched stream records.
//! No I/O, no async runtime, no re-aggregation.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Building blocks
pub mod crypto;
pub mod aggregated;
pub mod records;
pub mod telemetry;

// Deaggregator
pub mod deagg;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::aggregated::{PassthroughReason, Tag};
    pub use crate::deagg::{
        deaggregate_records, iter_deaggregate_records, DeaggConfig, Deaggregated, Deaggregator,
        IndexErrorPolicy, ParallelismProfile,
    };
    pub use crate::records::{EncryptionType, LogicalRecord, PhysicalRecord};
    pub use crate::telemetry::{DeaggCounters, DeaggSnapshot};
    pub use crate::types::DeaggError;
}

pub use deagg::{deaggregate_records, Deaggregator};
