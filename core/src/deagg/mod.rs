//! deagg: the deaggregator.
//!
//! Every physical record is classified on its own bytes:
//!
//! ```text
//! len >= 4 && magic == F3 89 9A C2      else passthrough
//! len - 4 > 16                          else passthrough
//! md5(body) == trailing 16 bytes        else passthrough (if verify_digest)
//! protobuf decode(body) ok, >= 1 record else passthrough
//! resolve keys per sub-record           else StructuralIndex (per IndexErrorPolicy)
//! ```
//!
//! Passthrough is the documented handling of non-aggregated data and is
//! never reported as an error.

pub mod config;
pub mod core;
pub mod parallel;

pub use config::{DeaggConfig, IndexErrorPolicy};
pub use self::core::{
    deaggregate_records,
    iter_deaggregate_records,
    DeaggBatch,
    DeaggIter,
    Deaggregated,
    Deaggregator,
};
pub use parallel::ParallelismProfile;
