//! Aggregate envelope for batched stream records.
//!
//! Responsibilities:
//! - Define the protobuf body types
//! - Classify a payload as aggregate / non-aggregate
//! - Decode the body once the envelope checks pass
//!
//! Non-responsibilities:
//! - Key resolution and record expansion (see `deagg`)
//! - Encoding aggregates

pub mod types;
pub mod decode;

pub use types::{
    AggregatedRecord,
    SubRecord,
    Tag,
    PassthroughReason,
};
pub use decode::{decode_aggregate, has_magic, split_envelope, EnvelopeView};
