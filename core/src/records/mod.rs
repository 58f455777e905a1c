//! Record model: what goes into and comes out of deaggregation.

pub mod types;
pub mod sources;

pub use types::{EncryptionType, LogicalRecord, PhysicalRecord};
pub use sources::{physical_records_from_json, EventRecord, RecordEvent};
