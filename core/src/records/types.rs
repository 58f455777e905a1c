//! records/types.rs
//! Physical (transport) and logical (user) record types.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::aggregated::{SubRecord, Tag};

/// Server-side encryption applied to a physical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EncryptionType {
    None,
    Kms,
}

/// One transport-level record, possibly an aggregate.
/// Owned by the caller; deaggregation only borrows it.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalRecord {
    pub data: Bytes,
    pub partition_key: String,
    pub sequence_number: String,
    pub explicit_hash_key: Option<String>,
    pub approximate_arrival_timestamp: Option<DateTime<Utc>>,
    pub encryption_type: Option<EncryptionType>,
    /// Firehose / Analytics record id, echoed back by transformers.
    pub record_id: Option<String>,
    pub shard_id: Option<String>,
    pub schema_version: Option<String>,
    /// Transport envelope fields (`eventID`, `awsRegion`, `eventSourceARN`, ...),
    /// copied unchanged onto every logical record.
    pub event_metadata: Map<String, Value>,
}

impl PhysicalRecord {
    pub fn new(
        partition_key: impl Into<String>,
        sequence_number: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            data: data.into(),
            partition_key: partition_key.into(),
            sequence_number: sequence_number.into(),
            explicit_hash_key: None,
            approximate_arrival_timestamp: None,
            encryption_type: None,
            record_id: None,
            shard_id: None,
            schema_version: None,
            event_metadata: Map::new(),
        }
    }

    pub fn with_arrival_timestamp(mut self, ts: DateTime<Utc>) -> Self {
        self.approximate_arrival_timestamp = Some(ts);
        self
    }

    pub fn with_encryption_type(mut self, encryption_type: EncryptionType) -> Self {
        self.encryption_type = Some(encryption_type);
        self
    }

    pub fn with_explicit_hash_key(mut self, key: impl Into<String>) -> Self {
        self.explicit_hash_key = Some(key.into());
        self
    }

    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    pub fn with_shard_id(mut self, shard_id: impl Into<String>) -> Self {
        self.shard_id = Some(shard_id.into());
        self
    }

    pub fn with_event_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.event_metadata.insert(key.into(), value.into());
        self
    }
}

/// One user record: a passthrough or an entry extracted from an aggregate.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalRecord {
    pub partition_key: String,
    pub explicit_hash_key: Option<String>,
    pub data: Bytes,
    pub sequence_number: String,
    /// Position inside the parent aggregate; `0` for passthrough records.
    pub sub_sequence_number: u64,
    /// `true` only for records extracted from an aggregate.
    pub aggregated: bool,
    pub tags: Vec<Tag>,
    pub approximate_arrival_timestamp: Option<DateTime<Utc>>,
    pub encryption_type: Option<EncryptionType>,
    pub record_id: Option<String>,
    pub shard_id: Option<String>,
    pub schema_version: Option<String>,
    pub event_metadata: Map<String, Value>,
}

impl LogicalRecord {
    /// The physical record, unchanged, as a single user record.
    pub fn passthrough(record: &PhysicalRecord) -> Self {
        Self {
            partition_key: record.partition_key.clone(),
            explicit_hash_key: record.explicit_hash_key.clone(),
            data: record.data.clone(),
            sequence_number: record.sequence_number.clone(),
            sub_sequence_number: 0,
            aggregated: false,
            tags: Vec::new(),
            approximate_arrival_timestamp: record.approximate_arrival_timestamp,
            encryption_type: record.encryption_type,
            record_id: record.record_id.clone(),
            shard_id: record.shard_id.clone(),
            schema_version: record.schema_version.clone(),
            event_metadata: record.event_metadata.clone(),
        }
    }

    /// A user record extracted from `parent` with keys already resolved.
    pub(crate) fn from_sub_record(
        parent: &PhysicalRecord,
        sub: &SubRecord,
        partition_key: String,
        explicit_hash_key: Option<String>,
        sub_sequence_number: u64,
    ) -> Self {
        Self {
            partition_key,
            explicit_hash_key,
            data: sub.data.clone(),
            sequence_number: parent.sequence_number.clone(),
            sub_sequence_number,
            aggregated: true,
            tags: sub.tags.clone(),
            approximate_arrival_timestamp: parent.approximate_arrival_timestamp,
            encryption_type: parent.encryption_type,
            record_id: parent.record_id.clone(),
            shard_id: parent.shard_id.clone(),
            schema_version: parent.schema_version.clone(),
            event_metadata: parent.event_metadata.clone(),
        }
    }

    /// Checkpoint position `(sequence_number, sub_sequence_number)`.
    pub fn checkpoint(&self) -> (&str, u64) {
        (&self.sequence_number, self.sub_sequence_number)
    }
}
