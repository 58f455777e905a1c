//! records/sources.rs
//! Adapters from the JSON event shapes that deliver physical records.
//!
//! Supported shapes:
//! - Lambda stream event: `{"Records": [{"kinesis": {...}, "eventID": ...}]}`
//! - Firehose transformer event:
//!   `{"records": [{"recordId", "data", "kinesisRecordMetadata"}]}`
//! - Analytics preprocessor event:
//!   `{"records": [{"recordId", "data", "kinesisStreamRecordMetadata"}]}`
//!
//! Lambda envelope fields are kept on every record; the Firehose and
//! Analytics shapes carry none beyond their stream metadata.
//!
//! Payloads arrive base64-encoded and are decoded here, before deaggregation.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::constants::DEFAULT_SCHEMA_VERSION;
use crate::records::types::{EncryptionType, PhysicalRecord};
use crate::types::DeaggError;

/// `kinesis` object of a Lambda stream event record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KinesisPayload {
    pub kinesis_schema_version: Option<String>,
    pub partition_key: String,
    pub sequence_number: String,
    pub data: String,
    /// Epoch seconds with fractional milliseconds.
    pub approximate_arrival_timestamp: Option<f64>,
    pub encryption_type: Option<EncryptionType>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KinesisEventRecord {
    pub kinesis: KinesisPayload,
    /// Every field next to `kinesis`: `eventID`, `eventSource`,
    /// `eventSourceARN`, `awsRegion`, `eventName`, `eventVersion`,
    /// `invokeIdentityArn` and anything newer.
    #[serde(flatten)]
    pub envelope: Map<String, Value>,
}

impl KinesisEventRecord {
    /// `"<shardId>:<sequenceNumber>"`
    pub fn event_id(&self) -> Option<&str> {
        self.envelope.get("eventID").and_then(Value::as_str)
    }
}

/// Stream metadata attached by Firehose and Analytics.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRecordMetadata {
    pub sequence_number: String,
    pub partition_key: String,
    pub shard_id: Option<String>,
    /// Epoch milliseconds.
    pub approximate_arrival_timestamp: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseRecord {
    pub record_id: String,
    pub data: String,
    pub kinesis_record_metadata: StreamRecordMetadata,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    pub record_id: String,
    pub data: String,
    pub kinesis_stream_record_metadata: StreamRecordMetadata,
}

/// Any single record shape, told apart by its metadata field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EventRecord {
    Kinesis(KinesisEventRecord),
    Firehose(FirehoseRecord),
    Analytics(AnalyticsRecord),
}

/// Whole event envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordEvent {
    Lambda {
        #[serde(rename = "Records")]
        records: Vec<KinesisEventRecord>,
    },
    Transform {
        records: Vec<EventRecord>,
    },
}

fn decode_data(data: &str) -> Result<Bytes, DeaggError> {
    Ok(Bytes::from(STANDARD.decode(data)?))
}

fn timestamp_from_secs(secs: f64) -> Result<DateTime<Utc>, DeaggError> {
    if !secs.is_finite() {
        return Err(DeaggError::InvalidEvent(format!("arrival timestamp {}", secs)));
    }
    timestamp_from_millis((secs * 1000.0).round() as i64)
}

fn timestamp_from_millis(millis: i64) -> Result<DateTime<Utc>, DeaggError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| DeaggError::InvalidEvent(format!("arrival timestamp {}ms", millis)))
}

impl TryFrom<KinesisEventRecord> for PhysicalRecord {
    type Error = DeaggError;

    fn try_from(r: KinesisEventRecord) -> Result<Self, Self::Error> {
        let shard_id = r
            .event_id()
            .and_then(|id| id.split_once(':'))
            .map(|(shard, _)| shard.to_string());
        let KinesisEventRecord { kinesis: k, envelope } = r;
        let approximate_arrival_timestamp = k
            .approximate_arrival_timestamp
            .map(timestamp_from_secs)
            .transpose()?;

        Ok(PhysicalRecord {
            data: decode_data(&k.data)?,
            partition_key: k.partition_key,
            sequence_number: k.sequence_number,
            explicit_hash_key: None,
            approximate_arrival_timestamp,
            encryption_type: k.encryption_type,
            record_id: None,
            shard_id,
            schema_version: k.kinesis_schema_version,
            event_metadata: envelope,
        })
    }
}

fn from_stream_metadata(
    record_id: String,
    data: &str,
    meta: StreamRecordMetadata,
) -> Result<PhysicalRecord, DeaggError> {
    let approximate_arrival_timestamp = meta
        .approximate_arrival_timestamp
        .map(timestamp_from_millis)
        .transpose()?;

    Ok(PhysicalRecord {
        data: decode_data(data)?,
        partition_key: meta.partition_key,
        sequence_number: meta.sequence_number,
        explicit_hash_key: None,
        approximate_arrival_timestamp,
        encryption_type: None,
        record_id: Some(record_id),
        shard_id: meta.shard_id,
        // Neither shape carries a schema version.
        schema_version: Some(DEFAULT_SCHEMA_VERSION.to_string()),
        event_metadata: Map::new(),
    })
}

impl TryFrom<FirehoseRecord> for PhysicalRecord {
    type Error = DeaggError;

    fn try_from(r: FirehoseRecord) -> Result<Self, Self::Error> {
        from_stream_metadata(r.record_id, &r.data, r.kinesis_record_metadata)
    }
}

impl TryFrom<AnalyticsRecord> for PhysicalRecord {
    type Error = DeaggError;

    fn try_from(r: AnalyticsRecord) -> Result<Self, Self::Error> {
        from_stream_metadata(r.record_id, &r.data, r.kinesis_stream_record_metadata)
    }
}

impl TryFrom<EventRecord> for PhysicalRecord {
    type Error = DeaggError;

    fn try_from(r: EventRecord) -> Result<Self, Self::Error> {
        match r {
            EventRecord::Kinesis(r) => r.try_into(),
            EventRecord::Firehose(r) => r.try_into(),
            EventRecord::Analytics(r) => r.try_into(),
        }
    }
}

impl RecordEvent {
    /// Convert every record, keeping event order. Fails on the first bad record.
    pub fn into_physical_records(self) -> Result<Vec<PhysicalRecord>, DeaggError> {
        match self {
            RecordEvent::Lambda { records } => {
                records.into_iter().map(PhysicalRecord::try_from).collect()
            }
            RecordEvent::Transform { records } => {
                records.into_iter().map(PhysicalRecord::try_from).collect()
            }
        }
    }
}

/// Parse a JSON event and return its physical records in order.
pub fn physical_records_from_json(json: &str) -> Result<Vec<PhysicalRecord>, DeaggError> {
    let event: RecordEvent = serde_json::from_str(json)?;
    event.into_physical_records()
}
