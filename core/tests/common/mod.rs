// Shared fixtures for the integration tests.
//
// Aggregates are built the way a producer would: encode the protobuf body,
// prefix the magic, append the MD5 of the body.
#![allow(dead_code)]

use bytes::Bytes;
use chrono::{TimeZone, Utc};
use prost::Message;

use deagg_core::aggregated::{AggregatedRecord, SubRecord, Tag};
use deagg_core::constants::AGG_MAGIC;
use deagg_core::crypto::md5_digest;
use deagg_core::records::{EncryptionType, PhysicalRecord};

/// Route library logs to the test harness; `RUST_LOG=deagg_core=debug` to see them.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub const SEQUENCE_NUMBER: &str = "21269319989900637946712965403778482371";
pub const PARTITION_KEY: &str = "1234";

pub fn sub_record(pk_index: u64, data: &[u8]) -> SubRecord {
    SubRecord {
        partition_key_index: Some(pk_index),
        explicit_hash_key_index: None,
        data: Bytes::copy_from_slice(data),
        tags: Vec::new(),
    }
}

pub fn sub_record_with_ehk(pk_index: u64, ehk_index: u64, data: &[u8]) -> SubRecord {
    SubRecord {
        explicit_hash_key_index: Some(ehk_index),
        ..sub_record(pk_index, data)
    }
}

pub fn tagged(mut sub: SubRecord, tags: &[(&str, Option<&str>)]) -> SubRecord {
    sub.tags = tags
        .iter()
        .map(|(k, v)| Tag::new(*k, v.map(|v| v.as_bytes().to_vec())))
        .collect();
    sub
}

pub fn aggregate(pks: &[&str], ehks: &[&str], records: Vec<SubRecord>) -> AggregatedRecord {
    AggregatedRecord {
        partition_key_table: pks.iter().map(|s| s.as_bytes().to_vec()).collect(),
        explicit_hash_key_table: ehks.iter().map(|s| s.as_bytes().to_vec()).collect(),
        records,
    }
}

/// `magic | body | md5(body)`
pub fn wrap_body(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(AGG_MAGIC.len() + body.len() + 16);
    out.extend_from_slice(&AGG_MAGIC);
    out.extend_from_slice(body);
    out.extend_from_slice(&md5_digest(body));
    out
}

pub fn encode_aggregate(agg: &AggregatedRecord) -> Vec<u8> {
    wrap_body(&agg.encode_to_vec())
}

/// `n` sub-records with partition keys `test0..test{n-1}`, explicit hash key
/// indexes `i * 10` and no explicit hash key table.
pub fn generate_aggregate(n: usize) -> (Vec<u8>, AggregatedRecord) {
    let pks: Vec<Vec<u8>> = (0..n).map(|i| format!("test{}", i).into_bytes()).collect();
    let records = (0..n)
        .map(|i| sub_record_with_ehk(i as u64, i as u64 * 10, b"Some test data string"))
        .collect();
    let agg = AggregatedRecord {
        partition_key_table: pks,
        explicit_hash_key_table: Vec::new(),
        records,
    };
    (encode_aggregate(&agg), agg)
}

pub fn physical(data: impl Into<Bytes>) -> PhysicalRecord {
    PhysicalRecord::new(PARTITION_KEY, SEQUENCE_NUMBER, data)
        .with_arrival_timestamp(Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap())
        .with_encryption_type(EncryptionType::None)
}

pub fn physical_seq(data: impl Into<Bytes>, seq: &str) -> PhysicalRecord {
    PhysicalRecord {
        sequence_number: seq.to_string(),
        ..physical(data)
    }
}
