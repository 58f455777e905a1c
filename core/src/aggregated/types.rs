//! aggregated/types.rs
//! Protobuf shape of an aggregate body and the reasons an envelope is
//! rejected as non-aggregated.
//!
//! Field tags and labels follow the producer's proto2 schema. String fields
//! are decoded as bytes so that a digest-verified aggregate carrying non-UTF-8
//! keys still expands; keys are converted lossily during expansion.
//!
//! ```text
//! message AggregatedRecord {
//!   repeated string partition_key_table     = 1;
//!   repeated string explicit_hash_key_table = 2;
//!   repeated Record records                 = 3;
//! }
//! message Tag    { required string key = 1; optional string value = 2; }
//! message Record {
//!   required uint64 partition_key_index     = 1;
//!   optional uint64 explicit_hash_key_index = 2;
//!   required bytes  data                    = 3;
//!   repeated Tag    tags                    = 4;
//! }
//! ```

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;

/// Decoded aggregate body.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AggregatedRecord {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub partition_key_table: Vec<Vec<u8>>,
    #[prost(bytes = "vec", repeated, tag = "2")]
    pub explicit_hash_key_table: Vec<Vec<u8>>,
    #[prost(message, repeated, tag = "3")]
    pub records: Vec<SubRecord>,
}

/// One packed user record.
///
/// `partition_key_index` is required on the wire but decoded as `Option` so a
/// producer that omits it is detected instead of silently reading index 0.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SubRecord {
    #[prost(uint64, optional, tag = "1")]
    pub partition_key_index: Option<u64>,
    #[prost(uint64, optional, tag = "2")]
    pub explicit_hash_key_index: Option<u64>,
    #[prost(bytes = "bytes", required, tag = "3")]
    pub data: Bytes,
    #[prost(message, repeated, tag = "4")]
    pub tags: Vec<Tag>,
}

/// Opaque key/value tag, carried through untouched.
///
/// Kept as raw bytes: producers do not guarantee UTF-8.
#[derive(Clone, PartialEq, Eq, Hash, ::prost::Message)]
pub struct Tag {
    #[prost(bytes = "vec", required, tag = "1")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub value: Option<Vec<u8>>,
}

impl Tag {
    pub fn new(key: impl Into<Vec<u8>>, value: Option<Vec<u8>>) -> Self {
        Self { key: key.into(), value }
    }

    pub fn key_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.key)
    }

    pub fn value_lossy(&self) -> Option<Cow<'_, str>> {
        self.value.as_deref().map(String::from_utf8_lossy)
    }
}

/// Why a physical record was classified as non-aggregated.
///
/// Ordered the way the checks run: cheapest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassthroughReason {
    /// Payload shorter than the magic prefix.
    TooShort,
    /// Leading bytes are not the aggregate magic.
    MagicMismatch,
    /// Nothing after the magic beyond (at most) a digest.
    MissingDigest,
    /// Trailing digest does not match the body.
    DigestMismatch,
    /// Body is not a decodable aggregate.
    DecodeFailed,
    /// Body decoded but holds no user records.
    NoRecords,
}

impl PassthroughReason {
    pub const ALL: [PassthroughReason; 6] = [
        PassthroughReason::TooShort,
        PassthroughReason::MagicMismatch,
        PassthroughReason::MissingDigest,
        PassthroughReason::DigestMismatch,
        PassthroughReason::DecodeFailed,
        PassthroughReason::NoRecords,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PassthroughReason::TooShort => "too_short",
            PassthroughReason::MagicMismatch => "magic_mismatch",
            PassthroughReason::MissingDigest => "missing_digest",
            PassthroughReason::DigestMismatch => "digest_mismatch",
            PassthroughReason::DecodeFailed => "decode_failed",
            PassthroughReason::NoRecords => "no_records",
        }
    }
}

impl fmt::Display for PassthroughReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
