//! telemetry/counters.rs
//! Mutable counters collected while deaggregating.
//!
//! Converted into an immutable `DeaggSnapshot` at the end of a call.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::aggregated::PassthroughReason;

/// Deterministic counters collected during deaggregation.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeaggCounters {
    pub records_in: u64,
    pub records_out: u64,
    pub aggregates: u64,
    pub passthrough_too_short: u64,
    pub passthrough_magic_mismatch: u64,
    pub passthrough_missing_digest: u64,
    pub passthrough_digest_mismatch: u64,
    pub passthrough_decode_failed: u64,
    pub passthrough_no_records: u64,
    pub sub_records_skipped: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

impl DeaggCounters {
    /// Record one physical record entering classification.
    pub fn add_input(&mut self, payload_len: usize) {
        self.records_in += 1;
        self.bytes_in += payload_len as u64;
    }

    /// Record one passthrough decision.
    pub fn add_passthrough(&mut self, reason: PassthroughReason, payload_len: usize) {
        match reason {
            PassthroughReason::TooShort => self.passthrough_too_short += 1,
            PassthroughReason::MagicMismatch => self.passthrough_magic_mismatch += 1,
            PassthroughReason::MissingDigest => self.passthrough_missing_digest += 1,
            PassthroughReason::DigestMismatch => self.passthrough_digest_mismatch += 1,
            PassthroughReason::DecodeFailed => self.passthrough_decode_failed += 1,
            PassthroughReason::NoRecords => self.passthrough_no_records += 1,
        }
        self.add_output(payload_len);
    }

    pub fn add_aggregate(&mut self) {
        self.aggregates += 1;
    }

    /// Record one emitted user record.
    pub fn add_output(&mut self, data_len: usize) {
        self.records_out += 1;
        self.bytes_out += data_len as u64;
    }

    pub fn add_skipped(&mut self) {
        self.sub_records_skipped += 1;
    }

    pub fn passthrough(&self, reason: PassthroughReason) -> u64 {
        match reason {
            PassthroughReason::TooShort => self.passthrough_too_short,
            PassthroughReason::MagicMismatch => self.passthrough_magic_mismatch,
            PassthroughReason::MissingDigest => self.passthrough_missing_digest,
            PassthroughReason::DigestMismatch => self.passthrough_digest_mismatch,
            PassthroughReason::DecodeFailed => self.passthrough_decode_failed,
            PassthroughReason::NoRecords => self.passthrough_no_records,
        }
    }

    pub fn passthrough_total(&self) -> u64 {
        PassthroughReason::ALL.iter().map(|r| self.passthrough(*r)).sum()
    }

    // Per-worker counters are merged after the fact: no locks or atomics inside workers.
    pub fn merge(&mut self, other: &DeaggCounters) {
        self.records_in += other.records_in;
        self.records_out += other.records_out;
        self.aggregates += other.aggregates;
        self.passthrough_too_short += other.passthrough_too_short;
        self.passthrough_magic_mismatch += other.passthrough_magic_mismatch;
        self.passthrough_missing_digest += other.passthrough_missing_digest;
        self.passthrough_digest_mismatch += other.passthrough_digest_mismatch;
        self.passthrough_decode_failed += other.passthrough_decode_failed;
        self.passthrough_no_records += other.passthrough_no_records;
        self.sub_records_skipped += other.sub_records_skipped;
        self.bytes_in += other.bytes_in;
        self.bytes_out += other.bytes_out;
    }
}

impl AddAssign for DeaggCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
