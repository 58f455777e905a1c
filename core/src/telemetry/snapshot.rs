//! telemetry/snapshot.rs
//!
//! Immutable view over `DeaggCounters` plus elapsed time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::DeaggCounters;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeaggSnapshot {
    pub counters: DeaggCounters,
    pub passthrough_total: u64,
    /// `records_out / records_in`; `0.0` for an empty call.
    pub expansion_ratio: f64,
    pub throughput_records_per_sec: f64,
    pub elapsed: Duration,
}

impl DeaggSnapshot {
    pub fn from(counters: &DeaggCounters, elapsed: Duration) -> Self {
        let expansion_ratio = if counters.records_in > 0 {
            counters.records_out as f64 / counters.records_in as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.records_in as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            passthrough_total: counters.passthrough_total(),
            expansion_ratio,
            throughput_records_per_sec: throughput,
            elapsed,
        }
    }

    /// Internal invariants:
    /// - every input was either expanded or passed through
    /// - output never shrinks below input unless sub-records were skipped
    pub fn sanity_check(&self) -> bool {
        let c = &self.counters;
        c.aggregates + self.passthrough_total == c.records_in
            && (c.sub_records_skipped > 0 || c.records_out >= c.records_in)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
