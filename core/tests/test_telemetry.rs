// Telemetry counters and snapshots produced by the deaggregator.

mod common;

use std::time::Duration;

use deagg_core::aggregated::PassthroughReason;
use deagg_core::deagg::Deaggregator;
use deagg_core::telemetry::{DeaggCounters, DeaggSnapshot};

use common::*;

#[test]
fn counters_follow_classification() {
    let (agg, _) = generate_aggregate(3);
    let (mut corrupt, _) = generate_aggregate(2);
    corrupt[5] ^= 0x10;

    let batch = vec![
        physical(agg),
        physical(&b"No"[..]),
        physical(&b"plain record"[..]),
        physical(corrupt),
    ];

    let out = Deaggregator::default().deaggregate_batch(&batch).unwrap();
    let c = &out.telemetry.counters;

    assert_eq!(c.records_in, 4);
    assert_eq!(c.records_out, 6);
    assert_eq!(c.aggregates, 1);
    assert_eq!(c.passthrough(PassthroughReason::TooShort), 1);
    assert_eq!(c.passthrough(PassthroughReason::MagicMismatch), 1);
    assert_eq!(c.passthrough(PassthroughReason::DigestMismatch), 1);
    assert_eq!(out.telemetry.passthrough_total, 3);
    assert!((out.telemetry.expansion_ratio - 1.5).abs() < f64::EPSILON);
    assert!(out.telemetry.sanity_check());

    let bytes_in: u64 = batch.iter().map(|r| r.data.len() as u64).sum();
    assert_eq!(c.bytes_in, bytes_in);
}

#[test]
fn merge_and_add_assign_agree() {
    let mut a = DeaggCounters::default();
    a.add_input(10);
    a.add_passthrough(PassthroughReason::MagicMismatch, 10);

    let mut b = DeaggCounters::default();
    b.add_input(40);
    b.add_aggregate();
    b.add_output(5);
    b.add_output(6);

    let mut merged = a.clone();
    merged.merge(&b);

    let mut summed = a;
    summed += b;

    assert_eq!(merged, summed);
    assert_eq!(merged.records_in, 2);
    assert_eq!(merged.records_out, 3);
    assert_eq!(merged.bytes_out, 21);
}

#[test]
fn empty_snapshot_is_zeroed() {
    let snap = DeaggSnapshot::from(&DeaggCounters::default(), Duration::ZERO);
    assert_eq!(snap.expansion_ratio, 0.0);
    assert_eq!(snap.throughput_records_per_sec, 0.0);
    assert!(snap.sanity_check());
}

#[test]
fn snapshot_serializes_to_json() {
    let mut counters = DeaggCounters::default();
    counters.add_input(3);
    counters.add_passthrough(PassthroughReason::TooShort, 3);

    let snap = DeaggSnapshot::from(&counters, Duration::from_millis(2));
    let json = snap.to_json().unwrap();
    let back: DeaggSnapshot = serde_json::from_str(&json).unwrap();
    assert_eq!(back.counters, snap.counters);
    assert_eq!(back.elapsed, snap.elapsed);
    assert!(json.contains("\"passthrough_too_short\":1"));
}
