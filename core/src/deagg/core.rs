//! deagg/core.rs
//!
//! Per-record classification and expansion, plus the batch, iterator and
//! callback entry points built on it.

use std::time::Instant;

use crate::aggregated::{decode_aggregate, AggregatedRecord, PassthroughReason, SubRecord};
use crate::constants::{AGG_MAGIC_LEN, DIGEST_LEN};
use crate::deagg::config::{DeaggConfig, IndexErrorPolicy};
use crate::deagg::parallel::{run_ordered, ParallelismProfile};
use crate::records::{LogicalRecord, PhysicalRecord};
use crate::telemetry::{DeaggCounters, DeaggSnapshot};
use crate::types::{DeaggError, KeyTable};
use crate::utils::{describe_aggregate, hex_preview};

/// Outcome for one physical record.
#[derive(Debug, Clone, PartialEq)]
pub enum Deaggregated {
    /// Valid aggregate, one entry per emitted sub-record.
    Expanded(Vec<LogicalRecord>),
    /// Not an aggregate; the record unchanged.
    Passthrough {
        record: LogicalRecord,
        reason: PassthroughReason,
    },
}

impl Deaggregated {
    pub fn is_aggregate(&self) -> bool {
        matches!(self, Deaggregated::Expanded(_))
    }

    pub fn passthrough_reason(&self) -> Option<PassthroughReason> {
        match self {
            Deaggregated::Passthrough { reason, .. } => Some(*reason),
            Deaggregated::Expanded(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Deaggregated::Expanded(records) => records.len(),
            Deaggregated::Passthrough { .. } => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_records(self) -> Vec<LogicalRecord> {
        match self {
            Deaggregated::Expanded(records) => records,
            Deaggregated::Passthrough { record, .. } => vec![record],
        }
    }
}

/// Records plus the telemetry of the call that produced them.
#[derive(Debug, Clone)]
pub struct DeaggBatch {
    pub records: Vec<LogicalRecord>,
    pub telemetry: DeaggSnapshot,
}

/// Validates and expands physical records.
///
/// Stateless apart from its configuration; share it freely across threads.
#[derive(Debug, Clone, Default)]
pub struct Deaggregator {
    config: DeaggConfig,
}

impl Deaggregator {
    pub fn new(config: DeaggConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeaggConfig {
        &self.config
    }

    /// Classify one physical record and expand it when it is a valid aggregate.
    ///
    /// Only a structural index error under `IndexErrorPolicy::Fail` is an `Err`.
    pub fn deaggregate_record(
        &self,
        record: &PhysicalRecord,
        counters: &mut DeaggCounters,
    ) -> Result<Deaggregated, DeaggError> {
        counters.add_input(record.data.len());

        let aggregate = match decode_aggregate(&record.data, self.config.verify_digest) {
            Ok(aggregate) => aggregate,
            Err(reason) => {
                tracing::debug!(
                    sequence_number = %record.sequence_number,
                    partition_key = %record.partition_key,
                    len = record.data.len(),
                    head = %hex_preview(&record.data, AGG_MAGIC_LEN),
                    %reason,
                    "passthrough non-aggregated record"
                );
                counters.add_passthrough(reason, record.data.len());
                return Ok(Deaggregated::Passthrough {
                    record: LogicalRecord::passthrough(record),
                    reason,
                });
            }
        };

        counters.add_aggregate();
        let mut out = Vec::with_capacity(aggregate.records.len());

        for (i, sub) in aggregate.records.iter().enumerate() {
            let sub_sequence_number = i as u64;
            match resolve_keys(&aggregate, sub, sub_sequence_number, &record.sequence_number) {
                Ok((partition_key, explicit_hash_key)) => {
                    counters.add_output(sub.data.len());
                    out.push(LogicalRecord::from_sub_record(
                        record,
                        sub,
                        partition_key,
                        explicit_hash_key,
                        sub_sequence_number,
                    ));
                }
                Err(err) => {
                    let body = &record.data[AGG_MAGIC_LEN..record.data.len() - DIGEST_LEN];
                    match self.config.index_policy {
                        IndexErrorPolicy::Fail => {
                            tracing::error!(
                                error = %err,
                                "unexpected error during deaggregation, record was:\n{}",
                                describe_aggregate(&aggregate, body, &record.sequence_number)
                            );
                            return Err(err);
                        }
                        IndexErrorPolicy::Skip => {
                            tracing::warn!(
                                error = %err,
                                sequence_number = %record.sequence_number,
                                sub_sequence_number,
                                "skipping sub-record"
                            );
                            counters.add_skipped();
                        }
                    }
                }
            }
        }

        tracing::debug!(
            sequence_number = %record.sequence_number,
            sub_records = aggregate.records.len(),
            emitted = out.len(),
            "expanded aggregate"
        );

        Ok(Deaggregated::Expanded(out))
    }

    /// Deaggregate an ordered batch. Output keeps input order; logical records
    /// of input `k` all precede those of input `k + 1`.
    pub fn deaggregate(
        &self,
        records: &[PhysicalRecord],
    ) -> Result<Vec<LogicalRecord>, DeaggError> {
        Ok(self.deaggregate_batch(records)?.records)
    }

    /// `deaggregate` plus telemetry.
    pub fn deaggregate_batch(&self, records: &[PhysicalRecord]) -> Result<DeaggBatch, DeaggError> {
        let started = Instant::now();
        let (records, counters) = self.run_chunk(records)?;
        Ok(DeaggBatch {
            records,
            telemetry: DeaggSnapshot::from(&counters, started.elapsed()),
        })
    }

    /// Same output as `deaggregate_batch`, computed on a worker pool.
    pub fn deaggregate_parallel(
        &self,
        records: &[PhysicalRecord],
        profile: &ParallelismProfile,
    ) -> Result<DeaggBatch, DeaggError> {
        let started = Instant::now();
        let (records, counters) = run_ordered(records, profile, |chunk| self.run_chunk(chunk))?;
        Ok(DeaggBatch {
            records,
            telemetry: DeaggSnapshot::from(&counters, started.elapsed()),
        })
    }

    /// Hand each logical record to `sink` in order.
    ///
    /// Records already handed over stay delivered if a later input fails.
    pub fn deaggregate_with<'a, I, F>(
        &self,
        records: I,
        mut sink: F,
    ) -> Result<DeaggSnapshot, DeaggError>
    where
        I: IntoIterator<Item = &'a PhysicalRecord>,
        F: FnMut(LogicalRecord),
    {
        let started = Instant::now();
        let mut counters = DeaggCounters::default();
        for record in records {
            for logical in self.deaggregate_record(record, &mut counters)?.into_records() {
                sink(logical);
            }
        }
        Ok(DeaggSnapshot::from(&counters, started.elapsed()))
    }

    /// Lazy form: one physical record is decoded at a time.
    pub fn iter<'a, I>(&self, records: I) -> DeaggIter<I::IntoIter>
    where
        I: IntoIterator<Item = &'a PhysicalRecord>,
    {
        DeaggIter {
            deaggregator: self.clone(),
            inner: records.into_iter(),
            pending: Vec::new().into_iter(),
            counters: DeaggCounters::default(),
            failed: false,
        }
    }

    fn run_chunk(
        &self,
        records: &[PhysicalRecord],
    ) -> Result<(Vec<LogicalRecord>, DeaggCounters), DeaggError> {
        let mut counters = DeaggCounters::default();
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            out.extend(self.deaggregate_record(record, &mut counters)?.into_records());
        }
        Ok((out, counters))
    }
}

fn resolve_keys(
    aggregate: &AggregatedRecord,
    sub: &SubRecord,
    sub_sequence_number: u64,
    sequence_number: &str,
) -> Result<(String, Option<String>), DeaggError> {
    let index_error = |table: KeyTable, index: Option<u64>, table_len: usize| {
        DeaggError::StructuralIndex {
            table,
            index,
            table_len,
            sub_sequence_number,
            sequence_number: sequence_number.to_string(),
        }
    };

    let pk_table = &aggregate.partition_key_table;
    let partition_key = sub
        .partition_key_index
        .and_then(|idx| usize::try_from(idx).ok())
        .and_then(|idx| pk_table.get(idx))
        .map(|key| key_to_string(key))
        .ok_or_else(|| {
            index_error(KeyTable::PartitionKey, sub.partition_key_index, pk_table.len())
        })?;

    let ehk_table = &aggregate.explicit_hash_key_table;
    let explicit_hash_key = match sub.explicit_hash_key_index {
        None => None,
        // An index without a table carries no key.
        Some(_) if ehk_table.is_empty() => None,
        Some(idx) => Some(
            usize::try_from(idx)
                .ok()
                .and_then(|i| ehk_table.get(i))
                .map(|key| key_to_string(key))
                .ok_or_else(|| index_error(KeyTable::ExplicitHashKey, Some(idx), ehk_table.len()))?,
        ),
    };

    Ok((partition_key, explicit_hash_key))
}

// Keys are not guaranteed to be UTF-8 on the wire.
fn key_to_string(key: &[u8]) -> String {
    String::from_utf8_lossy(key).into_owned()
}

/// Iterator returned by `Deaggregator::iter`.
///
/// Yields `Err` at most once, then ends.
pub struct DeaggIter<I> {
    deaggregator: Deaggregator,
    inner: I,
    pending: std::vec::IntoIter<LogicalRecord>,
    counters: DeaggCounters,
    failed: bool,
}

impl<I> DeaggIter<I> {
    /// Counters for everything consumed so far.
    pub fn counters(&self) -> &DeaggCounters {
        &self.counters
    }
}

impl<'a, I> Iterator for DeaggIter<I>
where
    I: Iterator<Item = &'a PhysicalRecord>,
{
    type Item = Result<LogicalRecord, DeaggError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(record) = self.pending.next() {
                return Some(Ok(record));
            }
            if self.failed {
                return None;
            }

            let physical = self.inner.next()?;
            match self.deaggregator.deaggregate_record(physical, &mut self.counters) {
                Ok(outcome) => self.pending = outcome.into_records().into_iter(),
                Err(err) => {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

/// Deaggregate with the default configuration.
pub fn deaggregate_records(records: &[PhysicalRecord]) -> Result<Vec<LogicalRecord>, DeaggError> {
    Deaggregator::default().deaggregate(records)
}

/// Lazy deaggregation with the default configuration.
pub fn iter_deaggregate_records<'a, I>(records: I) -> DeaggIter<I::IntoIter>
where
    I: IntoIterator<Item = &'a PhysicalRecord>,
{
    Deaggregator::default().iter(records)
}
