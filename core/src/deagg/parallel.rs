use std::thread;

use crossbeam::channel::bounded;

use crate::constants::{DEFAULT_MIN_CHUNK_RECORDS, MAX_WORKERS};
use crate::records::{LogicalRecord, PhysicalRecord};
use crate::telemetry::DeaggCounters;
use crate::types::DeaggError;

/// Parallelism configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParallelismProfile {
    pub worker_count: usize,
    /// Physical records below which a chunk is not worth a thread.
    pub min_chunk_records: usize,
}

impl ParallelismProfile {
    pub fn single_threaded() -> Self {
        Self {
            worker_count: 1,
            min_chunk_records: DEFAULT_MIN_CHUNK_RECORDS,
        }
    }

    /// One worker per core, leaving one core free.
    pub fn dynamic() -> Self {
        let cores = num_cpus::get();
        Self {
            worker_count: cores.saturating_sub(1).clamp(1, MAX_WORKERS),
            min_chunk_records: DEFAULT_MIN_CHUNK_RECORDS,
        }
    }

    pub fn with_workers(worker_count: usize, min_chunk_records: usize) -> Self {
        Self {
            worker_count: worker_count.clamp(1, MAX_WORKERS),
            min_chunk_records: min_chunk_records.max(1),
        }
    }

    /// Records per chunk for `total` inputs.
    pub fn chunk_size(&self, total: usize) -> usize {
        let workers = self.worker_count.max(1);
        total.div_ceil(workers).max(self.min_chunk_records.max(1))
    }
}

type ChunkResult = Result<(Vec<LogicalRecord>, DeaggCounters), DeaggError>;

/// Fan `records` out over `profile.worker_count` scoped threads and
/// reassemble the per-chunk results in input order.
///
/// `run_chunk` must be pure per chunk. On failure the error of the earliest
/// failing chunk is returned, which is the error a sequential pass would hit.
pub(crate) fn run_ordered<F>(
    records: &[PhysicalRecord],
    profile: &ParallelismProfile,
    run_chunk: F,
) -> ChunkResult
where
    F: Fn(&[PhysicalRecord]) -> ChunkResult + Sync,
{
    let chunk_size = profile.chunk_size(records.len());
    let chunks: Vec<&[PhysicalRecord]> = records.chunks(chunk_size).collect();
    let workers = profile.worker_count.min(chunks.len()).max(1);

    if workers == 1 {
        return run_chunk(records);
    }

    tracing::debug!(
        records = records.len(),
        chunks = chunks.len(),
        workers,
        "parallel deaggregation"
    );

    thread::scope(|scope| {
        // Capacity covers every chunk, so neither side ever blocks on send.
        let (job_tx, job_rx) = bounded::<(usize, &[PhysicalRecord])>(chunks.len());
        let (out_tx, out_rx) = bounded::<(usize, ChunkResult)>(chunks.len());

        for i in 0..workers {
            let rx = job_rx.clone();
            let tx = out_tx.clone();
            let run_chunk = &run_chunk;
            scope.spawn(move || {
                tracing::trace!(worker = i, "starting");
                for (idx, chunk) in rx.iter() {
                    if tx.send((idx, run_chunk(chunk))).is_err() {
                        break;
                    }
                }
                tracing::trace!(worker = i, "finished");
            });
        }
        drop(job_rx);
        drop(out_tx);

        for (idx, chunk) in chunks.iter().enumerate() {
            job_tx
                .send((idx, *chunk))
                .map_err(|_| DeaggError::Pipeline("job channel closed"))?;
        }
        drop(job_tx);

        // ---- Ordered reassembly ----
        let mut slots: Vec<Option<ChunkResult>> = (0..chunks.len()).map(|_| None).collect();
        for (idx, res) in out_rx.iter() {
            slots[idx] = Some(res);
        }

        let mut out = Vec::with_capacity(records.len());
        let mut counters = DeaggCounters::default();
        for slot in slots {
            let (logical, c) =
                slot.ok_or(DeaggError::Pipeline("worker exited before finishing its chunk"))??;
            out.extend(logical);
            counters.merge(&c);
        }

        Ok((out, counters))
    })
}
