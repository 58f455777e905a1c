
/// Magic prefix of an aggregated record.
// Protocol magic field: `[u8; 4]` so the type itself enforces "exactly 4 bytes".
pub const AGG_MAGIC: [u8; 4] = [0xF3, 0x89, 0x9A, 0xC2];
pub const AGG_MAGIC_LEN: usize = AGG_MAGIC.len();

/// Width of the trailing MD5 digest.
pub const DIGEST_LEN: usize = 16;

/// Smallest buffer that can still be an aggregate:
/// magic + at least one body byte + digest.
pub const MIN_AGGREGATE_LEN: usize = AGG_MAGIC_LEN + 1 + DIGEST_LEN;

/// Schema version assumed for records converted from Firehose / Analytics
/// event shapes, which do not carry one.
pub const DEFAULT_SCHEMA_VERSION: &str = "1.0";

/// Defaults when Option<T> is None
pub const DEFAULT_VERIFY_DIGEST: bool = true;
/// Parallel path: minimum physical records per worker chunk.
pub const DEFAULT_MIN_CHUNK_RECORDS: usize = 64;
/// Parallel path: hard cap on worker threads.
pub const MAX_WORKERS: usize = 64;
