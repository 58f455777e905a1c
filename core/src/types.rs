use thiserror::Error;

/// Which key table a sub-record pointed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTable {
    PartitionKey,
    ExplicitHashKey,
}

impl std::fmt::Display for KeyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyTable::PartitionKey => write!(f, "partition key table"),
            KeyTable::ExplicitHashKey => write!(f, "explicit hash key table"),
        }
    }
}

/// Unified deaggregation error.
/// - Non-aggregate input is never an error; it is passed through.
/// - `From<T>` impls enable `?` across adapters.
#[derive(Debug, Error)]
pub enum DeaggError {
    /// A digest-verified aggregate references a key outside its table.
    /// `index` is `None` when the required partition key index is absent.
    #[error(
        "structural index error in record {sequence_number} (sub-record {sub_sequence_number}): \
         {table} index {index:?} out of range (len {table_len})"
    )]
    StructuralIndex {
        table: KeyTable,
        index: Option<u64>,
        table_len: usize,
        sub_sequence_number: u64,
        sequence_number: String,
    },

    /// Malformed input event (bad base64, bad timestamp, missing field).
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// JSON event could not be parsed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parallel worker or channel failure.
    #[error("pipeline error: {0}")]
    Pipeline(&'static str),
}

impl From<base64::DecodeError> for DeaggError {
    fn from(e: base64::DecodeError) -> Self {
        DeaggError::InvalidEvent(format!("base64: {}", e))
    }
}
