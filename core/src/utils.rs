use std::fmt::Write as _;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::aggregated::AggregatedRecord;

/// First `max` bytes of `data` as hex, with a `...` marker when cut.
pub fn hex_preview(data: &[u8], max: usize) -> String {
    if data.len() <= max {
        hex::encode(data)
    } else {
        format!("{}...", hex::encode(&data[..max]))
    }
}

/// Multi-line dump of an aggregate that failed key resolution.
///
/// Lists both key tables, one summary line per sub-record, the parent
/// sequence number and the raw body as base64.
pub fn describe_aggregate(
    aggregate: &AggregatedRecord,
    body: &[u8],
    sequence_number: &str,
) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail.
    let _ = writeln!(out, "PKS:");
    for pk in &aggregate.partition_key_table {
        let _ = writeln!(out, "{}", String::from_utf8_lossy(pk));
    }
    let _ = writeln!(out, "EHKS:");
    for ehk in &aggregate.explicit_hash_key_table {
        let _ = writeln!(out, "{}", String::from_utf8_lossy(ehk));
    }
    for r in &aggregate.records {
        let _ = writeln!(
            out,
            "Record: [hasEhk={}, ehkIdx={:?}, pkIdx={:?}, dataLen={}, tags={}]",
            r.explicit_hash_key_index.is_some() && !aggregate.explicit_hash_key_table.is_empty(),
            r.explicit_hash_key_index,
            r.partition_key_index,
            r.data.len(),
            r.tags.len(),
        );
    }
    let _ = writeln!(out, "Sequence number: {}", sequence_number);
    let _ = writeln!(out, "Raw data: {}", STANDARD.encode(body));

    out
}
