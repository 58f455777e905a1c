use bytes::Bytes;
use prost::Message;

use crate::aggregated::types::{AggregatedRecord, PassthroughReason};
use crate::constants::{AGG_MAGIC, AGG_MAGIC_LEN, DIGEST_LEN, MIN_AGGREGATE_LEN};
use crate::crypto::verify_md5;

/// Borrowed view of an envelope that passed the length and magic checks.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeView<'a> {
    pub body: &'a [u8],
    pub digest: &'a [u8],
}

/// Cheap prefix test: does `payload` start with the aggregate magic?
#[inline]
pub fn has_magic(payload: &[u8]) -> bool {
    payload.len() >= AGG_MAGIC_LEN && payload[..AGG_MAGIC_LEN] == AGG_MAGIC
}

/// Split `magic | body | digest` without hashing or decoding.
///
/// Rejects, in order:
/// - payloads shorter than the magic
/// - payloads whose prefix is not the magic
/// - payloads with `<= DIGEST_LEN` bytes after the magic
#[inline]
pub fn split_envelope(payload: &[u8]) -> Result<EnvelopeView<'_>, PassthroughReason> {
    if payload.len() < AGG_MAGIC_LEN {
        return Err(PassthroughReason::TooShort);
    }
    if payload[..AGG_MAGIC_LEN] != AGG_MAGIC {
        return Err(PassthroughReason::MagicMismatch);
    }

    if payload.len() < MIN_AGGREGATE_LEN {
        return Err(PassthroughReason::MissingDigest);
    }

    let rest = &payload[AGG_MAGIC_LEN..];
    let (body, digest) = rest.split_at(rest.len() - DIGEST_LEN);
    Ok(EnvelopeView { body, digest })
}

/// Run every classification gate and decode the body.
///
/// `Err` is a classification outcome (emit passthrough), never a failure.
/// Byte fields of the returned aggregate share `payload`'s allocation.
pub fn decode_aggregate(
    payload: &Bytes,
    verify_digest: bool,
) -> Result<AggregatedRecord, PassthroughReason> {
    let view = split_envelope(payload)?;

    if verify_digest && verify_md5(view.body, view.digest).is_err() {
        return Err(PassthroughReason::DigestMismatch);
    }

    let body = payload.slice(AGG_MAGIC_LEN..payload.len() - DIGEST_LEN);
    let aggregate = AggregatedRecord::decode(body)
        .map_err(|_| PassthroughReason::DecodeFailed)?;

    if aggregate.records.is_empty() {
        return Err(PassthroughReason::NoRecords);
    }

    Ok(aggregate)
}
