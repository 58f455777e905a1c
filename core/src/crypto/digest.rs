//! crypto/digest.rs
//! MD5 integrity digest over an aggregate body.
//!
//! The digest only detects corruption and non-aggregated payloads. It is not
//! an authenticity check.

use std::fmt;

use md5::{Digest as _, Md5};

use crate::constants::DIGEST_LEN;

/// Digest-related errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    InvalidLength { expected: usize, actual: usize },
    DigestMismatch { expected: [u8; DIGEST_LEN], actual: [u8; DIGEST_LEN] },
}

impl fmt::Display for DigestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DigestError::*;
        match self {
            InvalidLength { expected, actual } =>
                write!(f, "digest length mismatch: expected {}, got {}", expected, actual),
            DigestMismatch { expected, actual } =>
                write!(f, "digest mismatch: expected {}, computed {}",
                    hex::encode(expected), hex::encode(actual)),
        }
    }
}

impl std::error::Error for DigestError {}

/// Compute the 16-byte MD5 of `data`.
#[inline]
pub fn md5_digest(data: &[u8]) -> [u8; DIGEST_LEN] {
    let out = Md5::digest(data);
    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&out);
    digest
}

/// Verify that `expected` is the MD5 of `body`.
///
/// Comparison is byte-for-byte; a short or long `expected` is rejected before
/// hashing.
pub fn verify_md5(body: &[u8], expected: &[u8]) -> Result<(), DigestError> {
    if expected.len() != DIGEST_LEN {
        return Err(DigestError::InvalidLength {
            expected: DIGEST_LEN,
            actual: expected.len(),
        });
    }

    let actual = md5_digest(body);
    if actual[..] == expected[..] {
        Ok(())
    } else {
        let mut want = [0u8; DIGEST_LEN];
        want.copy_from_slice(expected);
        Err(DigestError::DigestMismatch { expected: want, actual })
    }
}
