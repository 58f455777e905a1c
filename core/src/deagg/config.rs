use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_VERIFY_DIGEST;
use crate::types::DeaggError;

/// What to do when a digest-verified aggregate points outside its key tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexErrorPolicy {
    /// Fail the whole call with `DeaggError::StructuralIndex`.
    #[default]
    Fail,
    /// Drop the offending sub-record and keep going. Remaining records keep
    /// their original sub-sequence numbers.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeaggConfig {
    /// Check the trailing MD5 before decoding.
    /// - `true` (default): digest mismatch means passthrough.
    /// - `false`: the protobuf decode is the only integrity gate.
    pub verify_digest: bool,

    pub index_policy: IndexErrorPolicy,
}

impl Default for DeaggConfig {
    fn default() -> Self {
        Self {
            verify_digest: DEFAULT_VERIFY_DIGEST,
            index_policy: IndexErrorPolicy::default(),
        }
    }
}

impl DeaggConfig {
    pub fn new(verify_digest: Option<bool>, index_policy: Option<IndexErrorPolicy>) -> Self {
        Self {
            verify_digest: verify_digest.unwrap_or(DEFAULT_VERIFY_DIGEST),
            index_policy: index_policy.unwrap_or_default(),
        }
    }

    pub fn with_verify_digest(mut self, verify_digest: bool) -> Self {
        self.verify_digest = verify_digest;
        self
    }

    pub fn with_index_policy(mut self, index_policy: IndexErrorPolicy) -> Self {
        self.index_policy = index_policy;
        self
    }

    /// Load from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, DeaggError> {
        Ok(serde_json::from_str(json)?)
    }
}
