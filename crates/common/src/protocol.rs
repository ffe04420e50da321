//! Request and response types exchanged with batch callers.
//!
//! These types are serialised as JSON on the CLI's stdin/stdout and mirror the
//! multi-set / multi-get shape of a key/value store.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Batch entries
// ---------------------------------------------------------------------------

/// A single key/value pair. Only `value` is ever encrypted; keys stay in the
/// clear so the storage layer can still look them up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Input for `batch encrypt` and `batch decrypt`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    pub entries: Vec<Entry>,
}

/// Output of a batch operation.
///
/// `entries` holds every entry that was transformed successfully, in input
/// order. An entry that failed appears only in `errors`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchResponse {
    pub entries: Vec<Entry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EntryError>,
}

/// Per-entry failure report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryError {
    pub key: String,
    /// Short machine-readable error code (e.g. `"integrity"`).
    pub code: String,
    /// Human-readable description; never contains secret or plaintext material.
    pub message: String,
}

impl EntryError {
    /// Construct an [`EntryError`] from a key, code and message.
    pub fn new(
        key: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Inspect
// ---------------------------------------------------------------------------

/// Envelope metadata reported by `inspect`. Produced without the secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeInfo {
    /// Literal prefix of the format version, e.g. `"AES256:"`.
    pub format: String,
    pub salt_len: usize,
    pub nonce_len: usize,
    /// Length of `ciphertext || tag`.
    pub ciphertext_len: usize,
    pub plaintext_len: usize,
}
