//! Multi-value operations: key/value entries and string fields inside JSON
//! documents.
//!
//! Every call derives its key(s) once and drops them before returning.

use std::borrow::Cow;

use common::protocol::{BatchResponse, Entry, EntryError};
use common::CryptoError;
use serde_json::Value;
use tracing::{debug, warn};

use crate::crypto::{Opener, Sealer};

// ---------------------------------------------------------------------------
// Key/value entries
// ---------------------------------------------------------------------------

/// Encrypt the value of every entry under one derived key.
///
/// # Errors
///
/// Fails as a whole only if the key cannot be derived (e.g. empty secret).
/// Per-entry failures are reported in [`BatchResponse::errors`].
pub fn encrypt_entries(entries: Vec<Entry>, secret: &str) -> Result<BatchResponse, CryptoError> {
    let sealer = Sealer::new(secret)?;
    let total = entries.len();
    let response = collect(entries, |value| sealer.seal_str(value));
    debug!(total, failed = response.errors.len(), "batch encrypted");
    Ok(response)
}

/// Decrypt the value of every entry. Values without a known format prefix are
/// passed through unchanged.
///
/// An entry that fails to decrypt is left out of [`BatchResponse::entries`];
/// neither its ciphertext nor any partial plaintext is returned in its place.
pub fn decrypt_entries(entries: Vec<Entry>, secret: &str) -> BatchResponse {
    let mut opener = Opener::new(secret);
    let total = entries.len();
    let response = collect(entries, |value| {
        opener.open_if_encrypted(value).map(|v| v.into_owned())
    });
    debug!(
        total,
        failed = response.errors.len(),
        derived_keys = opener.derived_keys(),
        "batch decrypted"
    );
    response
}

fn collect<F>(entries: Vec<Entry>, mut transform: F) -> BatchResponse
where
    F: FnMut(&str) -> Result<String, CryptoError>,
{
    let mut response = BatchResponse::default();
    for entry in entries {
        match transform(&entry.value) {
            Ok(value) => response.entries.push(Entry {
                key: entry.key,
                value,
            }),
            Err(e) => {
                warn!(code = e.code(), "batch entry failed");
                response
                    .errors
                    .push(EntryError::new(entry.key, e.code(), e.to_string()));
            }
        }
    }
    response
}

// ---------------------------------------------------------------------------
// JSON document fields
// ---------------------------------------------------------------------------

/// Segments of a dot-notation field path.
#[derive(Debug, PartialEq, Eq)]
enum PathSegment {
    /// Navigate into an object property by name.
    Key(String),
    /// Expand into every element of a JSON array.
    ArrayItem,
}

/// Parse a dot-notation field path into a list of [`PathSegment`]s.
///
/// Array fields use the `[]` suffix before the dot separator, e.g.
/// `"orders[].card_number"` → `[Key("orders"), ArrayItem, Key("card_number")]`.
fn parse_path(path: &str) -> Vec<PathSegment> {
    let mut segments = Vec::new();
    for part in path.split('.') {
        if let Some(key) = part.strip_suffix("[]") {
            segments.push(PathSegment::Key(key.to_owned()));
            segments.push(PathSegment::ArrayItem);
        } else {
            segments.push(PathSegment::Key(part.to_owned()));
        }
    }
    segments
}

/// Recursively navigate `value` following `segments` and apply `transform` to
/// any string leaf found at the end of the path. Missing keys, type
/// mismatches and non-string leaves are skipped.
fn transform_at_path<F>(
    value: &mut Value,
    segments: &[PathSegment],
    transform: &mut F,
) -> Result<usize, CryptoError>
where
    F: FnMut(&str) -> Result<Option<String>, CryptoError>,
{
    let Some((head, rest)) = segments.split_first() else {
        if let Value::String(s) = value {
            if let Some(replacement) = transform(s)? {
                *s = replacement;
                return Ok(1);
            }
        }
        return Ok(0);
    };

    let mut changed = 0;
    match head {
        PathSegment::Key(key) => {
            if let Some(child) = value.as_object_mut().and_then(|map| map.get_mut(key)) {
                changed += transform_at_path(child, rest, transform)?;
            }
        }
        PathSegment::ArrayItem => {
            if let Value::Array(items) = value {
                for item in items.iter_mut() {
                    changed += transform_at_path(item, rest, transform)?;
                }
            }
        }
    }
    Ok(changed)
}

/// Encrypt the string fields of `doc` named by `paths`, in place.
///
/// Returns the number of fields encrypted.
///
/// # Errors
///
/// The first failure aborts the call; `doc` may then be partly encrypted and
/// should be discarded.
pub fn encrypt_fields<S: AsRef<str>>(
    doc: &mut Value,
    paths: &[S],
    secret: &str,
) -> Result<usize, CryptoError> {
    let sealer = Sealer::new(secret)?;
    let mut seal = |plain: &str| sealer.seal_str(plain).map(Some);

    let mut changed = 0;
    for path in paths {
        changed += transform_at_path(doc, &parse_path(path.as_ref()), &mut seal)?;
    }
    debug!(paths = paths.len(), changed, "document fields encrypted");
    Ok(changed)
}

/// Decrypt the encrypted string fields of `doc` named by `paths`, in place.
/// Fields without a known format prefix are left as they are.
///
/// Returns the number of fields decrypted.
///
/// # Errors
///
/// The first failure aborts the call; `doc` should then be discarded.
pub fn decrypt_fields<S: AsRef<str>>(
    doc: &mut Value,
    paths: &[S],
    secret: &str,
) -> Result<usize, CryptoError> {
    let mut opener = Opener::new(secret);
    let mut open = |value: &str| {
        opener.open_if_encrypted(value).map(|opened| match opened {
            Cow::Owned(plaintext) => Some(plaintext),
            Cow::Borrowed(_) => None,
        })
    };

    let mut changed = 0;
    for path in paths {
        changed += transform_at_path(doc, &parse_path(path.as_ref()), &mut open)?;
    }
    debug!(paths = paths.len(), changed, "document fields decrypted");
    Ok(changed)
}
