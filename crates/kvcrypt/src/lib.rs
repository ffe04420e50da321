//! Password-based encryption of individual string values for storage.
//!
//! [`encrypt`] turns a plaintext and a caller-supplied secret into a
//! self-describing `AES256:` string; [`decrypt`] reverses it with the same
//! secret. Both are pure, synchronous functions with no shared state: safe to
//! call from any thread, never blocking on I/O.
//!
//! ```no_run
//! let stored = kvcrypt::encrypt("hello world", "mySecret123")?;
//! assert!(stored.starts_with("AES256:"));
//! assert_eq!(kvcrypt::decrypt(&stored, "mySecret123")?, "hello world");
//! assert!(kvcrypt::decrypt(&stored, "wrongSecret").is_err());
//! # Ok::<(), kvcrypt::CryptoError>(())
//! ```
//!
//! # Security invariants
//!
//! - The secret and derived keys are **never** logged or included in errors.
//! - Derived keys are zeroized on every exit path.
//! - A value that fails authentication never yields plaintext.

pub mod batch;
pub mod crypto;

use std::borrow::Cow;

use common::protocol::EnvelopeInfo;
use tracing::debug;

pub use common::CryptoError;
pub use crypto::{Envelope, FormatVersion};

use crypto::{Opener, Sealer};

/// Encrypt `plaintext` with a key derived from `secret`.
///
/// Every call draws a fresh salt and nonce, so encrypting the same plaintext
/// twice yields two different strings.
///
/// # Errors
///
/// [`CryptoError::EmptySecret`] for an empty secret; otherwise only on
/// internal primitive failures.
pub fn encrypt(plaintext: &str, secret: &str) -> Result<String, CryptoError> {
    let encoded = Sealer::new(secret)?.seal_str(plaintext)?;
    debug!(plaintext_len = plaintext.len(), encoded_len = encoded.len(), "value encrypted");
    Ok(encoded)
}

/// Decrypt a value produced by [`encrypt`].
///
/// # Errors
///
/// - [`CryptoError::Format`]: not an `AES256:` value, bad base64, or truncated.
/// - [`CryptoError::Integrity`]: wrong secret or tampered value.
/// - [`CryptoError::Encoding`]: authenticated plaintext is not UTF-8.
/// - [`CryptoError::EmptySecret`]: empty secret.
pub fn decrypt(encoded: &str, secret: &str) -> Result<String, CryptoError> {
    let plaintext = Opener::new(secret).open_str(encoded)?;
    debug!(encoded_len = encoded.len(), plaintext_len = plaintext.len(), "value decrypted");
    Ok(plaintext)
}

/// Decrypt `value` if it was encrypted by this crate, otherwise return it
/// unchanged. Suits stores that hold a mix of encrypted and plain values.
///
/// # Errors
///
/// Same as [`decrypt`] for values carrying a known prefix.
pub fn decrypt_if_encrypted<'v>(value: &'v str, secret: &str) -> Result<Cow<'v, str>, CryptoError> {
    Opener::new(secret).open_if_encrypted(value)
}

/// Whether `value` carries a known format prefix. Does not validate the body.
pub fn is_encrypted(value: &str) -> bool {
    FormatVersion::detect(value).is_some()
}

/// Parse `encoded` and report its layout without decrypting it.
///
/// # Errors
///
/// [`CryptoError::Format`] if `encoded` does not parse.
pub fn inspect(encoded: &str) -> Result<EnvelopeInfo, CryptoError> {
    let envelope = Envelope::decode(encoded)?;
    Ok(EnvelopeInfo {
        format: envelope.version.prefix().to_owned(),
        salt_len: envelope.salt.len(),
        nonce_len: envelope.nonce.len(),
        ciphertext_len: envelope.ciphertext.len(),
        plaintext_len: envelope.plaintext_len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_scenario() {
        let encoded = encrypt("hello world", "mySecret123").unwrap();
        assert!(encoded.starts_with("AES256:"));
        assert_eq!(decrypt(&encoded, "mySecret123").unwrap(), "hello world");
        assert!(decrypt(&encoded, "wrongSecret").is_err());
    }

    #[test]
    fn is_encrypted_checks_prefix_only() {
        assert!(is_encrypted("AES256:whatever"));
        assert!(!is_encrypted("whatever"));
    }

    #[test]
    fn decrypt_if_encrypted_borrows_plain_values() {
        let out = decrypt_if_encrypted("plain", "s").unwrap();
        assert!(matches!(out, Cow::Borrowed("plain")));
    }

    #[test]
    fn inspect_reports_lengths() {
        let encoded = encrypt("twelve chars", "s").unwrap();
        let info = inspect(&encoded).unwrap();
        assert_eq!(info.format, "AES256:");
        assert_eq!(info.salt_len, 16);
        assert_eq!(info.nonce_len, 12);
        assert_eq!(info.ciphertext_len, 12 + 16);
        assert_eq!(info.plaintext_len, 12);
    }

    #[test]
    fn inspect_rejects_plain_text() {
        assert!(matches!(inspect("hello"), Err(CryptoError::Format(_))));
    }
}
