//! Common error types shared across crates.

use thiserror::Error;

/// Errors produced by the encryption transform.
///
/// No variant ever carries secret, key, or plaintext material. Variants map to
/// stable machine-readable codes and CLI exit codes:
/// - [`CryptoError::Format`] → `"format"` / 65
/// - [`CryptoError::Integrity`] → `"integrity"` / 66
/// - [`CryptoError::Encoding`] → `"encoding"` / 67
/// - [`CryptoError::Encryption`] → `"encryption"` / 70
/// - [`CryptoError::KeyDerivation`] → `"key_derivation"` / 70
/// - [`CryptoError::EmptySecret`] → `"empty_secret"` / 64
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The encoded string is not something this scheme produced: unknown
    /// prefix, invalid base64, or too short to hold an envelope.
    #[error("invalid encoded value: {0}")]
    Format(String),

    /// The authentication tag did not verify. Either the secret is wrong or the
    /// envelope was tampered with.
    #[error("integrity check failed: wrong secret or tampered data")]
    Integrity,

    /// The envelope authenticated but the plaintext is not valid UTF-8.
    #[error("decrypted value is not valid UTF-8")]
    Encoding,

    /// The AEAD primitive refused to encrypt.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Argon2id rejected its inputs.
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// An empty secret was supplied.
    #[error("secret must not be empty")]
    EmptySecret,
}

impl CryptoError {
    /// Short machine-readable code, used in batch error reports.
    pub fn code(&self) -> &'static str {
        match self {
            CryptoError::Format(_) => "format",
            CryptoError::Integrity => "integrity",
            CryptoError::Encoding => "encoding",
            CryptoError::Encryption(_) => "encryption",
            CryptoError::KeyDerivation(_) => "key_derivation",
            CryptoError::EmptySecret => "empty_secret",
        }
    }

    /// Process exit code the CLI uses for this error (sysexits.h values).
    pub fn exit_code(&self) -> u8 {
        match self {
            CryptoError::EmptySecret => 64,
            CryptoError::Format(_) => 65,
            CryptoError::Integrity => 66,
            CryptoError::Encoding => 67,
            CryptoError::Encryption(_) | CryptoError::KeyDerivation(_) => 70,
        }
    }
}
