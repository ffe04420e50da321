//! Envelope layout and its textual encoding.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::CryptoError;

use super::kdf::{Salt, SALT_LEN};

/// Byte length of an AES-GCM-SIV nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the AES-GCM-SIV authentication tag.
pub const TAG_LEN: usize = 16;

/// Smallest decodable envelope: salt, nonce and the tag of an empty plaintext.
pub const MIN_ENVELOPE_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN;

/// Wire format versions this crate understands.
///
/// Each version owns a distinct literal prefix. Any change to key length,
/// nonce length, KDF parameters, or tag presence gets a new variant so old and
/// new values stay distinguishable forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatVersion {
    /// Argon2id → AES-256-GCM-SIV, `salt[16] | nonce[12] | ciphertext | tag[16]`.
    Aes256GcmSivV1,
}

impl FormatVersion {
    /// The version new values are written with.
    pub const CURRENT: FormatVersion = FormatVersion::Aes256GcmSivV1;

    const ALL: [FormatVersion; 1] = [FormatVersion::Aes256GcmSivV1];

    /// Literal prefix that opens every encoded value of this version.
    pub const fn prefix(self) -> &'static str {
        match self {
            FormatVersion::Aes256GcmSivV1 => "AES256:",
        }
    }

    /// Identify the format of `text` by its prefix alone.
    pub fn detect(text: &str) -> Option<FormatVersion> {
        Self::ALL
            .into_iter()
            .find(|version| text.starts_with(version.prefix()))
    }
}

/// A parsed, encrypted value.
///
/// The string representation is `AES256:<base64(salt || nonce || ciphertext || tag)>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub version: FormatVersion,
    /// Argon2id salt the key was derived under.
    pub salt: Salt,
    pub nonce: [u8; NONCE_LEN],
    /// Ciphertext followed by the [`TAG_LEN`]-byte authentication tag.
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Length of the plaintext this envelope decrypts to.
    pub fn plaintext_len(&self) -> usize {
        self.ciphertext.len().saturating_sub(TAG_LEN)
    }

    /// Encode this value to its canonical string representation.
    pub fn encode(&self) -> String {
        let mut packed = Vec::with_capacity(SALT_LEN + NONCE_LEN + self.ciphertext.len());
        packed.extend_from_slice(&self.salt);
        packed.extend_from_slice(&self.nonce);
        packed.extend_from_slice(&self.ciphertext);

        let prefix = self.version.prefix();
        let mut out = String::with_capacity(prefix.len() + packed.len().div_ceil(3) * 4);
        out.push_str(prefix);
        STANDARD.encode_string(&packed, &mut out);
        out
    }

    /// Parse an encoded string back into an [`Envelope`].
    ///
    /// ASCII whitespace inside the base64 body is ignored, so line-wrapped
    /// output from MIME-style encoders still parses.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Format`] if the prefix is not a known format
    /// version, the body is not valid base64, or the decoded bytes are shorter
    /// than [`MIN_ENVELOPE_LEN`]. Callers should treat a missing prefix as "not
    /// encrypted with this scheme" rather than attempt decryption.
    pub fn decode(text: &str) -> Result<Self, CryptoError> {
        let version = FormatVersion::detect(text)
            .ok_or_else(|| CryptoError::Format("unrecognised format prefix".into()))?;
        let body = &text[version.prefix().len()..];

        let body: Cow<'_, str> = if body.bytes().any(|b| b.is_ascii_whitespace()) {
            Cow::Owned(body.chars().filter(|c| !c.is_ascii_whitespace()).collect())
        } else {
            Cow::Borrowed(body)
        };

        let packed = STANDARD
            .decode(body.as_bytes())
            .map_err(|e| CryptoError::Format(format!("invalid base64 body: {e}")))?;
        if packed.len() < MIN_ENVELOPE_LEN {
            return Err(CryptoError::Format(format!(
                "envelope is {} bytes, expected at least {MIN_ENVELOPE_LEN}",
                packed.len()
            )));
        }

        let (salt_bytes, rest) = packed.split_at(SALT_LEN);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_LEN);

        let mut salt = [0u8; SALT_LEN];
        salt.copy_from_slice(salt_bytes);
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(nonce_bytes);

        Ok(Self {
            version,
            salt,
            nonce,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for Envelope {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}
