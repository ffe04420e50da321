//! Argon2id key derivation: secret + salt → [`DerivedKey`].
//!
//! The cost parameters below are part of the `AES256:` wire format. Changing
//! any of them makes every existing value undecryptable, so a change needs a
//! new [`FormatVersion`](super::FormatVersion).

use aes_gcm_siv::aead::{rand_core::RngCore, OsRng};
use argon2::{Algorithm, Argon2, Params, Version};
use common::CryptoError;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Byte length of the per-envelope Argon2id salt.
pub const SALT_LEN: usize = 16;

/// Argon2id memory cost in KiB (19 MiB).
pub const KDF_MEMORY_KIB: u32 = 19_456;

/// Argon2id passes over memory.
pub const KDF_ITERATIONS: u32 = 2;

/// Argon2id lanes.
pub const KDF_PARALLELISM: u32 = 1;

/// Random salt embedded in every envelope.
pub type Salt = [u8; SALT_LEN];

/// A 256-bit key derived from the caller's secret.
///
/// Lives only for the duration of one call (or one batch) and is overwritten
/// with zeroes when dropped, including on error paths.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    bytes: [u8; KEY_LEN],
}

impl DerivedKey {
    /// Wrap raw key bytes. Intended for tests and callers holding their own
    /// key material; everything else should go through [`derive_key`].
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material, not even in debug builds.
        f.write_str("DerivedKey([REDACTED])")
    }
}

/// Generate a fresh salt from the OS CSPRNG.
pub fn generate_salt() -> Salt {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derive the encryption key for `secret` under `salt`.
///
/// Deterministic: the same `(secret, salt)` pair always yields the same key.
/// The secret is read in place and never copied.
///
/// # Errors
///
/// Returns [`CryptoError::EmptySecret`] if `secret` is empty and
/// [`CryptoError::KeyDerivation`] if Argon2id rejects its inputs (unreachable
/// with the fixed parameters above).
pub fn derive_key(secret: &str, salt: &Salt) -> Result<DerivedKey, CryptoError> {
    if secret.is_empty() {
        return Err(CryptoError::EmptySecret);
    }

    let params = Params::new(KDF_MEMORY_KIB, KDF_ITERATIONS, KDF_PARALLELISM, Some(KEY_LEN))
        .map_err(|e| CryptoError::KeyDerivation(format!("invalid Argon2id params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let mut key = DerivedKey {
        bytes: [0u8; KEY_LEN],
    };
    argon2
        .hash_password_into(secret.as_bytes(), salt, &mut key.bytes)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    Ok(key)
}
