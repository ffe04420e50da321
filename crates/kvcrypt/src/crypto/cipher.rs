//! AES-256-GCM-SIV sealing and opening of individual values.
//!
//! **Algorithm choice:** AES-256-GCM-SIV (RFC 8452) is an AEAD that degrades
//! gracefully under nonce reuse. A fresh random nonce is still drawn for every
//! value, so identical plaintexts never produce identical envelopes.
//!
//! The format prefix is bound as associated data: an envelope whose prefix is
//! swapped or stripped fails authentication instead of decrypting.

use aes_gcm_siv::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng, Payload},
    Aes256GcmSiv, Nonce,
};
use common::CryptoError;
use zeroize::{Zeroize, Zeroizing};

use super::envelope::{Envelope, FormatVersion, NONCE_LEN};
use super::kdf::{DerivedKey, Salt};

/// Encrypt `plaintext` under `key`, recording `salt` so the key can be
/// re-derived on decryption.
///
/// # Errors
///
/// Returns [`CryptoError::Encryption`] on an internal AEAD error (unreachable
/// with a valid key and nonce).
pub fn seal(plaintext: &[u8], key: &DerivedKey, salt: Salt) -> Result<Envelope, CryptoError> {
    let version = FormatVersion::CURRENT;
    let cipher = build_cipher(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let payload = Payload {
        msg: plaintext,
        aad: version.prefix().as_bytes(),
    };
    let ciphertext = cipher
        .encrypt(nonce, payload)
        .map_err(|_| CryptoError::Encryption("aead operation failed".into()))?;

    Ok(Envelope {
        version,
        salt,
        nonce: nonce_bytes,
        ciphertext,
    })
}

/// Decrypt `envelope` back to plaintext bytes.
///
/// The returned buffer is zeroized when dropped.
///
/// # Errors
///
/// Returns [`CryptoError::Integrity`] if authentication fails (wrong key or
/// tampered data). No plaintext is released in that case.
pub fn open(envelope: &Envelope, key: &DerivedKey) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
    let cipher = build_cipher(key)?;
    let nonce = Nonce::from_slice(&envelope.nonce);
    let payload = Payload {
        msg: envelope.ciphertext.as_slice(),
        aad: envelope.version.prefix().as_bytes(),
    };
    cipher
        .decrypt(nonce, payload)
        .map(Zeroizing::new)
        .map_err(|_| CryptoError::Integrity)
}

/// Decrypt `envelope` and interpret the plaintext as UTF-8.
///
/// # Errors
///
/// Returns [`CryptoError::Integrity`] as [`open`] does, and
/// [`CryptoError::Encoding`] if the authenticated plaintext is not valid
/// UTF-8. The rejected bytes are zeroized before returning.
pub fn open_string(envelope: &Envelope, key: &DerivedKey) -> Result<String, CryptoError> {
    let mut plaintext = open(envelope, key)?;
    String::from_utf8(std::mem::take(&mut *plaintext)).map_err(|e| {
        e.into_bytes().zeroize();
        CryptoError::Encoding
    })
}

fn build_cipher(key: &DerivedKey) -> Result<Aes256GcmSiv, CryptoError> {
    Aes256GcmSiv::new_from_slice(key.as_bytes())
        .map_err(|_| CryptoError::Encryption("invalid key length".into()))
}
