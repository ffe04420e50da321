//! Argon2id key derivation and AES-256-GCM-SIV value encryption.
//!
//! This module is free of I/O and shared state; every operation is pure
//! computation over in-memory buffers.
//!
//! # Ciphertext format
//!
//! ```text
//! AES256:<base64(salt[16] || nonce[12] || ciphertext || tag[16])>
//! ```
//!
//! The `AES256:` prefix names the format version. Any change to key length,
//! nonce length, KDF parameters, or tag presence requires a new prefix.

pub mod cipher;
pub mod envelope;
pub mod kdf;
pub mod session;

pub use envelope::{Envelope, FormatVersion, MIN_ENVELOPE_LEN, NONCE_LEN, TAG_LEN};
pub use kdf::{derive_key, generate_salt, DerivedKey, Salt, KEY_LEN, SALT_LEN};
pub use session::{Opener, Sealer};
