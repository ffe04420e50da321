//! Call-scoped key holders for sealing and opening several values with one
//! secret.
//!
//! A [`Sealer`] derives one key under one fresh salt and reuses it for every
//! value it seals; each value still gets its own random nonce. An [`Opener`]
//! derives lazily and caches keys by salt, so a batch written by one `Sealer`
//! costs a single Argon2id run to read back. Both zeroize their keys when
//! dropped; keep them no longer than the batch they serve.

use std::borrow::Cow;
use std::collections::hash_map::{Entry, HashMap};
use std::fmt;

use common::CryptoError;

use super::cipher;
use super::envelope::{Envelope, FormatVersion};
use super::kdf::{derive_key, generate_salt, DerivedKey, Salt};

/// Encrypts values under a single derived key.
#[derive(Debug)]
pub struct Sealer {
    salt: Salt,
    key: DerivedKey,
}

impl Sealer {
    /// Draw a fresh salt and derive the key for `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EmptySecret`] or [`CryptoError::KeyDerivation`].
    pub fn new(secret: &str) -> Result<Self, CryptoError> {
        let salt = generate_salt();
        let key = derive_key(secret, &salt)?;
        Ok(Self { salt, key })
    }

    /// Encrypt one value to its encoded `AES256:` form.
    pub fn seal_str(&self, plaintext: &str) -> Result<String, CryptoError> {
        cipher::seal(plaintext.as_bytes(), &self.key, self.salt).map(|envelope| envelope.encode())
    }
}

/// Decrypts values, deriving at most one key per distinct salt.
pub struct Opener<'s> {
    secret: &'s str,
    // Boxed so key bytes stay put when the map rehashes.
    keys: HashMap<Salt, Box<DerivedKey>>,
}

impl<'s> Opener<'s> {
    pub fn new(secret: &'s str) -> Self {
        Self {
            secret,
            keys: HashMap::new(),
        }
    }

    /// Decrypt one encoded value.
    ///
    /// # Errors
    ///
    /// [`CryptoError::Format`] if `encoded` does not parse, then any error of
    /// key derivation or [`cipher::open_string`].
    pub fn open_str(&mut self, encoded: &str) -> Result<String, CryptoError> {
        let envelope = Envelope::decode(encoded)?;
        let key = match self.keys.entry(envelope.salt) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => slot.insert(Box::new(derive_key(self.secret, &envelope.salt)?)),
        };
        cipher::open_string(&envelope, key)
    }

    /// Decrypt `value` if it carries a known format prefix, otherwise hand it
    /// back untouched.
    pub fn open_if_encrypted<'v>(&mut self, value: &'v str) -> Result<Cow<'v, str>, CryptoError> {
        if FormatVersion::detect(value).is_none() {
            return Ok(Cow::Borrowed(value));
        }
        self.open_str(value).map(Cow::Owned)
    }

    /// Number of keys derived so far.
    pub fn derived_keys(&self) -> usize {
        self.keys.len()
    }
}

impl fmt::Debug for Opener<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Opener")
            .field("secret", &"[REDACTED]")
            .field("derived_keys", &self.keys.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sealer_values_share_one_key() {
        let sealer = Sealer::new("batch-secret").unwrap();
        let a = sealer.seal_str("first").unwrap();
        let b = sealer.seal_str("second").unwrap();

        let mut opener = Opener::new("batch-secret");
        assert_eq!(opener.open_str(&a).unwrap(), "first");
        assert_eq!(opener.open_str(&b).unwrap(), "second");
        assert_eq!(opener.derived_keys(), 1);
    }

    #[test]
    fn sealer_reuses_salt_not_nonce() {
        let sealer = Sealer::new("batch-secret").unwrap();
        let a = Envelope::decode(&sealer.seal_str("same").unwrap()).unwrap();
        let b = Envelope::decode(&sealer.seal_str("same").unwrap()).unwrap();
        assert_eq!(a.salt, b.salt);
        assert_ne!(a.nonce, b.nonce);
    }

    #[test]
    fn opener_caches_per_salt() {
        let a = Sealer::new("s").unwrap().seal_str("a").unwrap();
        let b = Sealer::new("s").unwrap().seal_str("b").unwrap();
        let mut opener = Opener::new("s");
        opener.open_str(&a).unwrap();
        opener.open_str(&b).unwrap();
        opener.open_str(&a).unwrap();
        assert_eq!(opener.derived_keys(), 2);
    }

    #[test]
    fn cached_keys_survive_map_growth() {
        let sealed: Vec<(String, String)> = (0..12)
            .map(|i| {
                let plaintext = format!("value-{i}");
                let encoded = Sealer::new("grow").unwrap().seal_str(&plaintext).unwrap();
                (plaintext, encoded)
            })
            .collect();

        let mut opener = Opener::new("grow");
        for (plaintext, encoded) in &sealed {
            assert_eq!(&opener.open_str(encoded).unwrap(), plaintext);
        }
        for (plaintext, encoded) in &sealed {
            assert_eq!(&opener.open_str(encoded).unwrap(), plaintext);
        }
        assert_eq!(opener.derived_keys(), sealed.len());
    }

    #[test]
    fn malformed_input_derives_nothing() {
        let mut opener = Opener::new("s");
        assert!(matches!(opener.open_str("AES256:%%%"), Err(CryptoError::Format(_))));
        assert_eq!(opener.derived_keys(), 0);
    }

    #[test]
    fn passthrough_for_plain_values() {
        let mut opener = Opener::new("s");
        let out = opener.open_if_encrypted("just text").unwrap();
        assert!(matches!(out, Cow::Borrowed("just text")));
    }

    #[test]
    fn empty_secret_rejected() {
        assert_eq!(Sealer::new("").unwrap_err(), CryptoError::EmptySecret);
    }

    #[test]
    fn opener_debug_hides_secret() {
        let opener = Opener::new("hunter2");
        assert!(!format!("{opener:?}").contains("hunter2"));
    }
}
