//! Key derivation using HKDF (HMAC-based Key Derivation Function).
//!
//! Every working key is derived from the master secret with HKDF-SHA256, no
//! salt, and a fixed per-purpose `info` string. A leak of one derived key does
//! not expose the other, and derivation is deterministic across restarts.

use crate::config::MasterSecret;
use crate::error::{Error, Result};
use hkdf::Hkdf;
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;
use std::fmt;
use zeroize::Zeroize;

/// Derived key size in bytes (256 bits).
pub const DERIVED_KEY_SIZE: usize = 32;

/// What a derived key may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPurpose {
    /// AES-256-GCM field encryption.
    Encryption,
    /// HMAC-SHA256 blind and trigram indexes.
    BlindIndex,
}

impl KeyPurpose {
    /// HKDF `info` bytes for this purpose.
    ///
    /// These strings are part of the persisted format: changing one makes
    /// every stored ciphertext or index under that purpose unreadable.
    #[must_use]
    pub const fn context(self) -> &'static [u8] {
        match self {
            Self::Encryption => b"aes-encryption",
            Self::BlindIndex => b"hmac-blind-index",
        }
    }
}

impl fmt::Display for KeyPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encryption => f.write_str("aes-encryption"),
            Self::BlindIndex => f.write_str("hmac-blind-index"),
        }
    }
}

/// A 32-byte key bound to a single [`KeyPurpose`].
pub struct DerivedKey {
    purpose: KeyPurpose,
    key: Secret<[u8; DERIVED_KEY_SIZE]>,
}

impl DerivedKey {
    /// Wraps raw key bytes for the given purpose.
    ///
    /// Normally keys come from [`crate::key_manager::KeyManager`]; this exists
    /// for callers that provision subkeys themselves.
    #[must_use]
    pub fn new(purpose: KeyPurpose, key: [u8; DERIVED_KEY_SIZE]) -> Self {
        Self { purpose, key: Secret::new(key) }
    }

    /// Returns the purpose this key was derived for.
    #[must_use]
    pub const fn purpose(&self) -> KeyPurpose {
        self.purpose
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub fn expose_secret(&self) -> &[u8; DERIVED_KEY_SIZE] {
        self.key.expose_secret()
    }

    /// Fails unless this key was derived for `expected`.
    pub(crate) fn require(&self, expected: KeyPurpose) -> Result<&Self> {
        if self.purpose == expected {
            Ok(self)
        } else {
            Err(Error::config(format!(
                "key derived for {} cannot be used for {expected}",
                self.purpose
            )))
        }
    }
}

impl Clone for DerivedKey {
    fn clone(&self) -> Self {
        let mut key = *self.key.expose_secret();
        Self::new(self.purpose, take_key(&mut key))
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("purpose", &self.purpose)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Moves key bytes out of a scratch buffer and wipes the buffer.
pub(crate) fn take_key<const N: usize>(buf: &mut [u8; N]) -> [u8; N] {
    let key = *buf;
    buf.zeroize();
    key
}

/// Derives the subkey for `purpose` from the master secret.
///
/// Computed as `HKDF-SHA256(ikm = master, salt = none, info = purpose.context())`.
///
/// # Errors
///
/// Returns `Error::KeyDerivation` if HKDF expansion fails.
///
/// # Example
///
/// ```
/// use fieldseal::config::MasterSecret;
/// use fieldseal::kdf::{derive_key, KeyPurpose};
///
/// let master = MasterSecret::from_bytes(&[0u8; 32]).expect("32 bytes");
/// let enc = derive_key(&master, KeyPurpose::Encryption).expect("derivation");
/// let idx = derive_key(&master, KeyPurpose::BlindIndex).expect("derivation");
/// assert_ne!(enc.expose_secret(), idx.expose_secret());
/// ```
pub fn derive_key(master: &MasterSecret, purpose: KeyPurpose) -> Result<DerivedKey> {
    let hkdf = Hkdf::<Sha256>::new(None, master.expose());

    let mut okm = [0u8; DERIVED_KEY_SIZE];
    hkdf.expand(purpose.context(), &mut okm).map_err(|_| Error::KeyDerivation)?;

    tracing::debug!(%purpose, "derived subkey");
    Ok(DerivedKey::new(purpose, take_key(&mut okm)))
}
