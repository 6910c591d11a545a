//! Keyed digests for searchable encryption.
//!
//! Blind indexes allow equality queries on encrypted data without revealing
//! the plaintext value. They are HMAC-SHA256 digests under the index subkey,
//! so the same normalized value always maps to the same index and nothing can
//! be recovered from it without the key.

use crate::error::{Error, Result};
use crate::kdf::{DerivedKey, KeyPurpose};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Length of a blind index in hex characters (full 256-bit digest).
pub const BLIND_INDEX_HEX_LEN: usize = 64;

/// HMAC-SHA256 keyed with the index subkey.
///
/// The keyed state is computed once; each digest clones it, so hashing never
/// fails after construction.
#[derive(Clone)]
pub struct IndexHasher {
    mac: HmacSha256,
}

impl IndexHasher {
    /// Creates a hasher from the index subkey.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if `key` was derived for another purpose.
    pub fn new(key: &DerivedKey) -> Result<Self> {
        let key = key.require(KeyPurpose::BlindIndex)?;
        let mac = HmacSha256::new_from_slice(key.expose_secret())
            .map_err(|e| Error::config(format!("invalid index key: {e}")))?;

        Ok(Self { mac })
    }

    /// Returns the lowercase hex HMAC of `data` (64 characters).
    #[must_use]
    pub fn digest_hex(&self, data: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(data.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Returns the first `hex_len` hex characters of the HMAC of `data`.
    #[must_use]
    pub fn truncated_hex(&self, data: &str, hex_len: usize) -> String {
        let mut digest = self.digest_hex(data);
        digest.truncate(hex_len);
        digest
    }

    /// Computes the blind index of an already normalized value.
    ///
    /// # Example
    ///
    /// ```
    /// use fieldseal::blind_index::IndexHasher;
    /// use fieldseal::kdf::{DerivedKey, KeyPurpose};
    ///
    /// let hasher = IndexHasher::new(&DerivedKey::new(KeyPurpose::BlindIndex, [1; 32]))?;
    /// let index = hasher.blind_index("alice");
    /// assert_eq!(index.len(), 64);
    /// assert_eq!(index, hasher.blind_index("alice"));
    /// # Ok::<(), fieldseal::error::Error>(())
    /// ```
    #[must_use]
    pub fn blind_index(&self, normalized: &str) -> String {
        self.digest_hex(normalized)
    }
}

impl fmt::Debug for IndexHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexHasher").finish_non_exhaustive()
    }
}
