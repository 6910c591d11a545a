//! Ciphertext envelope format.
//!
//! Stored ciphertext is the standard (padded) base64 encoding of:
//!
//! ```text
//! [nonce:12][ciphertext:N][tag:16]
//! ```
//!
//! There is no version byte or key identifier; the layout must be preserved
//! byte-for-byte by whatever stores it.

use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};

/// AES-GCM nonce size (96 bits).
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// Smallest decodable envelope: a nonce plus an empty ciphertext's tag.
pub const MIN_ENVELOPE_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// A sealed field value split into its nonce and AEAD output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    nonce: [u8; NONCE_SIZE],
    sealed: Vec<u8>,
}

impl Envelope {
    /// Creates an envelope from a nonce and the `ciphertext || tag` output.
    #[must_use]
    pub fn new(nonce: [u8; NONCE_SIZE], sealed: Vec<u8>) -> Self {
        Self { nonce, sealed }
    }

    /// Returns the nonce.
    #[must_use]
    pub const fn nonce(&self) -> &[u8; NONCE_SIZE] {
        &self.nonce
    }

    /// Returns the ciphertext with its trailing tag.
    #[must_use]
    pub fn sealed(&self) -> &[u8] {
        &self.sealed
    }

    /// Serializes to raw `nonce || sealed` bytes.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(NONCE_SIZE + self.sealed.len());
        bytes.extend_from_slice(&self.nonce);
        bytes.extend_from_slice(&self.sealed);
        bytes
    }

    /// Parses raw `nonce || sealed` bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encryption` if `data` is shorter than
    /// [`MIN_ENVELOPE_SIZE`].
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < MIN_ENVELOPE_SIZE {
            tracing::debug!(len = data.len(), "envelope shorter than nonce and tag");
            return Err(Error::Encryption);
        }

        let (nonce, sealed) = data.split_at(NONCE_SIZE);
        let nonce: [u8; NONCE_SIZE] = nonce.try_into().map_err(|_| Error::Encryption)?;

        Ok(Self { nonce, sealed: sealed.to_vec() })
    }

    /// Encodes the envelope as stored text.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Decodes stored text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encryption` for invalid base64 or a truncated payload.
    pub fn from_base64(text: &str) -> Result<Self> {
        let data = STANDARD.decode(text).map_err(|e| {
            tracing::debug!(error = %e, "envelope is not valid base64");
            Error::Encryption
        })?;
        Self::from_bytes(&data)
    }
}
