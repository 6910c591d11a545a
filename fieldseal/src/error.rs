//! Error types for `fieldseal` operations.

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Main error type for `fieldseal` operations.
///
/// Normalization, trigram generation, matching and scoring never fail, so
/// they have no variant here.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The master secret or a derived key is missing or malformed.
    ///
    /// Raised at construction time only. There is no safe default to fall
    /// back to, so callers should abort startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Encryption or decryption of a field failed.
    ///
    /// Malformed base64, truncated payloads, tag mismatches and invalid
    /// UTF-8 all collapse into this variant so that callers cannot tell
    /// them apart. These failures are never transient.
    #[error("encryption operation failed")]
    Encryption,

    /// Key derivation failed
    #[error("key derivation failed")]
    KeyDerivation,
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
