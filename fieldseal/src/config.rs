//! Master secret intake.
//!
//! The master secret is the single external input of this crate: 32 bytes of
//! uniformly random key material, conventionally supplied as a 64-character
//! hexadecimal string through process configuration. Derivation uses HKDF
//! without a salt, which is only sound because the secret is already
//! high-entropy. Never feed a human-chosen passphrase through here; mint new
//! secrets with [`MasterSecret::generate`].

use crate::error::{Error, Result};
use crate::kdf::take_key;
use aes_gcm::aead::{rand_core::RngCore, OsRng};
use secrecy::{ExposeSecret, Secret};
use std::fmt;
use zeroize::Zeroizing;

/// Size of the master secret in bytes (256 bits).
pub const MASTER_SECRET_SIZE: usize = 32;

/// Environment variable read by [`MasterSecret::from_env`].
pub const MASTER_KEY_ENV: &str = "FIELDSEAL_MASTER_KEY";

/// The root secret every purpose-bound key is derived from.
///
/// Zeroized on drop and redacted in `Debug` output.
///
/// # Example
///
/// ```
/// use fieldseal::config::MasterSecret;
///
/// let secret = MasterSecret::from_hex(&"00".repeat(32)).expect("valid hex");
/// assert!(MasterSecret::from_hex("abcd").is_err());
/// # drop(secret);
/// ```
pub struct MasterSecret(Secret<[u8; MASTER_SECRET_SIZE]>);

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MasterSecret([REDACTED])")
    }
}

impl MasterSecret {
    /// Wraps raw key material.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` unless `bytes` is exactly
    /// [`MASTER_SECRET_SIZE`] bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != MASTER_SECRET_SIZE {
            return Err(Error::config(format!(
                "master secret must be {MASTER_SECRET_SIZE} bytes, got {}",
                bytes.len()
            )));
        }

        let mut key = [0u8; MASTER_SECRET_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(Secret::new(take_key(&mut key))))
    }

    /// Decodes the 64-character hexadecimal form. Surrounding whitespace is
    /// ignored so values read from files or env vars with a trailing newline
    /// still parse.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the value is not hex or does not
    /// decode to exactly 32 bytes. The offending value is never echoed.
    pub fn from_hex(value: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            hex::decode(value.trim())
                .map_err(|_| Error::config("master secret is not valid hexadecimal"))?,
        );
        Self::from_bytes(&bytes)
    }

    /// Reads the secret from [`MASTER_KEY_ENV`].
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the variable is unset or malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_env_var(MASTER_KEY_ENV)
    }

    /// Reads the secret from the named environment variable.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the variable is unset, not unicode,
    /// or malformed.
    pub fn from_env_var(name: &str) -> Result<Self> {
        let value = Zeroizing::new(
            std::env::var(name).map_err(|_| Error::config(format!("{name} is not set")))?,
        );
        Self::from_hex(&value)
    }

    /// Generates a fresh secret from the OS random source.
    #[must_use]
    pub fn generate() -> Self {
        let mut key = [0u8; MASTER_SECRET_SIZE];
        OsRng.fill_bytes(&mut key);
        Self(Secret::new(take_key(&mut key)))
    }

    /// Exports the secret as lowercase hex, for provisioning a freshly
    /// generated key into the secret store.
    #[must_use]
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.0.expose_secret()))
    }

    pub(crate) fn expose(&self) -> &[u8; MASTER_SECRET_SIZE] {
        self.0.expose_secret()
    }
}
