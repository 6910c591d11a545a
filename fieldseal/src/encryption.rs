//! Authenticated encryption of single string fields.
//!
//! Fields are sealed with AES-256-GCM under the encryption subkey, using a
//! fresh random 96-bit nonce per call and no associated data. See
//! [`crate::envelope`] for the stored layout.
//!
//! GCM with random nonces stays safe up to roughly 2^32 encryptions under one
//! key. Deployments encrypting more than that should rotate the master secret;
//! nothing here counts or enforces it.

use crate::envelope::{Envelope, NONCE_SIZE};
use crate::error::{Error, Result};
use crate::kdf::{DerivedKey, KeyPurpose};
use crate::key_manager::KeyManager;
use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use std::fmt;

/// Encrypts and decrypts string fields.
///
/// Stateless apart from the initialized cipher; cheap to clone and safe to
/// share across threads.
///
/// # Example
///
/// ```
/// use fieldseal::encryption::EncryptionService;
/// use fieldseal::key_manager::KeyManager;
///
/// let manager = KeyManager::from_hex(&"00".repeat(32))?;
/// let service = EncryptionService::from_key_manager(&manager)?;
///
/// let ciphertext = service.encrypt("alice@example.com")?;
/// assert_eq!(service.decrypt(&ciphertext)?, "alice@example.com");
/// assert_eq!(service.encrypt("")?, "");
/// # Ok::<(), fieldseal::error::Error>(())
/// ```
#[derive(Clone)]
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    /// Creates a service from the encryption subkey.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if `key` was derived for another purpose.
    pub fn new(key: &DerivedKey) -> Result<Self> {
        let key = key.require(KeyPurpose::Encryption)?;
        let cipher = Aes256Gcm::new_from_slice(key.expose_secret())
            .map_err(|e| Error::config(format!("invalid encryption key: {e}")))?;

        Ok(Self { cipher })
    }

    /// Creates a service using the manager's encryption key.
    ///
    /// # Errors
    ///
    /// Returns error if key derivation fails.
    pub fn from_key_manager(manager: &KeyManager) -> Result<Self> {
        Self::new(&manager.encryption_key()?)
    }

    /// Encrypts a field.
    ///
    /// Empty input is returned as empty text without encryption. Anything
    /// else is sealed under a fresh nonce, so encrypting the same value twice
    /// gives different outputs.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encryption` if the AEAD operation fails.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from(nonce_bytes);

        let sealed = self.cipher.encrypt(&nonce, plaintext.as_bytes()).map_err(|_| {
            tracing::debug!("AES-GCM seal failed");
            Error::Encryption
        })?;

        Ok(Envelope::new(nonce_bytes, sealed).to_base64())
    }

    /// Decrypts a field produced by [`EncryptionService::encrypt`].
    ///
    /// Empty input is returned as empty text.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encryption` for malformed base64, truncated payloads,
    /// tampered data, the wrong key, or non-UTF-8 plaintext. The cause is not
    /// reported to the caller.
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        if ciphertext.is_empty() {
            return Ok(String::new());
        }

        let envelope = Envelope::from_base64(ciphertext)?;
        let nonce = Nonce::from(*envelope.nonce());

        let plaintext = self.cipher.decrypt(&nonce, envelope.sealed()).map_err(|_| {
            tracing::debug!("AES-GCM authentication failed");
            Error::Encryption
        })?;

        String::from_utf8(plaintext).map_err(|_| {
            tracing::debug!("decrypted field is not valid UTF-8");
            Error::Encryption
        })
    }

    /// Encrypts a nullable field; `None` stays `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encryption` if encryption fails.
    pub fn encrypt_optional(&self, plaintext: Option<&str>) -> Result<Option<String>> {
        plaintext.map(|value| self.encrypt(value)).transpose()
    }

    /// Decrypts a nullable field; `None` stays `None`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encryption` if decryption fails.
    pub fn decrypt_optional(&self, ciphertext: Option<&str>) -> Result<Option<String>> {
        ciphertext.map(|value| self.decrypt(value)).transpose()
    }
}

impl fmt::Debug for EncryptionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::MIN_ENVELOPE_SIZE;
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    fn service() -> EncryptionService {
        EncryptionService::new(&DerivedKey::new(KeyPurpose::Encryption, [42u8; 32])).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let service = service();

        let ciphertext = service.encrypt("alice@example.com").expect("Encryption failed");
        let decrypted = service.decrypt(&ciphertext).expect("Decryption failed");

        assert_eq!(decrypted, "alice@example.com");
    }

    #[test]
    fn test_encrypt_is_randomized() {
        let service = service();

        let ciphertext1 = service.encrypt("alice@example.com").unwrap();
        let ciphertext2 = service.encrypt("alice@example.com").unwrap();

        assert_ne!(ciphertext1, ciphertext2);
        assert_eq!(service.decrypt(&ciphertext1).unwrap(), "alice@example.com");
        assert_eq!(service.decrypt(&ciphertext2).unwrap(), "alice@example.com");
    }

    #[test]
    fn test_ciphertext_layout() {
        let service = service();
        let ciphertext = service.encrypt("abc").unwrap();
        let raw = STANDARD.decode(&ciphertext).unwrap();

        assert_eq!(raw.len(), MIN_ENVELOPE_SIZE + 3);
    }

    #[test]
    fn test_empty_plaintext_passthrough() {
        let service = service();

        assert_eq!(service.encrypt("").unwrap(), "");
        assert_eq!(service.decrypt("").unwrap(), "");
    }

    #[test]
    fn test_unicode_round_trip() {
        let service = service();
        let plaintext = "Zoë Ñúñez 東京 🚀";

        let ciphertext = service.encrypt(plaintext).unwrap();
        assert_eq!(service.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn test_large_plaintext() {
        let service = service();
        let plaintext = "x".repeat(10_000);

        let ciphertext = service.encrypt(&plaintext).unwrap();
        assert_eq!(service.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let service1 = service();
        let service2 =
            EncryptionService::new(&DerivedKey::new(KeyPurpose::Encryption, [7u8; 32])).unwrap();

        let ciphertext = service1.encrypt("secret").unwrap();
        assert!(matches!(service2.decrypt(&ciphertext), Err(Error::Encryption)));
    }

    #[test]
    fn test_corrupted_ciphertext_fails() {
        let service = service();
        let ciphertext = service.encrypt("alice@example.com").unwrap();

        let mut raw = STANDARD.decode(&ciphertext).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0xFF;

        let result = service.decrypt(&STANDARD.encode(raw));
        assert!(matches!(result, Err(Error::Encryption)));
    }

    #[test]
    fn test_malformed_inputs_fail_opaquely() {
        let service = service();

        let truncated = STANDARD.encode([0u8; MIN_ENVELOPE_SIZE - 1]);

        for input in ["not base64 at all!", "AAAA", truncated.as_str()] {
            assert!(matches!(service.decrypt(input), Err(Error::Encryption)), "{input}");
        }
    }

    #[test]
    fn test_non_utf8_plaintext_fails() {
        let service = service();
        let nonce = [3u8; NONCE_SIZE];
        let sealed = service.cipher.encrypt(&Nonce::from(nonce), &[0xff, 0xfe][..]).unwrap();
        let ciphertext = Envelope::new(nonce, sealed).to_base64();

        assert!(matches!(service.decrypt(&ciphertext), Err(Error::Encryption)));
    }

    #[test]
    fn test_rejects_index_key() {
        let key = DerivedKey::new(KeyPurpose::BlindIndex, [42u8; 32]);
        assert!(matches!(EncryptionService::new(&key), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_optional_fields() {
        let service = service();

        assert_eq!(service.encrypt_optional(None).unwrap(), None);
        assert_eq!(service.decrypt_optional(None).unwrap(), None);
        assert_eq!(service.encrypt_optional(Some("")).unwrap(), Some(String::new()));

        let sealed = service.encrypt_optional(Some("+33 6 12 34 56 78")).unwrap();
        let opened = service.decrypt_optional(sealed.as_deref()).unwrap();
        assert_eq!(opened.as_deref(), Some("+33 6 12 34 56 78"));
    }

    #[test]
    fn test_service_clone() {
        let service1 = service();
        let service2 = service1.clone();

        let ciphertext = service1.encrypt("test").unwrap();
        assert_eq!(service2.decrypt(&ciphertext).unwrap(), "test");
    }
}
