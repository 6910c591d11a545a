//! Master secret holder with memoized, purpose-bound subkeys.

use crate::config::MasterSecret;
use crate::error::Result;
use crate::kdf::{derive_key, DerivedKey, KeyPurpose};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Holds the master secret and hands out derived keys.
///
/// Construct one at startup and share it by reference (or `Arc`) with the
/// services that need keys. Derived keys are cached after first use.
/// [`KeyManager::rotate`] installs a new master secret and drops both cached
/// keys in one step; [`KeyManager::clear_cache`] only forces re-derivation
/// under the current secret.
///
/// Services built from a manager copy their key at construction, so rebuild
/// them after a rotation.
///
/// `KeyManager` is `Send + Sync`. The secret and both cache slots sit behind a
/// single lock, so a reader never pairs a key with the wrong epoch.
///
/// # Example
///
/// ```
/// use fieldseal::key_manager::KeyManager;
///
/// let manager = KeyManager::from_hex(&"00".repeat(32))?;
/// let enc = manager.encryption_key()?;
/// let idx = manager.index_key()?;
/// assert_ne!(enc.expose_secret(), idx.expose_secret());
/// # Ok::<(), fieldseal::error::Error>(())
/// ```
#[derive(Debug)]
pub struct KeyManager {
    state: RwLock<KeyState>,
}

#[derive(Debug)]
struct KeyState {
    master: MasterSecret,
    encryption: Option<DerivedKey>,
    index: Option<DerivedKey>,
}

impl KeyState {
    const fn slot(&self, purpose: KeyPurpose) -> Option<&DerivedKey> {
        match purpose {
            KeyPurpose::Encryption => self.encryption.as_ref(),
            KeyPurpose::BlindIndex => self.index.as_ref(),
        }
    }

    fn slot_mut(&mut self, purpose: KeyPurpose) -> &mut Option<DerivedKey> {
        match purpose {
            KeyPurpose::Encryption => &mut self.encryption,
            KeyPurpose::BlindIndex => &mut self.index,
        }
    }

    fn clear(&mut self) {
        self.encryption = None;
        self.index = None;
    }
}

impl KeyManager {
    /// Creates a key manager owning `master`.
    #[must_use]
    pub const fn new(master: MasterSecret) -> Self {
        Self { state: RwLock::new(KeyState { master, encryption: None, index: None }) }
    }

    /// Creates a key manager from raw master key bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` unless `bytes` is exactly 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        MasterSecret::from_bytes(bytes).map(Self::new)
    }

    /// Creates a key manager from a 64-character hex master key.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the value is malformed.
    pub fn from_hex(value: &str) -> Result<Self> {
        MasterSecret::from_hex(value).map(Self::new)
    }

    /// Creates a key manager from the `FIELDSEAL_MASTER_KEY` env var.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if the variable is unset or malformed.
    pub fn from_env() -> Result<Self> {
        MasterSecret::from_env().map(Self::new)
    }

    /// Returns the AES-256-GCM field encryption key.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyDerivation` if derivation fails.
    pub fn encryption_key(&self) -> Result<DerivedKey> {
        self.cached(KeyPurpose::Encryption)
    }

    /// Returns the HMAC key used for blind and trigram indexes.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyDerivation` if derivation fails.
    pub fn index_key(&self) -> Result<DerivedKey> {
        self.cached(KeyPurpose::BlindIndex)
    }

    /// Derives the key for `purpose` from the current master secret without
    /// touching the cache.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyDerivation` if derivation fails.
    pub fn derive(&self, purpose: KeyPurpose) -> Result<DerivedKey> {
        derive_key(&self.read().master, purpose)
    }

    /// Replaces the master secret and drops every cached key.
    ///
    /// Both happen under one write lock: callers observe either the old
    /// secret with its keys or the new secret with fresh derivations. The
    /// previous secret is zeroized when it is dropped here.
    ///
    /// Data sealed or indexed under the previous secret no longer decrypts or
    /// matches; re-encrypt and reindex it before switching.
    ///
    /// # Example
    ///
    /// ```
    /// use fieldseal::prelude::*;
    ///
    /// let manager = KeyManager::from_hex(&"00".repeat(32))?;
    /// let before = manager.encryption_key()?;
    ///
    /// manager.rotate(MasterSecret::generate());
    /// assert_ne!(before.expose_secret(), manager.encryption_key()?.expose_secret());
    /// # Ok::<(), fieldseal::error::Error>(())
    /// ```
    pub fn rotate(&self, master: MasterSecret) {
        let previous = {
            let mut state = self.write();
            state.clear();
            std::mem::replace(&mut state.master, master)
        };
        drop(previous);
        tracing::info!("master secret rotated, derived key cache cleared");
    }

    /// Drops every cached key; the next accessor call re-derives from the
    /// current master secret.
    ///
    /// Safe to call while other threads read keys: they see either the
    /// cached key or a fresh derivation of the same value.
    pub fn clear_cache(&self) {
        self.write().clear();
        tracing::info!("derived key cache cleared");
    }

    // The state only ever holds a complete secret and complete keys, so a
    // poisoned lock still guards valid data.
    fn read(&self) -> RwLockReadGuard<'_, KeyState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, KeyState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn cached(&self, purpose: KeyPurpose) -> Result<DerivedKey> {
        if let Some(key) = self.read().slot(purpose) {
            return Ok(key.clone());
        }

        let mut state = self.write();
        if let Some(key) = state.slot(purpose) {
            return Ok(key.clone());
        }

        let key = derive_key(&state.master, purpose)?;
        *state.slot_mut(purpose) = Some(key.clone());
        drop(state);
        Ok(key)
    }

    #[cfg(test)]
    fn is_cached(&self, purpose: KeyPurpose) -> bool {
        self.read().slot(purpose).is_some()
    }
}
