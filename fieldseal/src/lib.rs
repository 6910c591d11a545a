//! # `fieldseal`
//!
//! Field-level encryption for personally identifiable data, with blind
//! indexes for exact-match lookups and keyed trigram indexes for approximate
//! substring search. Plaintext never reaches storage.
//!
//! ## Features
//!
//! - HKDF-SHA256 derivation of purpose-bound subkeys from one master secret
//! - AEAD field encryption (AES-256-GCM, random nonce per call)
//! - Blind indexes (HMAC-SHA256) over normalized values
//! - Trigram indexes with subset matching and overlap scoring
//!
//! ## Example
//!
//! ```rust
//! use fieldseal::prelude::*;
//!
//! let manager = KeyManager::from_hex(&"00".repeat(32))?;
//! let crypto = EncryptionService::from_key_manager(&manager)?;
//! let search = SearchIndexService::from_key_manager(&manager)?;
//!
//! let ciphertext = crypto.encrypt("alice@example.com")?;
//! let email_index = search.create_blind_index("alice@example.com");
//! let name_index = search.create_trigram_index("Alice Martin");
//!
//! assert_eq!(crypto.decrypt(&ciphertext)?, "alice@example.com");
//! assert_eq!(email_index, search.create_blind_index("ALICE@example.com"));
//! assert!(search.match_trigrams("mart", &name_index));
//! # Ok::<(), fieldseal::error::Error>(())
//! ```

#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod blind_index;
pub mod config;
pub mod encryption;
pub mod envelope;
pub mod error;
pub mod kdf;
pub mod key_manager;
pub mod normalize;
pub mod search;
pub mod trigram;

pub mod prelude {
    //! Convenience re-exports for common use.
    pub use crate::config::MasterSecret;
    pub use crate::encryption::EncryptionService;
    pub use crate::error::{Error, Result};
    pub use crate::kdf::{DerivedKey, KeyPurpose};
    pub use crate::key_manager::KeyManager;
    pub use crate::normalize::{DefaultNormalizer, Normalize};
    pub use crate::search::SearchIndexService;
    pub use crate::trigram::{TrigramConfig, TrigramIndex};
}
