//! Blind and trigram index construction and evaluation.

use crate::blind_index::IndexHasher;
use crate::error::Result;
use crate::kdf::DerivedKey;
use crate::key_manager::KeyManager;
use crate::normalize::{DefaultNormalizer, Normalize};
use crate::trigram::{trigrams, TrigramConfig, TrigramIndex};
use std::collections::BTreeSet;

/// Builds and queries searchable indexes over normalized values.
///
/// Every operation is pure given the index key. None of them fail: empty or
/// too-short inputs yield empty indexes, `false` matches and zero scores.
///
/// # Example
///
/// ```
/// use fieldseal::key_manager::KeyManager;
/// use fieldseal::search::SearchIndexService;
///
/// let manager = KeyManager::from_hex(&"00".repeat(32))?;
/// let search = SearchIndexService::from_key_manager(&manager)?;
///
/// assert_eq!(
///     search.create_blind_index("test@example.com"),
///     search.create_blind_index("TEST@EXAMPLE.COM"),
/// );
///
/// let stored = search.create_trigram_index("bonjour");
/// assert!(search.match_trigrams("bonj", &stored));
/// assert!(!search.match_trigrams("xyz", &stored));
/// # Ok::<(), fieldseal::error::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct SearchIndexService<N = DefaultNormalizer> {
    hasher: IndexHasher,
    normalizer: N,
    config: TrigramConfig,
}

impl SearchIndexService<DefaultNormalizer> {
    /// Creates a service using the manager's index key, the default
    /// normalizer and the default trigram config.
    ///
    /// # Errors
    ///
    /// Returns error if key derivation fails.
    pub fn from_key_manager(manager: &KeyManager) -> Result<Self> {
        Self::new(&manager.index_key()?, DefaultNormalizer)
    }
}

impl<N: Normalize> SearchIndexService<N> {
    /// Creates a service from the index subkey and a normalizer.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` if `key` was derived for another purpose.
    pub fn new(key: &DerivedKey, normalizer: N) -> Result<Self> {
        Ok(Self { hasher: IndexHasher::new(key)?, normalizer, config: TrigramConfig::default() })
    }

    /// Replaces the trigram config.
    #[must_use]
    pub fn with_config(mut self, config: TrigramConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the trigram config.
    #[must_use]
    pub const fn config(&self) -> &TrigramConfig {
        &self.config
    }

    /// Normalizes `value` with this service's rules.
    #[must_use]
    pub fn normalize(&self, value: &str) -> String {
        self.normalizer.normalize(value)
    }

    /// Version of the normalization rules, to store next to built indexes.
    #[must_use]
    pub fn normalizer_version(&self) -> u32 {
        self.normalizer.version()
    }

    /// Computes the exact-match blind index of `value`: 64 lowercase hex
    /// characters, or empty text for empty input.
    ///
    /// Case, accents, punctuation and spacing do not affect the result.
    #[must_use]
    pub fn create_blind_index(&self, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        self.hasher.blind_index(&self.normalize(value))
    }

    /// Returns the distinct plaintext trigrams of `normalize(value)`.
    #[must_use]
    pub fn create_trigrams(&self, value: &str) -> BTreeSet<String> {
        if value.is_empty() {
            return BTreeSet::new();
        }
        trigrams(&self.normalize(value))
    }

    /// Builds the hashed trigram index of `value`.
    #[must_use]
    pub fn trigram_index(&self, value: &str) -> TrigramIndex {
        let hex_len = self.config.token_hex_len();
        self.create_trigrams(value)
            .iter()
            .map(|gram| self.hasher.truncated_hex(gram, hex_len))
            .collect()
    }

    /// Builds the stored form of the trigram index of `value`: sorted,
    /// comma-joined hex tokens, or empty text when `value` has no trigrams.
    #[must_use]
    pub fn create_trigram_index(&self, value: &str) -> String {
        self.trigram_index(value).to_string()
    }

    /// Returns true if every trigram of `query` is present in `stored_index`.
    ///
    /// Queries shorter than three characters after normalization never match.
    #[must_use]
    pub fn match_trigrams(&self, query: &str, stored_index: &str) -> bool {
        if stored_index.is_empty() {
            return false;
        }

        let query = self.trigram_index(query);
        if query.is_empty() {
            return false;
        }

        TrigramIndex::parse(stored_index).contains_all(&query)
    }

    /// Fraction of the trigrams of `query` present in `stored_index`, in
    /// `[0.0, 1.0]`.
    ///
    /// `1.0` means every query trigram matched; `0.0` is returned when the
    /// sets are disjoint or either side is empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn search_score(&self, query: &str, stored_index: &str) -> f64 {
        if stored_index.is_empty() {
            return 0.0;
        }

        let query = self.trigram_index(query);
        if query.is_empty() {
            return 0.0;
        }

        let hits = TrigramIndex::parse(stored_index).overlap(&query);

        // Trigram counts are far below 2^52, so both casts are exact.
        hits as f64 / query.len() as f64
    }
}
