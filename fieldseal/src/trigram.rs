//! Trigram extraction and the stored trigram index format.
//!
//! A trigram index is the set of 3-character windows of a normalized value,
//! each hashed with the index key and truncated, rendered as a sorted,
//! comma-joined list of lowercase hex tokens. Sorting makes two builds of the
//! same set byte-identical.
//!
//! # Leakage
//!
//! The index deliberately leaks some structure: token counts reveal the
//! number of distinct trigrams, and equal tokens across rows reveal shared
//! trigrams. Truncating to 64 bits bounds storage; the collision probability
//! between two distinct trigrams is about 2^-64 per pair, negligible for any
//! realistic field alphabet. With the key known, the small trigram alphabet
//! can be brute-forced; that residual risk is accepted.

use crate::error::{Error, Result};
use crate::normalize::is_separator;
use std::collections::BTreeSet;
use std::fmt;

/// Width of a trigram window, in characters.
pub const TRIGRAM_SIZE: usize = 3;

/// Default number of hex characters kept per trigram token (64 bits).
pub const DEFAULT_TOKEN_HEX_LEN: usize = 16;

/// Maximum token length: a full hex-encoded SHA-256 digest.
pub const MAX_TOKEN_HEX_LEN: usize = 64;

/// Separator between tokens in the stored index.
pub const TOKEN_SEPARATOR: char = ',';

/// Tunable parameters of the trigram index.
///
/// Changing the token length changes every stored token, so indexes built
/// under one setting cannot be queried under another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrigramConfig {
    token_hex_len: usize,
}

impl TrigramConfig {
    /// Creates a config keeping `token_hex_len` hex characters per token.
    ///
    /// # Errors
    ///
    /// Returns `Error::Configuration` unless `1 <= token_hex_len <= 64`.
    pub fn new(token_hex_len: usize) -> Result<Self> {
        if !(1..=MAX_TOKEN_HEX_LEN).contains(&token_hex_len) {
            return Err(Error::config(format!(
                "trigram token length must be between 1 and {MAX_TOKEN_HEX_LEN} hex chars, got {token_hex_len}"
            )));
        }
        Ok(Self { token_hex_len })
    }

    /// Returns the number of hex characters kept per token.
    #[must_use]
    pub const fn token_hex_len(&self) -> usize {
        self.token_hex_len
    }
}

impl Default for TrigramConfig {
    fn default() -> Self {
        Self { token_hex_len: DEFAULT_TOKEN_HEX_LEN }
    }
}

/// Extracts the distinct trigrams of an already normalized value.
///
/// Windows are taken over characters, not bytes. Windows containing a
/// separator ([`is_separator`]) are dropped, so trigrams never span two words.
///
/// # Example
///
/// ```
/// use fieldseal::trigram::trigrams;
///
/// let grams = trigrams("paris");
/// assert_eq!(grams.into_iter().collect::<Vec<_>>(), ["ari", "par", "ris"]);
/// ```
#[must_use]
pub fn trigrams(normalized: &str) -> BTreeSet<String> {
    let chars: Vec<char> = normalized.chars().collect();
    if chars.len() < TRIGRAM_SIZE {
        return BTreeSet::new();
    }

    chars
        .windows(TRIGRAM_SIZE)
        .filter(|window| !window.iter().copied().any(is_separator))
        .map(|window| window.iter().collect())
        .collect()
}

/// A set of hashed trigram tokens.
///
/// Renders (via `Display`) to the canonical stored form and parses back from
/// it with [`TrigramIndex::parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrigramIndex {
    tokens: BTreeSet<String>,
}

impl TrigramIndex {
    /// Parses a stored index. Empty tokens are ignored, so `""` parses to the
    /// empty index.
    #[must_use]
    pub fn parse(stored: &str) -> Self {
        stored
            .split(TOKEN_SEPARATOR)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Returns the number of distinct tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the index holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates tokens in canonical (sorted) order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Returns true if every token of `query` is present in `self`.
    #[must_use]
    pub fn contains_all(&self, query: &Self) -> bool {
        query.tokens.is_subset(&self.tokens)
    }

    /// Counts the tokens of `query` present in `self`.
    #[must_use]
    pub fn overlap(&self, query: &Self) -> usize {
        query.tokens.intersection(&self.tokens).count()
    }
}

impl FromIterator<String> for TrigramIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self { tokens: iter.into_iter().collect() }
    }
}

impl fmt::Display for TrigramIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, "{TOKEN_SEPARATOR}")?;
            }
            f.write_str(token)?;
        }
        Ok(())
    }
}
