//! Canonicalization applied to every value before it is indexed.
//!
//! Indexes store only keyed digests of normalized text, so the rules here are
//! effectively part of the stored format. Any change to them must ship as a new
//! [`Normalize::version`] together with a reindex, otherwise queries normalized
//! under the new rules stop matching indexes built under the old ones.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Version of the rules implemented by [`DefaultNormalizer`].
pub const NORMALIZATION_VERSION: u32 = 1;

/// A versioned normalization rule set.
///
/// Implementations must be pure and total: the same input always yields the
/// same output, and no input fails.
pub trait Normalize: Send + Sync {
    /// Canonicalizes `value`.
    fn normalize(&self, value: &str) -> String;

    /// Identifies the rule set, for storing next to built indexes.
    fn version(&self) -> u32;
}

/// Case, accent, punctuation and whitespace insensitive normalization.
///
/// Applied in order:
/// 1. lowercase
/// 2. NFD decomposition, then drop combining marks
/// 3. drop everything that is not a word character (Unicode alphanumeric or
///    `_`) or a separator (see [`is_separator`])
/// 4. collapse separator runs to a single space and trim
///
/// # Example
///
/// ```
/// use fieldseal::normalize::{DefaultNormalizer, Normalize};
///
/// assert_eq!(DefaultNormalizer.normalize("  Crème   Brûlée! "), "creme brulee");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultNormalizer;

impl Normalize for DefaultNormalizer {
    fn normalize(&self, value: &str) -> String {
        normalize(value)
    }

    fn version(&self) -> u32 {
        NORMALIZATION_VERSION
    }
}

/// Applies the [`DefaultNormalizer`] rules.
#[must_use]
pub fn normalize(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let stripped: String = value
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| is_word_char(*c) || is_separator(*c))
        .collect();

    stripped.split(is_separator).filter(|word| !word.is_empty()).collect::<Vec<_>>().join(" ")
}

/// Characters treated as word separators by version 1 of the rules.
///
/// Unicode `White_Space` plus the C0 information separators U+001C..U+001F,
/// the same class a Unicode-aware regex `\s` matches. `char::is_whitespace`
/// alone would glue `"a\x1fb"` into `"ab"`.
#[must_use]
pub fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases() {
        assert_eq!(normalize("PARIS"), "paris");
        assert_eq!(normalize("MarSeille"), "marseille");
    }

    #[test]
    fn test_strips_accents() {
        assert_eq!(normalize("É paris"), "e paris");
        assert_eq!(normalize("Crème Brûlée"), "creme brulee");
        assert_eq!(normalize("Ñandú"), "nandu");
    }

    #[test]
    fn test_strips_precomposed_and_decomposed_alike() {
        assert_eq!(normalize("e\u{0301}cole"), normalize("\u{00e9}cole"));
    }

    #[test]
    fn test_removes_punctuation() {
        assert_eq!(normalize("test@example.com"), "testexamplecom");
        assert_eq!(normalize("O'Brien-Smith"), "obriensmith");
        assert_eq!(normalize("+33 (0)6 12-34"), "33 06 1234");
    }

    #[test]
    fn test_keeps_underscore_and_digits() {
        assert_eq!(normalize("user_42"), "user_42");
    }

    #[test]
    fn test_collapses_and_trims_whitespace() {
        assert_eq!(normalize("  e  \t PARIS \n"), "e paris");
        assert_eq!(normalize("a , b"), "a b");
    }

    #[test]
    fn test_information_separators_split_words() {
        assert_eq!(normalize("a\u{1f}b"), "a b");
        assert_eq!(normalize("a\u{1c}\u{1d}\u{1e}b"), "a b");
        assert_eq!(normalize("\u{1f}paris\u{1c}"), "paris");
        assert_eq!(normalize("a\u{0}b\u{7f}c"), "abc");
    }

    #[test]
    fn test_separator_class() {
        let separators = [' ', '\t', '\n', '\r', '\u{0b}', '\u{0c}', '\u{1c}', '\u{1f}', '\u{85}', '\u{a0}', '\u{3000}'];
        for c in separators {
            assert!(is_separator(c), "{c:?} should separate");
        }
        for c in ['a', '_', '\u{0}', '\u{1b}', '\u{7f}', '\u{200b}'] {
            assert!(!is_separator(c), "{c:?} should not separate");
        }
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn test_non_latin_scripts_survive() {
        assert_eq!(normalize("Москва"), "москва");
        assert_eq!(normalize("東京"), "東京");
    }

    #[test]
    fn test_idempotent() {
        for input in ["É paris", "  Hello,   World! ", "Zoë_99", "東京 タワー"] {
            let once = normalize(input);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_trait_reports_version() {
        let normalizer = DefaultNormalizer;
        assert_eq!(normalizer.version(), NORMALIZATION_VERSION);
        assert_eq!(normalizer.normalize("e  PARIS"), "e paris");
    }
}
