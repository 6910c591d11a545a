//! Property-based tests for encryption, normalization and trigram search.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use fieldseal::normalize::normalize;
use fieldseal::prelude::*;
use proptest::prelude::*;

fn crypto() -> EncryptionService {
    EncryptionService::new(&DerivedKey::new(KeyPurpose::Encryption, [11u8; 32])).unwrap()
}

fn search() -> SearchIndexService {
    SearchIndexService::new(&DerivedKey::new(KeyPurpose::BlindIndex, [22u8; 32]), DefaultNormalizer)
        .unwrap()
}

proptest! {
    #[test]
    fn prop_encrypt_decrypt_round_trip(plaintext in ".{1,200}") {
        let crypto = crypto();
        let ciphertext = crypto.encrypt(&plaintext).unwrap();
        prop_assert_eq!(crypto.decrypt(&ciphertext).unwrap(), plaintext);
    }

    #[test]
    fn prop_encrypt_is_randomized(plaintext in ".{1,64}") {
        let crypto = crypto();
        let first = crypto.encrypt(&plaintext).unwrap();
        let second = crypto.encrypt(&plaintext).unwrap();

        prop_assert_ne!(&first, &second);
        prop_assert_eq!(crypto.decrypt(&first).unwrap(), plaintext.clone());
        prop_assert_eq!(crypto.decrypt(&second).unwrap(), plaintext);
    }

    #[test]
    fn prop_any_byte_flip_is_detected(
        plaintext in ".{1,64}",
        position in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let crypto = crypto();
        let mut raw = STANDARD.decode(crypto.encrypt(&plaintext).unwrap()).unwrap();
        let i = position.index(raw.len());
        raw[i] ^= mask;

        prop_assert!(matches!(crypto.decrypt(&STANDARD.encode(&raw)), Err(Error::Encryption)));
    }

    #[test]
    fn prop_decrypt_never_panics(input in ".{0,120}") {
        let _ = crypto().decrypt(&input);
    }

    #[test]
    fn prop_normalize_is_idempotent(value in "[a-zA-Z0-9À-ÿ _.,!@'-]{0,80}") {
        let once = normalize(&value);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn prop_normalize_output_shape(value in ".{0,80}") {
        let normalized = normalize(&value);
        prop_assert_eq!(normalized.trim(), normalized.as_str());
        prop_assert!(!normalized.contains("  "));
    }

    #[test]
    fn prop_blind_index_is_case_insensitive(value in "[a-zA-Z0-9 ]{1,40}") {
        let search = search();
        prop_assert_eq!(
            search.create_blind_index(&value),
            search.create_blind_index(&value.to_uppercase())
        );
    }

    #[test]
    fn prop_trigram_index_is_canonical(value in "[a-z ]{0,40}") {
        let search = search();
        let stored = search.create_trigram_index(&value);
        let tokens: Vec<&str> = stored.split(',').filter(|t| !t.is_empty()).collect();

        prop_assert!(tokens.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(tokens.iter().all(|t| t.len() == 16));
        prop_assert_eq!(tokens.len(), search.create_trigrams(&value).len());
    }

    #[test]
    fn prop_substring_query_always_matches(value in "[a-z]{3,30}", start in 0usize..30, len in 3usize..30) {
        let search = search();
        let start = start % (value.len() - 2);
        let end = (start + len).min(value.len());
        prop_assume!(end - start >= 3);

        let stored = search.create_trigram_index(&value);
        let query = &value[start..end];

        prop_assert!(search.match_trigrams(query, &stored));
        prop_assert!((search.search_score(query, &stored) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn prop_short_query_never_matches(query in "[a-z]{0,2}", value in "[a-z]{0,30}") {
        let search = search();
        let stored = search.create_trigram_index(&value);
        prop_assert!(!search.match_trigrams(&query, &stored));
    }

    #[test]
    fn prop_score_is_bounded_and_consistent(query in "[a-z ]{0,20}", value in "[a-z ]{0,40}") {
        let search = search();
        let stored = search.create_trigram_index(&value);
        let score = search.search_score(&query, &stored);

        prop_assert!((0.0..=1.0).contains(&score));
        prop_assert_eq!(search.match_trigrams(&query, &stored), score >= 1.0);
    }
}
