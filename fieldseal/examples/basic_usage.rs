//! Basic usage example for `fieldseal`.

use fieldseal::prelude::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("fieldseal Basic Usage Example");
    println!("=============================\n");

    // In production the master key comes from FIELDSEAL_MASTER_KEY.
    let master = MasterSecret::generate();
    let manager = KeyManager::new(master);
    println!("✓ KeyManager created\n");

    let crypto = EncryptionService::from_key_manager(&manager)?;
    let search = SearchIndexService::from_key_manager(&manager)?;
    println!("✓ Services created (normalizer v{})\n", search.normalizer_version());

    // Encrypt a field
    let email = "Alice.Martin@Example.com";
    let ciphertext = crypto.encrypt(email)?;
    println!("Plaintext:  {email}");
    println!("Ciphertext: {ciphertext}");

    let decrypted = crypto.decrypt(&ciphertext)?;
    assert_eq!(decrypted, email);
    println!("✓ Round-trip verification successful\n");

    // Exact-match lookup via blind index
    let stored_email_index = search.create_blind_index(email);
    println!("Blind index: {stored_email_index}");
    assert_eq!(stored_email_index, search.create_blind_index("alice.martin@example.com"));
    println!("✓ Case-insensitive exact match\n");

    // Fuzzy lookup via trigram index
    let name = "Amélie Poulain";
    let stored_name_index = search.create_trigram_index(name);
    println!("Trigram index for {name:?}: {stored_name_index}");

    for query in ["amel", "POUL", "poulet", "xyz"] {
        println!(
            "  {query:>8} -> match: {:5}  score: {:.2}",
            search.match_trigrams(query, &stored_name_index),
            search.search_score(query, &stored_name_index),
        );
    }

    // Rotate: decrypt under the old service, re-encrypt under the new one.
    manager.rotate(MasterSecret::generate());
    let rotated = EncryptionService::from_key_manager(&manager)?;
    assert!(rotated.decrypt(&ciphertext).is_err());

    let migrated = rotated.encrypt(&crypto.decrypt(&ciphertext)?)?;
    assert_eq!(rotated.decrypt(&migrated)?, email);
    println!("\n✓ Master secret rotated and field re-encrypted");

    println!("\n=============================");
    println!("All operations successful! 🎉");

    Ok(())
}
