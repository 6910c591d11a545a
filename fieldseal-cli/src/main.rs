//! `fieldseal` CLI for field encryption and search index operations.
//!
//! The master key is read from `FIELDSEAL_MASTER_KEY` only, never from argv.
//! Field values may be passed as arguments, but omitting them (or passing
//! `-`) reads the value from stdin, which keeps PII out of the process table
//! and shell history.

#![warn(clippy::pedantic, clippy::nursery)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use fieldseal::config::{MasterSecret, MASTER_KEY_ENV};
use fieldseal::prelude::*;
use fieldseal::trigram::DEFAULT_TOKEN_HEX_LEN;
use std::io::Read;
use tracing_subscriber::EnvFilter;

/// Argument value that means "read from stdin".
const STDIN_MARKER: &str = "-";

#[derive(Parser)]
#[command(name = "fieldseal")]
#[command(about = "Field-level encryption and searchable index CLI", long_about = None)]
#[command(after_help = "The master key is read from FIELDSEAL_MASTER_KEY (64 hex characters).")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TrigramArgs {
    /// Hex characters kept per trigram token
    #[arg(long, default_value_t = DEFAULT_TOKEN_HEX_LEN)]
    hash_len: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new master key
    Keygen,
    /// Encrypt a field value
    Encrypt {
        /// Plaintext to encrypt (stdin when omitted or `-`)
        plaintext: Option<String>,
    },
    /// Decrypt a field value
    Decrypt {
        /// Base64 ciphertext to decrypt (stdin when omitted or `-`)
        ciphertext: Option<String>,
    },
    /// Compute the exact-match blind index of a value
    BlindIndex {
        /// Value to index (stdin when omitted or `-`)
        value: Option<String>,
    },
    /// Compute the trigram index of a value
    TrigramIndex {
        #[command(flatten)]
        trigram: TrigramArgs,
        /// Value to index (stdin when omitted or `-`)
        value: Option<String>,
    },
    /// Check whether a query matches a stored trigram index
    Match {
        #[command(flatten)]
        trigram: TrigramArgs,
        /// Stored trigram index
        index: String,
        /// Search query (stdin when omitted or `-`)
        query: Option<String>,
    },
    /// Score a query against a stored trigram index
    Score {
        #[command(flatten)]
        trigram: TrigramArgs,
        /// Stored trigram index
        index: String,
        /// Search query (stdin when omitted or `-`)
        query: Option<String>,
    },
    /// Print the normalized form of a value
    Normalize {
        /// Value to normalize (stdin when omitted or `-`)
        value: Option<String>,
    },
}

fn key_manager() -> Result<KeyManager> {
    KeyManager::from_env()
        .with_context(|| format!("{MASTER_KEY_ENV} must hold a 64-character hex master key"))
}

fn search_service(manager: &KeyManager, trigram: &TrigramArgs) -> Result<SearchIndexService> {
    let config = TrigramConfig::new(trigram.hash_len)?;
    let search = SearchIndexService::from_key_manager(manager)?;
    Ok(search.with_config(config))
}

/// Returns `arg`, or the contents of `reader` when `arg` is absent or `-`.
///
/// One trailing line ending is dropped so `echo value | fieldseal ...` sees
/// `value`.
fn read_value(arg: Option<String>, mut reader: impl Read) -> Result<String> {
    match arg {
        Some(value) if value != STDIN_MARKER => Ok(value),
        _ => {
            let mut value = String::new();
            reader.read_to_string(&mut value).context("failed to read value from stdin")?;
            if value.ends_with('\n') {
                value.pop();
                if value.ends_with('\r') {
                    value.pop();
                }
            }
            Ok(value)
        }
    }
}

fn input(arg: Option<String>) -> Result<String> {
    read_value(arg, std::io::stdin().lock())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen => {
            println!("{}", MasterSecret::generate().to_hex().as_str());
        }
        Commands::Encrypt { plaintext } => {
            let crypto = EncryptionService::from_key_manager(&key_manager()?)?;
            println!("{}", crypto.encrypt(&input(plaintext)?)?);
        }
        Commands::Decrypt { ciphertext } => {
            let crypto = EncryptionService::from_key_manager(&key_manager()?)?;
            println!("{}", crypto.decrypt(&input(ciphertext)?)?);
        }
        Commands::BlindIndex { value } => {
            let search = SearchIndexService::from_key_manager(&key_manager()?)?;
            println!("{}", search.create_blind_index(&input(value)?));
        }
        Commands::TrigramIndex { trigram, value } => {
            let search = search_service(&key_manager()?, &trigram)?;
            println!("{}", search.create_trigram_index(&input(value)?));
        }
        Commands::Match { trigram, index, query } => {
            let search = search_service(&key_manager()?, &trigram)?;
            println!("{}", search.match_trigrams(&input(query)?, &index));
        }
        Commands::Score { trigram, index, query } => {
            let search = search_service(&key_manager()?, &trigram)?;
            println!("{:.4}", search.search_score(&input(query)?, &index));
        }
        Commands::Normalize { value } => {
            println!("{}", fieldseal::normalize::normalize(&input(value)?));
        }
    }

    Ok(())
}
