//! CLI tool to add an API key to an `API_KEYS` value.
//!
//! Usage:
//!   cargo run --bin encode-api-keys -- --username alice --roles admin,user

use std::env;

use math_api_lib::config::{
    ApiKeyEntry, ApiKeyTable, decode_plaintext_entries, encode_plaintext_entries,
};

/// Prefix of generated keys.
const KEY_PREFIX: &str = "mak_";

fn generate_key() -> String {
    let random_bytes: [u8; 24] = rand::random();
    format!("{}{}", KEY_PREFIX, hex::encode(random_bytes))
}

fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let mut username: Option<String> = None;
    let mut roles: Vec<String> = Vec::new();
    let mut key: Option<String> = None;
    let mut existing: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--username" | "-u" => {
                i += 1;
                if i < args.len() {
                    username = Some(args[i].clone());
                }
            }
            "--roles" | "-r" => {
                i += 1;
                if i < args.len() {
                    roles = args[i]
                        .split(',')
                        .map(str::trim)
                        .filter(|r| !r.is_empty())
                        .map(String::from)
                        .collect();
                }
            }
            "--key" | "-k" => {
                i += 1;
                if i < args.len() {
                    key = Some(args[i].clone());
                }
            }
            "--existing" | "-e" => {
                i += 1;
                if i < args.len() {
                    existing = Some(args[i].clone());
                }
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let username = match username {
        Some(u) if !u.trim().is_empty() => u,
        _ => {
            eprintln!("Error: --username is required");
            print_usage();
            std::process::exit(1);
        }
    };

    let mut entries = match existing.as_deref() {
        Some(encoded) => match decode_plaintext_entries(encoded) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Error reading --existing: {}", e);
                std::process::exit(1);
            }
        },
        None => Vec::new(),
    };

    let key = key.unwrap_or_else(generate_key);
    entries.push((key.clone(), ApiKeyEntry { username, roles }));

    // Same check the server runs at startup
    if let Err(e) = ApiKeyTable::from_plaintext(entries.iter().cloned()) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let encoded = match encode_plaintext_entries(&entries) {
        Ok(encoded) => encoded,
        Err(e) => {
            eprintln!("Error encoding keys: {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("════════════════════════════════════════════════════════════════");
    println!("  API Key Added ({} total)", entries.len());
    println!("════════════════════════════════════════════════════════════════");
    println!();
    println!("  Key:      {}", key);
    println!();
    println!("  API_KEYS={}", encoded);
    println!();
    println!("  Save this key! Only its hash is used by the server.");
    println!("════════════════════════════════════════════════════════════════");
    println!();
}

fn print_usage() {
    eprintln!();
    eprintln!(
        "Usage: encode-api-keys --username <name> [--roles <a,b>] [--key <key>] [--existing <base64>]"
    );
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --username, -u  Owner of the key (required)");
    eprintln!("  --roles, -r     Comma-separated roles, e.g. admin,user");
    eprintln!("  --key, -k       Use this key instead of generating one");
    eprintln!("  --existing, -e  Current API_KEYS value to extend");
    eprintln!("  --help, -h      Show this help");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  encode-api-keys --username alice --roles admin,user");
    eprintln!("  encode-api-keys --username bob --roles user --existing \"$API_KEYS\"");
    eprintln!();
}
