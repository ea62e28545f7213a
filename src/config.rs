//! Application settings loaded from environment variables.

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;

use base64::{Engine, engine::general_purpose::STANDARD};
use secrecy::{ExposeSecret, SecretString};
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::hash_api_key;
use crate::services::oauth_provider;

/// Default values used when a variable is not set.
pub mod defaults {
    pub const APP_NAME: &str = "math-api";
    pub const APP_DESCRIPTION: &str = "Arithmetic API secured by API keys and OAuth";
    pub const HOST: &str = "127.0.0.1";
    pub const PORT: u16 = 8000;
    pub const LOG_LEVEL_CONSOLE: &str = "INFO";
    pub const LOG_LEVEL_FILE: &str = "DEBUG";
    pub const LOG_CONFIG_PATH: &str = "config/logging.json";
    pub const STATIC_DIR: &str = "static";
    pub const CORS_ALLOW_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000,*";
    /// `{"test": {"username": "Jonathan", "roles": ["admin", "user"]},
    ///   "test2": {"username": "bob", "roles": ["user"]}}`
    pub const API_KEYS: &str = "eyJ0ZXN0Ijp7InVzZXJuYW1lIjoiSm9uYXRoYW4iLCJyb2xlcyI6WyJhZG1pbiIsInVzZXIiXX0sInRlc3QyIjp7InVzZXJuYW1lIjoiYm9iIiwicm9sZXMiOlsidXNlciJdfX0=";
    pub const OAUTH_PROVIDER: &str = "github";
    pub const OAUTH_SECRET_KEY: &str = "your-secret-key-min-32-chars-change-in-production";
    pub const OAUTH_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 1440;
    pub const OAUTH_ADMIN_EMAILS: &str = "admin@example.com";
    pub const OAUTH_ADMIN_DOMAINS: &str = "admin.com,company.com";
    /// Shortest signing secret accepted without a startup warning.
    pub const MIN_SECRET_LEN: usize = 32;
    /// Longest accepted access token lifetime (ten years).
    pub const MAX_ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 10 * 365 * 24 * 60;
}

/// Owner of an API key, as configured in `API_KEYS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyEntry {
    pub username: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Plaintext key entries in the order they appear in the JSON document.
///
/// Deserialized by hand so duplicate keys survive parsing and can be rejected.
struct PlaintextEntries(Vec<(String, ApiKeyEntry)>);

impl<'de> Deserialize<'de> for PlaintextEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = PlaintextEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of API keys to {username, roles}")
            }

            fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, entry)) = map.next_entry::<String, ApiKeyEntry>()? {
                    entries.push((key, entry));
                }
                Ok(PlaintextEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Decode a base64 JSON API key document into its plaintext entries.
pub fn decode_plaintext_entries(encoded: &str) -> Result<Vec<(String, ApiKeyEntry)>, ConfigError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ConfigError::InvalidApiKeys(format!("not valid base64: {}", e)))?;
    let json = String::from_utf8(bytes)
        .map_err(|e| ConfigError::InvalidApiKeys(format!("not valid UTF-8: {}", e)))?;
    let PlaintextEntries(entries) = serde_json::from_str(&json)
        .map_err(|e| ConfigError::InvalidApiKeys(format!("not valid JSON: {}", e)))?;
    Ok(entries)
}

/// Encode plaintext entries into the base64 JSON form expected by `API_KEYS`.
pub fn encode_plaintext_entries(entries: &[(String, ApiKeyEntry)]) -> Result<String, ConfigError> {
    let mut document = serde_json::Map::new();
    for (key, entry) in entries {
        let value = serde_json::to_value(entry)
            .map_err(|e| ConfigError::InvalidApiKeys(e.to_string()))?;
        document.insert(key.clone(), value);
    }
    let json = serde_json::to_string(&document)
        .map_err(|e| ConfigError::InvalidApiKeys(e.to_string()))?;
    Ok(STANDARD.encode(json))
}

/// API key lookup table keyed by the SHA-256 hex digest of each key.
///
/// Uniqueness is enforced on the plaintext keys only; two distinct keys that
/// hash to the same digest would silently collapse into one entry.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyTable(HashMap<String, ApiKeyEntry>);

impl ApiKeyTable {
    /// Build the table from plaintext entries, rejecting duplicate keys.
    pub fn from_plaintext<I>(entries: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, ApiKeyEntry)>,
    {
        let mut seen = std::collections::HashSet::new();
        let mut table = HashMap::new();
        for (key, entry) in entries {
            if !seen.insert(key.clone()) {
                return Err(ConfigError::DuplicateApiKey);
            }
            table.insert(hash_api_key(&key), entry);
        }
        Ok(Self(table))
    }

    /// Decode `API_KEYS` (base64 JSON) and hash every key.
    pub fn from_base64(encoded: &str) -> Result<Self, ConfigError> {
        Self::from_plaintext(decode_plaintext_entries(encoded)?)
    }

    /// Look up an entry by hashed key.
    pub fn get(&self, hashed_key: &str) -> Option<&ApiKeyEntry> {
        self.0.get(hashed_key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// OAuth login and token issuance settings.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    /// Registered provider name (github, google, microsoft)
    pub provider: String,
    /// HS256 signing secret for issued access tokens
    pub secret_key: SecretString,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Lifetime of issued access tokens
    pub access_token_expire_minutes: i64,
    /// Emails granted the admin role on login
    pub admin_emails: Vec<String>,
    /// Email domains granted the admin role on login
    pub admin_domains: Vec<String>,
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub app_name: String,
    pub description: String,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    pub log_level_console: String,
    pub log_level_file: String,
    /// Logging topology file
    pub log_config_path: PathBuf,
    pub cors_allow_origins: Vec<String>,
    /// Directory served under `/static`
    pub static_dir: PathBuf,
    pub api_keys: ApiKeyTable,
    pub oauth: OAuthSettings,
}

impl Settings {
    /// Load settings from process environment variables.
    ///
    /// Call `dotenvy::dotenv()` first to pick up a `.env` file.
    ///
    /// Environment variables:
    /// - `APP_NAME`, `APP_DESCRIPTION`: OpenAPI metadata
    /// - `HOST`, `PORT`: bind address (default: 127.0.0.1:8000)
    /// - `LOG_LEVEL_CONSOLE`, `LOG_LEVEL_FILE`: log levels (default: INFO, DEBUG)
    /// - `LOG_CONFIG_PATH`: logging topology file (default: config/logging.json)
    /// - `CORS_ALLOW_ORIGINS`: comma separated origins, `*` allows any
    /// - `STATIC_DIR`: landing page directory (default: static)
    /// - `API_KEYS`: base64 JSON `{key: {username, roles}}`
    /// - `OAUTH_PROVIDER`: github, google or microsoft (default: github)
    /// - `OAUTH_SECRET_KEY`: access token signing secret
    /// - `OAUTH_CLIENT_ID`, `OAUTH_CLIENT_SECRET`: provider app credentials
    /// - `OAUTH_ACCESS_TOKEN_EXPIRE_MINUTES`: token lifetime (default: 1440)
    /// - `OAUTH_ADMIN_EMAILS`, `OAUTH_ADMIN_DOMAINS`: comma separated admin grants
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load settings through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidValue("PORT must be a valid port number"))?,
            None => defaults::PORT,
        };

        let access_token_expire_minutes = match lookup("OAUTH_ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| (1..=defaults::MAX_ACCESS_TOKEN_EXPIRE_MINUTES).contains(m))
                .ok_or(ConfigError::InvalidValue(
                    "OAUTH_ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and 5256000",
                ))?,
            None => defaults::OAUTH_ACCESS_TOKEN_EXPIRE_MINUTES,
        };

        let provider = var("OAUTH_PROVIDER", defaults::OAUTH_PROVIDER).to_lowercase();
        if oauth_provider::provider_config(&provider).is_err() {
            return Err(ConfigError::UnsupportedProvider(provider));
        }

        let api_keys = ApiKeyTable::from_base64(&var("API_KEYS", defaults::API_KEYS))?;

        let oauth = OAuthSettings {
            provider,
            secret_key: SecretString::from(var("OAUTH_SECRET_KEY", defaults::OAUTH_SECRET_KEY)),
            client_id: var("OAUTH_CLIENT_ID", ""),
            client_secret: SecretString::from(var("OAUTH_CLIENT_SECRET", "")),
            access_token_expire_minutes,
            admin_emails: split_list(&var("OAUTH_ADMIN_EMAILS", defaults::OAUTH_ADMIN_EMAILS)),
            admin_domains: split_list(&var("OAUTH_ADMIN_DOMAINS", defaults::OAUTH_ADMIN_DOMAINS)),
        };

        Ok(Settings {
            app_name: var("APP_NAME", defaults::APP_NAME),
            description: var("APP_DESCRIPTION", defaults::APP_DESCRIPTION),
            host: var("HOST", defaults::HOST),
            port,
            log_level_console: var("LOG_LEVEL_CONSOLE", defaults::LOG_LEVEL_CONSOLE),
            log_level_file: var("LOG_LEVEL_FILE", defaults::LOG_LEVEL_FILE),
            log_config_path: PathBuf::from(var("LOG_CONFIG_PATH", defaults::LOG_CONFIG_PATH)),
            cors_allow_origins: split_list(&var("CORS_ALLOW_ORIGINS", defaults::CORS_ALLOW_ORIGINS)),
            static_dir: PathBuf::from(var("STATIC_DIR", defaults::STATIC_DIR)),
            api_keys,
            oauth,
        })
    }

    /// Collect warnings about settings that are unsafe outside local development.
    pub fn insecure_settings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        let secret = self.oauth.secret_key.expose_secret();
        if secret == defaults::OAUTH_SECRET_KEY {
            warnings.push("OAUTH_SECRET_KEY is using the built-in default".to_string());
        } else if secret.len() < defaults::MIN_SECRET_LEN {
            warnings.push(format!(
                "OAUTH_SECRET_KEY is shorter than {} characters",
                defaults::MIN_SECRET_LEN
            ));
        }

        if self.oauth.client_id.is_empty() {
            warnings.push("OAUTH_CLIENT_ID is not set; OAuth login will fail".to_string());
        }

        if self.cors_allow_origins.iter().any(|o| o == "*") {
            warnings.push("CORS_ALLOW_ORIGINS allows any origin".to_string());
        }

        warnings
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid API_KEYS value: {0}")]
    InvalidApiKeys(String),

    #[error("All keys in API_KEYS must be unique")]
    DuplicateApiKey,

    #[error("Unsupported OAuth provider: {0}")]
    UnsupportedProvider(String),
}
