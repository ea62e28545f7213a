//! Authentication for API keys and OAuth-issued access tokens.
//!
//! A bearer credential is tried against each strategy in `STRATEGY_ORDER`;
//! the first strategy that recognizes it decides the caller's identity and
//! the role check applies to that identity only.

mod extractor;
mod middleware;
pub mod token;

use std::sync::Arc;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::{ApiKeyTable, Settings};
use crate::error::AuthError;

pub use extractor::CurrentIdentity;
pub use middleware::RequireAuth;
pub use token::{AccessClaims, TokenCodec, TokenError};

/// Provider recorded for access tokens that carry none.
const UNKNOWN_PROVIDER: &str = "unknown";

/// Hash an API key using SHA-256, hex encoded.
pub fn hash_api_key(api_key: &str) -> String {
    hex::encode(Sha256::digest(api_key.as_bytes()))
}

/// How the caller authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthType {
    #[serde(rename = "api_key")]
    ApiKey,
    #[serde(rename = "oauth")]
    OAuth,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::OAuth => "oauth",
        }
    }
}

/// Resolved caller for the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    /// Username for API keys, email for access tokens
    pub subject: String,
    pub auth_type: AuthType,
    pub roles: Vec<String>,
    pub provider: Option<String>,
}

impl Identity {
    /// True when `allowed` is empty or shares at least one role with the caller.
    pub fn has_any_role(&self, allowed: &[String]) -> bool {
        allowed.is_empty() || allowed.iter().any(|role| self.roles.contains(role))
    }
}

/// A way of turning a bearer credential into an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Credential is a raw API key from `API_KEYS`
    ApiKey,
    /// Credential is an access token issued by `/auth/oauth/token`
    AccessToken,
}

/// Strategies are evaluated in this order; the first match wins.
pub const STRATEGY_ORDER: [Strategy; 2] = [Strategy::ApiKey, Strategy::AccessToken];

/// Resolves bearer credentials into identities.
///
/// Built once at startup and shared read-only across workers.
#[derive(Clone)]
pub struct Authenticator {
    api_keys: Arc<ApiKeyTable>,
    codec: TokenCodec,
}

impl Authenticator {
    pub fn new(api_keys: ApiKeyTable, codec: TokenCodec) -> Self {
        Self {
            api_keys: Arc::new(api_keys),
            codec,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.api_keys.clone(),
            TokenCodec::from_settings(&settings.oauth),
        )
    }

    /// Codec used to verify access tokens, shared with token issuance.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Try a single strategy. `None` means the credential is not recognized.
    pub fn resolve(&self, strategy: Strategy, token: &str) -> Option<Identity> {
        match strategy {
            Strategy::ApiKey => {
                let entry = self.api_keys.get(&hash_api_key(token))?;
                Some(Identity {
                    subject: entry.username.clone(),
                    auth_type: AuthType::ApiKey,
                    roles: entry.roles.clone(),
                    provider: None,
                })
            }
            Strategy::AccessToken => {
                let claims = match self.codec.verify(token) {
                    Ok(claims) => claims,
                    Err(e) => {
                        debug!(reason = ?AuthError::from(&e), "Access token rejected: {}", e);
                        return None;
                    }
                };
                let subject = claims.sub.filter(|s| !s.is_empty())?;
                Some(Identity {
                    subject,
                    auth_type: AuthType::OAuth,
                    roles: claims.roles,
                    provider: Some(
                        claims
                            .provider
                            .unwrap_or_else(|| UNKNOWN_PROVIDER.to_string()),
                    ),
                })
            }
        }
    }

    /// Authenticate an `Authorization` header value against `allowed_roles`.
    ///
    /// An empty `allowed_roles` admits any authenticated caller. The role check
    /// is the same for both strategies: a recognized credential without an
    /// allowed role is `Forbidden`, never a fall-through.
    pub fn authenticate(
        &self,
        authorization: Option<&str>,
        allowed_roles: &[String],
    ) -> Result<Identity, AuthError> {
        let token = parse_bearer(authorization)?;

        for strategy in STRATEGY_ORDER {
            let Some(identity) = self.resolve(strategy, token) else {
                continue;
            };

            if !identity.has_any_role(allowed_roles) {
                warn!(
                    user = %identity.subject,
                    auth_type = identity.auth_type.as_str(),
                    roles = ?identity.roles,
                    allowed = ?allowed_roles,
                    "Caller lacks required role"
                );
                return Err(AuthError::Forbidden);
            }

            info!(
                user = %identity.subject,
                auth_type = identity.auth_type.as_str(),
                roles = ?identity.roles,
                "Authenticated"
            );
            return Ok(identity);
        }

        Err(AuthError::InvalidCredentials)
    }
}

/// Extract the credential from `Bearer <token>`.
fn parse_bearer(authorization: Option<&str>) -> Result<&str, AuthError> {
    let value = authorization.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AuthError::NoCredentials);
    }

    let (scheme, credential) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::BadScheme);
    }

    let credential = credential.trim();
    if credential.is_empty() {
        return Err(AuthError::NoCredentials);
    }
    Ok(credential)
}
