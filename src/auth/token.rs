//! Access tokens issued after an OAuth login.
//!
//! HS256 JWTs signed with `OAUTH_SECRET_KEY`. A token is valid while its
//! signature checks out and `exp` has not passed; there is no revocation.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::OAuthSettings;
use crate::error::AuthError;

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Caller email. Optional on decode; a token without it never authenticates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
}

/// Token codec errors.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

impl From<&TokenError> for AuthError {
    fn from(err: &TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid(_) | TokenError::Signing(_) => AuthError::TokenInvalid,
        }
    }
}

/// Signs and verifies access tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    default_ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &SecretString, default_ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_aud = false;

        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
            default_ttl,
        }
    }

    /// Out-of-range lifetimes saturate; `issue` then refuses to sign.
    pub fn from_settings(settings: &OAuthSettings) -> Self {
        let ttl =
            Duration::try_minutes(settings.access_token_expire_minutes).unwrap_or(Duration::MAX);
        Self::new(&settings.secret_key, ttl)
    }

    /// Issue a token for `subject`, expiring after `ttl` (or the default lifetime).
    pub fn issue(
        &self,
        subject: &str,
        provider: Option<&str>,
        roles: &[String],
        ttl: Option<Duration>,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(ttl.unwrap_or(self.default_ttl))
            .ok_or_else(|| TokenError::Signing("token lifetime out of range".to_string()))?;

        let claims = AccessClaims {
            sub: Some(subject.to_string()),
            roles: roles.to_vec(),
            provider: provider.map(String::from),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        match decode::<AccessClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                self.log_expiry(token);
                Err(TokenError::Expired)
            }
            Err(e) => Err(TokenError::Invalid(e.to_string())),
        }
    }

    /// Log when an expired (but correctly signed) token ran out.
    fn log_expiry(&self, token: &str) {
        let mut validation = self.validation.clone();
        validation.validate_exp = false;
        if let Ok(data) = decode::<AccessClaims>(token, &self.decoding_key, &validation) {
            debug!(
                exp = data.claims.exp,
                now = Utc::now().timestamp(),
                "Access token expired"
            );
        }
    }
}
