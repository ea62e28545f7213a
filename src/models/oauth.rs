//! OAuth login endpoint models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Configured provider name.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProviderResponse {
    pub provider: String,
}

/// Request for a provider authorization URL.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorizationRequest {
    /// Where the provider sends the browser back with `?code=`
    pub redirect_uri: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorizationResponse {
    pub authorization_url: String,
}

/// Authorization code returned by the provider.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenRequest {
    pub code: String,
    /// Must match the URI used for the authorization request
    pub redirect_uri: String,
}

/// Access token issued by this server.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}
