//! OAuth2 provider client.
//!
//! Builds authorization URLs, exchanges authorization codes for provider
//! access tokens and fetches the user's profile. Every network call is a
//! single attempt with the HTTP client's default timeouts.

use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::error::{AppError, AppResult};

/// User-Agent sent to providers (GitHub rejects requests without one).
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Registered provider names.
pub const SUPPORTED_PROVIDERS: &[&str] = &["github", "google", "microsoft"];

/// Profile returned by a provider's userinfo endpoint.
pub type UserInfo = serde_json::Map<String, Value>;

/// Endpoints and scope for one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub name: String,
    pub authorization_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// Email list endpoint, consulted when the profile has no email (GitHub only)
    pub emails_url: Option<String>,
    pub scope: String,
}

/// Look up a registered provider by name.
pub fn provider_config(name: &str) -> AppResult<ProviderConfig> {
    let (authorization_url, token_url, userinfo_url, emails_url, scope) =
        match name.to_lowercase().as_str() {
            "github" => (
                "https://github.com/login/oauth/authorize",
                "https://github.com/login/oauth/access_token",
                "https://api.github.com/user",
                Some("https://api.github.com/user/emails"),
                "user:email read:user",
            ),
            "google" => (
                "https://accounts.google.com/o/oauth2/v2/auth",
                "https://oauth2.googleapis.com/token",
                "https://www.googleapis.com/oauth2/v3/userinfo",
                None,
                "openid email profile",
            ),
            "microsoft" => (
                "https://login.microsoftonline.com/common/oauth2/v2.0/authorize",
                "https://login.microsoftonline.com/common/oauth2/v2.0/token",
                "https://graph.microsoft.com/v1.0/me",
                None,
                "openid email profile User.Read",
            ),
            _ => return Err(AppError::UnsupportedProvider(name.to_string())),
        };

    Ok(ProviderConfig {
        name: name.to_lowercase(),
        authorization_url: authorization_url.to_string(),
        token_url: token_url.to_string(),
        userinfo_url: userinfo_url.to_string(),
        emails_url: emails_url.map(String::from),
        scope: scope.to_string(),
    })
}

/// Build the provider URL the browser is sent to for login.
pub fn build_authorization_url(
    provider: &ProviderConfig,
    client_id: &str,
    redirect_uri: &str,
) -> String {
    format!(
        "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
        provider.authorization_url,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(&provider.scope),
    )
}

/// Read the email from a provider profile (`email`, falling back to `mail`).
pub fn extract_email(user_info: &UserInfo) -> AppResult<String> {
    ["email", "mail"]
        .iter()
        .find_map(|field| non_empty_str(user_info, field))
        .map(String::from)
        .ok_or(AppError::EmailMissing)
}

fn non_empty_str<'a>(user_info: &'a UserInfo, field: &str) -> Option<&'a str> {
    user_info
        .get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Entry from GitHub's email list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderEmail {
    pub email: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub verified: bool,
}

/// Pick the primary verified email, else the first verified one.
pub fn select_email(emails: &[ProviderEmail]) -> Option<&str> {
    emails
        .iter()
        .find(|e| e.primary && e.verified)
        .or_else(|| emails.iter().find(|e| e.verified))
        .map(|e| e.email.as_str())
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<String>,
    error: Option<String>,
}

/// HTTP client for provider calls.
#[derive(Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
}

impl OAuthClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http })
    }

    /// Exchange an authorization code for the provider's access token.
    pub async fn exchange_code(
        &self,
        provider: &ProviderConfig,
        code: &str,
        client_id: &str,
        client_secret: &SecretString,
        redirect_uri: &str,
    ) -> AppResult<SecretString> {
        let exchange_failed = |e: reqwest::Error| {
            error!(provider = %provider.name, "Failed to exchange code for token: {}", e);
            AppError::ProviderExchange("Failed to exchange authorization code".to_string())
        };

        let response: TokenExchangeResponse = self
            .http
            .post(&provider.token_url)
            .header(ACCEPT, "application/json")
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret.expose_secret()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(exchange_failed)?
            .error_for_status()
            .map_err(exchange_failed)?
            .json()
            .await
            .map_err(exchange_failed)?;

        if let Some(ref err) = response.error {
            warn!(provider = %provider.name, "Provider returned error: {}", err);
        }

        response
            .access_token
            .filter(|t| !t.is_empty())
            .map(SecretString::from)
            .ok_or_else(|| AppError::ProviderExchange("No access token in response".to_string()))
    }

    /// Fetch the user's profile, filling in `email` from the email list when
    /// the provider has one and the profile lacks it.
    pub async fn fetch_user_info(
        &self,
        provider: &ProviderConfig,
        access_token: &SecretString,
    ) -> AppResult<UserInfo> {
        let mut user_info: UserInfo = self.get_json(&provider.userinfo_url, access_token).await?;

        if let Some(ref emails_url) = provider.emails_url
            && non_empty_str(&user_info, "email").is_none()
        {
            let emails: Vec<ProviderEmail> = self.get_json(emails_url, access_token).await?;
            match select_email(&emails) {
                Some(email) => {
                    info!(provider = %provider.name, "Using verified email from email list");
                    user_info.insert("email".to_string(), Value::String(email.to_string()));
                }
                None => warn!(provider = %provider.name, "No verified email in email list"),
            }
        }

        Ok(user_info)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &SecretString,
    ) -> AppResult<T> {
        let userinfo_failed = |e: reqwest::Error| {
            error!(url = %url, "Failed to get user info: {}", e);
            AppError::ProviderUserInfo("Failed to retrieve user information".to_string())
        };

        self.http
            .get(url)
            .header(ACCEPT, "application/json")
            .bearer_auth(access_token.expose_secret())
            .send()
            .await
            .map_err(userinfo_failed)?
            .error_for_status()
            .map_err(userinfo_failed)?
            .json()
            .await
            .map_err(userinfo_failed)
    }
}
