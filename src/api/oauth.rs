//! OAuth login endpoints.
//!
//! 1. GET /auth/oauth/provider: name of the configured provider
//! 2. POST /auth/oauth/authorize: provider URL to send the browser to
//! 3. POST /auth/oauth/token: exchange the returned code for our own access token

use actix_web::{HttpResponse, get, post, web};
use tracing::{debug, info};

use crate::auth::Authenticator;
use crate::config::Settings;
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthorizationRequest, AuthorizationResponse, ProviderResponse, TokenRequest, TokenResponse,
};
use crate::services::oauth_provider::{build_authorization_url, extract_email};
use crate::services::roles::assign_roles;
use crate::services::{OAuthClient, ProviderConfig};

/// Configure OAuth routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_provider)
        .service(get_authorization_url)
        .service(exchange_code_for_token);
}

/// Get the configured OAuth provider name.
#[utoipa::path(
    get,
    path = "/auth/oauth/provider",
    tag = "OAuth",
    responses(
        (status = 200, description = "Configured provider", body = ProviderResponse)
    )
)]
#[get("/auth/oauth/provider")]
pub async fn get_provider(provider: web::Data<ProviderConfig>) -> HttpResponse {
    HttpResponse::Ok().json(ProviderResponse {
        provider: provider.name.clone(),
    })
}

/// Generate the provider authorization URL.
#[utoipa::path(
    post,
    path = "/auth/oauth/authorize",
    tag = "OAuth",
    request_body = AuthorizationRequest,
    responses(
        (status = 200, description = "Authorization URL", body = AuthorizationResponse),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/oauth/authorize")]
pub async fn get_authorization_url(
    body: web::Json<AuthorizationRequest>,
    settings: web::Data<Settings>,
    provider: web::Data<ProviderConfig>,
) -> AppResult<HttpResponse> {
    if body.redirect_uri.trim().is_empty() {
        return Err(AppError::InvalidInput("redirect_uri is required".to_string()));
    }

    let authorization_url =
        build_authorization_url(&provider, &settings.oauth.client_id, &body.redirect_uri);

    info!("Generated authorization URL for provider: {}", provider.name);
    Ok(HttpResponse::Ok().json(AuthorizationResponse { authorization_url }))
}

/// Exchange an authorization code for an access token.
///
/// The code is traded for the provider's token, the profile email becomes
/// the subject, and roles come from the admin email/domain lists.
#[utoipa::path(
    post,
    path = "/auth/oauth/token",
    tag = "OAuth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Access token issued", body = TokenResponse),
        (status = 400, description = "Provider exchange failed or email missing", body = crate::error::ErrorResponse)
    )
)]
#[post("/auth/oauth/token")]
pub async fn exchange_code_for_token(
    body: web::Json<TokenRequest>,
    settings: web::Data<Settings>,
    provider: web::Data<ProviderConfig>,
    client: web::Data<OAuthClient>,
    authenticator: web::Data<Authenticator>,
) -> AppResult<HttpResponse> {
    let oauth = &settings.oauth;

    let provider_token = client
        .exchange_code(
            &provider,
            &body.code,
            &oauth.client_id,
            &oauth.client_secret,
            &body.redirect_uri,
        )
        .await?;

    let user_info = client.fetch_user_info(&provider, &provider_token).await?;
    debug!(
        provider = %provider.name,
        fields = ?user_info.keys().collect::<Vec<_>>(),
        "Retrieved user info"
    );

    let email = extract_email(&user_info)?;
    let roles = assign_roles(&email, &oauth.admin_emails, &oauth.admin_domains);

    let access_token = authenticator
        .codec()
        .issue(&email, Some(&provider.name), &roles, None)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    info!(
        user = %email,
        roles = ?roles,
        "Successfully authenticated user: {} via {}",
        email,
        provider.name
    );

    Ok(HttpResponse::Ok().json(TokenResponse::bearer(access_token)))
}
