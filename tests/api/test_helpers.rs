//! Shared test helpers for API tests.

use actix_web::dev::ServiceResponse;
use actix_web::{App, test, web};
use math_api_lib::api;
use math_api_lib::auth::{Authenticator, TokenCodec};
use math_api_lib::config::{ApiKeyEntry, Settings, encode_plaintext_entries};
use math_api_lib::services::{OAuthClient, ProviderConfig, oauth_provider};
use std::collections::HashMap;

/// API key with roles `admin` and `user`.
pub const TEST_ADMIN_KEY: &str = "test_admin_key";
/// API key with role `user`.
pub const TEST_USER_KEY: &str = "test_user_key";
/// API key with no roles.
pub const TEST_GUEST_KEY: &str = "test_guest_key";

pub const TEST_CLIENT_ID: &str = "test-client-id";
pub const TEST_SECRET: &str = "integration-test-signing-secret-0123456789";

fn entry(username: &str, roles: &[&str]) -> ApiKeyEntry {
    ApiKeyEntry {
        username: username.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

/// Settings with three test keys and a fixed signing secret.
pub fn test_settings() -> Settings {
    let api_keys = encode_plaintext_entries(&[
        (TEST_ADMIN_KEY.to_string(), entry("alice", &["admin", "user"])),
        (TEST_USER_KEY.to_string(), entry("bob", &["user"])),
        (TEST_GUEST_KEY.to_string(), entry("guest", &[])),
    ])
    .expect("failed to encode test keys");

    let vars: HashMap<&str, String> = HashMap::from([
        ("API_KEYS", api_keys),
        ("OAUTH_PROVIDER", "github".to_string()),
        ("OAUTH_SECRET_KEY", TEST_SECRET.to_string()),
        ("OAUTH_CLIENT_ID", TEST_CLIENT_ID.to_string()),
        ("OAUTH_CLIENT_SECRET", "test-client-secret".to_string()),
        ("OAUTH_ACCESS_TOKEN_EXPIRE_MINUTES", "30".to_string()),
        ("OAUTH_ADMIN_EMAILS", "boss@example.com".to_string()),
        ("OAUTH_ADMIN_DOMAINS", "company.com".to_string()),
        ("APP_NAME", "math-api-test".to_string()),
    ]);

    Settings::from_lookup(|name| vars.get(name).cloned()).expect("invalid test settings")
}

/// Codec sharing the test signing secret.
pub fn test_codec() -> TokenCodec {
    TokenCodec::from_settings(&test_settings().oauth)
}

/// Provider config for a real provider; no network calls are made with it.
pub fn default_provider() -> ProviderConfig {
    oauth_provider::provider_config("github").expect("github is registered")
}

/// Create a test app talking to `provider`.
pub async fn create_test_app(
    provider: ProviderConfig,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = ServiceResponse,
    Error = actix_web::Error,
> {
    let settings = test_settings();
    let authenticator = Authenticator::from_settings(&settings);
    let client = OAuthClient::new().expect("failed to build HTTP client");

    test::init_service(
        App::new()
            .app_data(web::Data::new(settings))
            .app_data(web::Data::new(authenticator))
            .app_data(web::Data::new(provider))
            .app_data(web::Data::new(client))
            .configure(api::configure_routes),
    )
    .await
}

/// GET `uri` with an optional `Authorization` header value.
pub async fn get_with_auth<S>(app: &S, uri: &str, authorization: Option<&str>) -> ServiceResponse
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let mut req = test::TestRequest::get().uri(uri);
    if let Some(value) = authorization {
        req = req.insert_header(("Authorization", value.to_string()));
    }
    test::call_service(app, req.to_request()).await
}

/// `Bearer <token>` header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Location header of a response, if any.
pub fn location(resp: &ServiceResponse) -> Option<String> {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}
