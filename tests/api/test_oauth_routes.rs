//! OAuth endpoint tests against the mock provider.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use super::mock_provider::{MockBehavior, MockProvider, VALID_CODE};
use super::test_helpers::*;

const REDIRECT_URI: &str = "http://localhost:8000/static/index.html";

async fn post_json<S>(app: &S, uri: &str, body: Value) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

async fn exchange<S>(app: &S, code: &str) -> (StatusCode, Value)
where
    S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
{
    post_json(
        app,
        "/auth/oauth/token",
        json!({"code": code, "redirect_uri": REDIRECT_URI}),
    )
    .await
}

#[actix_rt::test]
async fn test_get_provider() {
    let app = create_test_app(default_provider()).await;
    let req = test::TestRequest::get()
        .uri("/auth/oauth/provider")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({"provider": "github"}));
}

#[actix_rt::test]
async fn test_authorization_url_carries_client_and_redirect() {
    let app = create_test_app(default_provider()).await;
    let (status, body) = post_json(
        &app,
        "/auth/oauth/authorize",
        json!({"redirect_uri": REDIRECT_URI}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let url = body["authorization_url"].as_str().unwrap();
    assert!(url.starts_with("https://github.com/login/oauth/authorize?"));
    assert!(url.contains(&format!("client_id={}", TEST_CLIENT_ID)));
    assert!(url.contains(&format!(
        "redirect_uri={}",
        urlencoding::encode(REDIRECT_URI)
    )));
    assert!(url.contains("scope="));
}

#[actix_rt::test]
async fn test_authorize_without_redirect_uri_is_bad_request() {
    let app = create_test_app(default_provider()).await;
    let (status, body) = post_json(&app, "/auth/oauth/authorize", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_INPUT");
}

#[actix_rt::test]
async fn test_token_exchange_issues_usable_token() {
    let mock = MockProvider::start(MockBehavior::with_profile(
        json!({"login": "dev", "email": "dev@company.com"}),
    ))
    .await;
    let app = create_test_app(mock.github_config()).await;

    let (status, body) = exchange(&app, VALID_CODE).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);
    assert_eq!(body["token_type"], "bearer");

    let token = body["access_token"].as_str().unwrap();
    let claims = test_codec().verify(token).unwrap();
    assert_eq!(claims.sub.as_deref(), Some("dev@company.com"));
    assert_eq!(claims.provider.as_deref(), Some("github"));
    assert_eq!(claims.roles, vec!["user", "admin"]);
    assert_eq!(claims.exp - claims.iat, 30 * 60);

    let resp = get_with_auth(&app, "/math/multiply?A=3&B=4", Some(&bearer(token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let result: Value = test::read_body_json(resp).await;
    assert_eq!(result["result"], 12.0);
}

#[actix_rt::test]
async fn test_admin_email_gets_admin_role() {
    let mock = MockProvider::start(MockBehavior::with_profile(
        json!({"email": "Boss@Example.com"}),
    ))
    .await;
    let app = create_test_app(mock.github_config()).await;

    let (status, body) = exchange(&app, VALID_CODE).await;
    assert_eq!(status, StatusCode::OK);

    let claims = test_codec()
        .verify(body["access_token"].as_str().unwrap())
        .unwrap();
    assert!(claims.roles.contains(&"admin".to_string()));
}

#[actix_rt::test]
async fn test_github_email_list_fallback() {
    let mock = MockProvider::start(
        MockBehavior::with_profile(json!({"login": "dev", "email": null})).with_emails(json!([
            {"email": "old@elsewhere.org", "primary": false, "verified": true},
            {"email": "unverified@elsewhere.org", "primary": true, "verified": false},
            {"email": "primary@elsewhere.org", "primary": true, "verified": true}
        ])),
    )
    .await;
    let app = create_test_app(mock.github_config()).await;

    let (status, body) = exchange(&app, VALID_CODE).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);

    let claims = test_codec()
        .verify(body["access_token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub.as_deref(), Some("primary@elsewhere.org"));
    assert_eq!(claims.roles, vec!["user"]);
}

#[actix_rt::test]
async fn test_github_without_verified_email_is_bad_request() {
    let mock = MockProvider::start(
        MockBehavior::with_profile(json!({"login": "dev"})).with_emails(json!([
            {"email": "unverified@elsewhere.org", "primary": true, "verified": false}
        ])),
    )
    .await;
    let app = create_test_app(mock.github_config()).await;

    let (status, body) = exchange(&app, VALID_CODE).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "EMAIL_MISSING");
}

#[actix_rt::test]
async fn test_mail_field_used_when_email_absent() {
    let mock = MockProvider::start(MockBehavior::with_profile(
        json!({"displayName": "Dev", "mail": "dev@company.com"}),
    ))
    .await;
    let app = create_test_app(mock.microsoft_config()).await;

    let (status, body) = exchange(&app, VALID_CODE).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);

    let claims = test_codec()
        .verify(body["access_token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.sub.as_deref(), Some("dev@company.com"));
    assert_eq!(claims.provider.as_deref(), Some("microsoft"));
}

#[actix_rt::test]
async fn test_profile_without_email_is_bad_request() {
    let mock =
        MockProvider::start(MockBehavior::with_profile(json!({"displayName": "Dev"}))).await;
    let app = create_test_app(mock.microsoft_config()).await;

    let (status, body) = exchange(&app, VALID_CODE).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "EMAIL_MISSING");
}

#[actix_rt::test]
async fn test_rejected_code_is_bad_request() {
    let mock = MockProvider::start(MockBehavior::with_profile(
        json!({"email": "dev@company.com"}),
    ))
    .await;
    let app = create_test_app(mock.github_config()).await;

    let (status, body) = exchange(&app, "expired-code").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "PROVIDER_EXCHANGE_FAILED");
    assert_eq!(body["message"], "Failed to exchange authorization code");
}

#[actix_rt::test]
async fn test_missing_provider_token_is_bad_request() {
    let mock = MockProvider::start(
        MockBehavior::with_profile(json!({"email": "dev@company.com"})).without_access_token(),
    )
    .await;
    let app = create_test_app(mock.github_config()).await;

    let (status, body) = exchange(&app, VALID_CODE).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "PROVIDER_EXCHANGE_FAILED");
    assert_eq!(body["message"], "No access token in response");
}

#[actix_rt::test]
async fn test_unreachable_provider_is_bad_request() {
    let mut provider = default_provider();
    provider.token_url = "http://127.0.0.1:9/token".to_string();
    let app = create_test_app(provider).await;

    let (status, body) = exchange(&app, VALID_CODE).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "PROVIDER_EXCHANGE_FAILED");
}
