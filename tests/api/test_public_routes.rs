//! Routes reachable without credentials.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use super::test_helpers::*;

#[actix_rt::test]
async fn test_root_redirects_to_landing_page() {
    let app = create_test_app(default_provider()).await;
    let resp = get_with_auth(&app, "/", None).await;

    assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&resp).as_deref(), Some("/static/index.html"));
}

#[actix_rt::test]
async fn test_health() {
    let app = create_test_app(default_provider()).await;
    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
    assert!(body["timestamp"].is_string());
}

#[actix_rt::test]
async fn test_openapi_document_lists_routes() {
    let app = create_test_app(default_provider()).await;
    let req = test::TestRequest::get()
        .uri("/api-docs/openapi.json")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["info"]["title"], "math-api-test");
    for path in [
        "/math/add",
        "/math/subtract",
        "/math/multiply",
        "/math/divide",
        "/auth/oauth/provider",
        "/auth/oauth/authorize",
        "/auth/oauth/token",
    ] {
        assert!(body["paths"][path].is_object(), "missing path {}", path);
    }
    assert!(body["components"]["securitySchemes"]["bearer"].is_object());
}
