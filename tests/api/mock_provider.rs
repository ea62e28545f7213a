//! Mock OAuth provider for integration tests.
//!
//! Starts an in-process HTTP server with token, profile and email list
//! endpoints shaped like GitHub's.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, get, post, web};
use math_api_lib::services::ProviderConfig;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;

/// Authorization code the mock accepts.
pub const VALID_CODE: &str = "valid-code";
/// Access token the mock hands out for [`VALID_CODE`].
pub const PROVIDER_TOKEN: &str = "mock-provider-token";

/// What the mock returns.
#[derive(Clone)]
pub struct MockBehavior {
    /// Profile body for `/user`.
    pub profile: Value,
    /// Email list body for `/user/emails`.
    pub emails: Value,
    /// Leave `access_token` out of the token response.
    pub omit_access_token: bool,
}

impl MockBehavior {
    pub fn with_profile(profile: Value) -> Self {
        Self {
            profile,
            emails: json!([]),
            omit_access_token: false,
        }
    }

    pub fn with_emails(mut self, emails: Value) -> Self {
        self.emails = emails;
        self
    }

    pub fn without_access_token(mut self) -> Self {
        self.omit_access_token = true;
        self
    }
}

#[post("/token")]
async fn token_endpoint(
    form: web::Form<HashMap<String, String>>,
    behavior: web::Data<MockBehavior>,
) -> HttpResponse {
    if form.get("code").map(String::as_str) != Some(VALID_CODE)
        || form.get("grant_type").map(String::as_str) != Some("authorization_code")
    {
        return HttpResponse::BadRequest().json(json!({"error": "bad_verification_code"}));
    }

    if behavior.omit_access_token {
        return HttpResponse::Ok().json(json!({"error": "incorrect_client_credentials"}));
    }

    HttpResponse::Ok().json(json!({
        "access_token": PROVIDER_TOKEN,
        "token_type": "bearer",
        "scope": "user:email"
    }))
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", PROVIDER_TOKEN))
}

#[get("/user")]
async fn user_endpoint(req: HttpRequest, behavior: web::Data<MockBehavior>) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().json(json!({"message": "Bad credentials"}));
    }
    HttpResponse::Ok().json(&behavior.profile)
}

#[get("/user/emails")]
async fn emails_endpoint(req: HttpRequest, behavior: web::Data<MockBehavior>) -> HttpResponse {
    if !authorized(&req) {
        return HttpResponse::Unauthorized().json(json!({"message": "Bad credentials"}));
    }
    HttpResponse::Ok().json(&behavior.emails)
}

/// Running mock provider.
pub struct MockProvider {
    pub base_url: String,
}

impl MockProvider {
    /// Start the mock provider on an ephemeral port.
    pub async fn start(behavior: MockBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind");
        let port = listener.local_addr().unwrap().port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::new(behavior.clone()))
                .service(token_endpoint)
                .service(user_endpoint)
                .service(emails_endpoint)
        })
        .workers(1)
        .listen(listener)
        .expect("failed to listen")
        .disable_signals()
        .run();

        // Fire and forget; server lives for the process lifetime
        tokio::spawn(server);

        MockProvider { base_url }
    }

    /// Provider config with an email list endpoint, like GitHub.
    pub fn github_config(&self) -> ProviderConfig {
        ProviderConfig {
            name: "github".to_string(),
            authorization_url: format!("{}/authorize", self.base_url),
            token_url: format!("{}/token", self.base_url),
            userinfo_url: format!("{}/user", self.base_url),
            emails_url: Some(format!("{}/user/emails", self.base_url)),
            scope: "user:email read:user".to_string(),
        }
    }

    /// Provider config without an email list endpoint.
    pub fn microsoft_config(&self) -> ProviderConfig {
        ProviderConfig {
            name: "microsoft".to_string(),
            emails_url: None,
            scope: "openid email profile User.Read".to_string(),
            ..self.github_config()
        }
    }
}
