//! OpenAPI documentation configuration.

use actix_web::{HttpResponse, get, web};
use utoipa::OpenApi;

use crate::config::Settings;
use crate::{api, error, models, services};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Math API",
        version = "1.0",
        description = "Arithmetic API secured by API keys and OAuth"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        api::health::health,
        api::oauth::get_provider,
        api::oauth::get_authorization_url,
        api::oauth::exchange_code_for_token,
        api::math::add,
        api::math::subtract,
        api::math::multiply,
        api::math::divide,
    ),
    components(
        schemas(
            error::ErrorResponse,
            api::health::HealthResponse,
            models::ProviderResponse,
            models::AuthorizationRequest,
            models::AuthorizationResponse,
            models::TokenRequest,
            models::TokenResponse,
            models::MathResult,
            services::MathOperation,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "OAuth", description = "OAuth login and token issuance"),
        (name = "Math", description = "Arithmetic operations (admin or user role)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add bearer security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some("API key or access token from /auth/oauth/token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI document with the configured app name and description.
#[get("/api-docs/openapi.json")]
pub async fn openapi_json(settings: web::Data<Settings>) -> HttpResponse {
    let mut doc = ApiDoc::openapi();
    doc.info.title = settings.app_name.clone();
    doc.info.description = Some(settings.description.clone());
    HttpResponse::Ok().json(doc)
}

/// Configure documentation routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(openapi_json);
}
