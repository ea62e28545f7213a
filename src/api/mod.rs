//! API endpoint modules.

pub mod health;
pub mod landing;
pub mod math;
pub mod oauth;
pub mod openapi;

use actix_web::web;

use crate::error::AppError;

pub use openapi::ApiDoc;

/// Register every route plus extractor configuration.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(query_config())
        .app_data(json_config())
        .configure(landing::configure_routes)
        .configure(health::configure_routes)
        .configure(openapi::configure_routes)
        .configure(oauth::configure_routes)
        .configure(math::configure_routes);
}

/// Malformed query strings become 400 `INVALID_INPUT` responses.
fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}

/// Malformed JSON bodies become 400 `INVALID_INPUT` responses.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::InvalidInput(err.to_string()).into())
}
