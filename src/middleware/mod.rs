//! HTTP middleware.

pub mod request_logger;

use actix_cors::Cors;

pub use request_logger::RequestLogger;

/// Build the CORS layer from the configured origins.
///
/// `*` allows any origin. Methods and headers are always unrestricted.
pub fn build_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .max_age(3600);

    if allowed_origins.iter().any(|origin| origin == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in allowed_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}
