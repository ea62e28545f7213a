//! Domain error types and their HTTP mapping.
//!
//! Uses thiserror for ergonomic error handling with automatic Display implementations.
//! `AppError::status_code` is the single table from error kind to HTTP status.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Where credential failures send the client.
pub const LOGIN_REDIRECT: &str = "/static/";

/// Credential resolution failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No Authorization header, or an empty credential
    #[error("Authentication required")]
    NoCredentials,

    /// Authorization scheme other than Bearer
    #[error("Authentication required")]
    BadScheme,

    /// Neither an API key nor a valid access token
    #[error("Invalid authentication credentials")]
    InvalidCredentials,

    /// Caller resolved but holds none of the allowed roles
    #[error("User does not have required role")]
    Forbidden,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,
}

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Authorization code exchange with the provider failed
    #[error("{0}")]
    ProviderExchange(String),

    /// Provider profile lookup failed
    #[error("{0}")]
    ProviderUserInfo(String),

    #[error("Email not found in user info")]
    EmailMissing,

    #[error("Cannot divide by zero")]
    DivideByZero,

    #[error("Unsupported OAuth provider: {0}")]
    UnsupportedProvider(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Machine-readable error code for the response body.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Auth(AuthError::Forbidden) => "FORBIDDEN",
            AppError::Auth(_) => "AUTHENTICATION_REQUIRED",
            AppError::ProviderExchange(_) => "PROVIDER_EXCHANGE_FAILED",
            AppError::ProviderUserInfo(_) => "PROVIDER_USERINFO_FAILED",
            AppError::EmailMissing => "EMAIL_MISSING",
            AppError::DivideByZero => "DIVIDE_BY_ZERO",
            AppError::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the response redirects the client to the login page.
    pub fn is_login_redirect(&self) -> bool {
        self.status_code() == StatusCode::TEMPORARY_REDIRECT
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // Every credential failure except a role mismatch looks the same to the client.
            AppError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::TEMPORARY_REDIRECT,
            AppError::ProviderExchange(_)
            | AppError::ProviderUserInfo(_)
            | AppError::EmailMissing
            | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::DivideByZero => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UnsupportedProvider(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        };

        let mut response = HttpResponse::build(self.status_code());
        if self.is_login_redirect() {
            response.insert_header((header::LOCATION, LOGIN_REDIRECT));
        }
        response.json(ErrorResponse {
            error: self.error_code().to_string(),
            message,
        })
    }
}

/// Error response body.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
