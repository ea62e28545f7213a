//! Request and response bodies.

pub mod math;
pub mod oauth;

pub use math::{MathResult, OperandsQuery};
pub use oauth::{
    AuthorizationRequest, AuthorizationResponse, ProviderResponse, TokenRequest, TokenResponse,
};
