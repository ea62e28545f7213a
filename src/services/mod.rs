//! Business logic services.

pub mod math;
pub mod oauth_provider;
pub mod roles;

pub use math::MathOperation;
pub use oauth_provider::{OAuthClient, ProviderConfig};
