//! Actix-web extractor for the authenticated caller.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use std::future::{Ready, ready};
use std::ops::Deref;

use super::Identity;
use crate::error::{AppError, AuthError};

/// Identity attached by [`RequireAuth`](super::RequireAuth).
///
/// Only usable inside a scope wrapped by `RequireAuth`:
/// ```ignore
/// async fn handler(caller: CurrentIdentity) -> impl Responder {
///     // caller.subject, caller.roles
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

impl Deref for CurrentIdentity {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for CurrentIdentity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = req
            .extensions()
            .get::<Identity>()
            .cloned()
            .map(CurrentIdentity)
            .ok_or(AppError::Auth(AuthError::NoCredentials));
        ready(result)
    }
}
