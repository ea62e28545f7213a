//! Middleware that authenticates every request in a scope.

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{Error, HttpMessage, web};
use futures_util::future::LocalBoxFuture;
use std::future::{Ready, ready};
use std::rc::Rc;

use super::Authenticator;
use crate::error::AppError;

/// Require a bearer credential holding one of the given roles.
///
/// Reads the shared [`Authenticator`] from app data and stores the resolved
/// [`Identity`](super::Identity) in request extensions for handlers.
pub struct RequireAuth {
    allowed_roles: Rc<[String]>,
}

impl RequireAuth {
    pub fn roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Accept any authenticated caller.
    pub fn any() -> Self {
        Self::roles(Vec::<String>::new())
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireAuthMiddleware {
            service,
            allowed_roles: self.allowed_roles.clone(),
        }))
    }
}

/// Authentication middleware service.
pub struct RequireAuthMiddleware<S> {
    service: S,
    allowed_roles: Rc<[String]>,
}

impl<S, B> Service<ServiceRequest> for RequireAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let Some(authenticator) = req.app_data::<web::Data<Authenticator>>().cloned() else {
            let res = req.error_response(AppError::Internal(
                "Authenticator not configured".to_string(),
            ));
            return Box::pin(async move { Ok(res.map_into_right_body()) });
        };

        let authorization = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        match authenticator.authenticate(authorization, &self.allowed_roles) {
            Ok(identity) => {
                req.extensions_mut().insert(identity);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(e) => {
                // Rendered here so RequestLogger records the real status
                let res = req.error_response(AppError::from(e));
                Box::pin(async move { Ok(res.map_into_right_body()) })
            }
        }
    }
}
