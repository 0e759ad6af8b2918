/// Bearer token validation middleware.
///
/// Extracts the access token from the Authorization header, validates it
/// and injects the request-scoped identity into request extensions for
/// downstream handlers and the role gate.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;
use uuid::Uuid;

use crate::auth::{validate_access_token, Claims};
use crate::configuration::AuthSettings;
use crate::domain::Role;
use crate::error::{AppError, AuthError};

/// Identity attached to every authenticated request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub account_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthenticatedUser {
    fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        Ok(Self {
            account_id: claims.account_id()?,
            email: claims.email.clone(),
            role: claims.role,
        })
    }
}

/// Missing header, a non-Bearer scheme and codec failures are distinct
/// failures, all answered with 401.
fn bearer_token(req: &ServiceRequest) -> Result<String, AppError> {
    let header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Authentication(AuthError::MissingAuthHeader))?;

    match header.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token.to_string()),
        _ => Err(AppError::Authentication(AuthError::MalformedAuthHeader)),
    }
}

pub struct AuthMiddleware {
    settings: AuthSettings,
}

impl AuthMiddleware {
    pub fn new(settings: AuthSettings) -> Self {
        Self { settings }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            settings: self.settings.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    settings: AuthSettings,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let validated = bearer_token(&req)
            .and_then(|token| validate_access_token(&token, &self.settings))
            .and_then(|claims| AuthenticatedUser::from_claims(&claims));

        match validated {
            Ok(user) => {
                tracing::debug!(account_id = %user.account_id, "access token validated");
                req.extensions_mut().insert(user);

                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Err(e) => Box::pin(async move { Err(e.into()) }),
        }
    }
}
