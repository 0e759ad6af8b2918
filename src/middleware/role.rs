/// Role gate middleware.
///
/// Checks the identity attached by `AuthMiddleware` against a
/// caller-declared allow-list. A missing identity means the gate was wired
/// without the validator in front of it and is answered with 401; a role
/// outside the allow-list with 403.
use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use super::auth::AuthenticatedUser;
use crate::domain::Role;
use crate::error::{AppError, AuthError};

pub struct RoleGuard {
    allowed: Rc<Vec<Role>>,
}

impl RoleGuard {
    pub fn allow(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            allowed: Rc::new(roles.into_iter().collect()),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RoleGuardService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(RoleGuardService {
            service: Rc::new(service),
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct RoleGuardService<S> {
    service: Rc<S>,
    allowed: Rc<Vec<Role>>,
}

impl<S, B> Service<ServiceRequest> for RoleGuardService<S>
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
        let user = req.extensions().get::<AuthenticatedUser>().cloned();

        match user {
            None => Box::pin(async move {
                Err(AppError::Authentication(AuthError::AuthenticationRequired).into())
            }),
            Some(user) if self.allowed.contains(&user.role) => {
                let service = self.service.clone();
                Box::pin(async move { service.call(req).await })
            }
            Some(user) => {
                tracing::warn!(
                    account_id = %user.account_id,
                    role = %user.role,
                    path = %req.path(),
                    "role gate rejected request"
                );
                Box::pin(async move { Err(AppError::Authorization.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::issue_access_token;
    use crate::configuration::AuthSettings;
    use crate::domain::Account;
    use crate::middleware::AuthMiddleware;
    use actix_web::http::StatusCode;
    use actix_web::{test, web, App, HttpResponse};

    fn test_settings() -> AuthSettings {
        AuthSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "market-api".to_string(),
            refresh_token_key_prefix: "rt_".to_string(),
        }
    }

    async fn handler() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    fn token_for(role: Role) -> String {
        let account = Account::new("a@example.com".to_string(), "hash".to_string(), role);
        issue_access_token(&account, &test_settings()).unwrap()
    }

    async fn gate_status(allowed: Vec<Role>, token: Option<String>) -> StatusCode {
        // Outermost middleware registers last: validator runs before the gate.
        let app = test::init_service(
            App::new().service(
                web::scope("/gated")
                    .wrap(RoleGuard::allow(allowed))
                    .wrap(AuthMiddleware::new(test_settings()))
                    .route("/probe", web::get().to(handler)),
            ),
        )
        .await;

        let mut req = test::TestRequest::get().uri("/gated/probe");
        if let Some(token) = token {
            req = req.insert_header(("Authorization", format!("Bearer {}", token)));
        }

        match test::try_call_service(&app, req.to_request()).await {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        }
    }

    #[actix_web::test]
    async fn user_is_rejected_on_vendor_only_endpoint() {
        let status = gate_status(vec![Role::Vendor], Some(token_for(Role::User))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn vendor_passes_vendor_only_endpoint() {
        let status = gate_status(vec![Role::Vendor], Some(token_for(Role::Vendor))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn user_passes_when_both_roles_are_allowed() {
        let status = gate_status(
            vec![Role::User, Role::Vendor],
            Some(token_for(Role::User)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[actix_web::test]
    async fn unauthenticated_request_never_reaches_the_gate() {
        let status = gate_status(vec![Role::Vendor], None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn gate_without_validator_requires_authentication() {
        let app = test::init_service(
            App::new().service(
                web::scope("/gated")
                    .wrap(RoleGuard::allow([Role::Vendor]))
                    .route("/probe", web::get().to(handler)),
            ),
        )
        .await;

        let req = test::TestRequest::get().uri("/gated/probe").to_request();
        let status = match test::try_call_service(&app, req).await {
            Ok(resp) => resp.status(),
            Err(e) => e.as_response_error().status_code(),
        };
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
