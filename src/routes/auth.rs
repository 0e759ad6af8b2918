/// Auth handlers.
///
/// The access token travels in the JSON body; the opaque refresh token
/// only ever travels in a secure, http-only, same-site-strict cookie.
use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthService, TokenPair};
use crate::configuration::AuthSettings;
use crate::domain::Role;
use crate::error::{AppError, AuthError};
use crate::middleware::AuthenticatedUser;
use crate::validators::{is_valid_email, validate_password};

pub const REFRESH_COOKIE: &str = "refresh_token";

#[derive(Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthResponse {
    fn from_pair(tokens: &TokenPair) -> Self {
        Self {
            access_token: tokens.access_token.clone(),
            token_type: "Bearer".to_string(),
            expires_in: tokens.expires_in,
        }
    }
}

fn refresh_cookie(value: &str, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(REFRESH_COOKIE, value.to_string())
        .path("/")
        .secure(true)
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(max_age_seconds))
        .finish()
}

fn clear_refresh_cookie() -> Cookie<'static> {
    refresh_cookie("", 0)
}

/// POST /auth/signup
///
/// Registers an account and logs it in: 201 with an access token and a
/// fresh refresh cookie. 409 when the email is already registered.
pub async fn signup(
    form: web::Json<SignupRequest>,
    service: web::Data<AuthService>,
    settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;
    validate_password(&form.password)?;

    let tokens = service.signup(&email, &form.password, form.role).await?;

    Ok(HttpResponse::Created()
        .cookie(refresh_cookie(
            &tokens.refresh_token,
            settings.refresh_token_expiry,
        ))
        .json(AuthResponse::from_pair(&tokens)))
}

/// POST /auth/login
///
/// 401 for unknown email and wrong password alike.
pub async fn login(
    form: web::Json<LoginRequest>,
    service: web::Data<AuthService>,
    settings: web::Data<AuthSettings>,
) -> Result<HttpResponse, AppError> {
    let email = is_valid_email(&form.email)?;

    let tokens = service.login(&email, &form.password).await?;

    Ok(HttpResponse::Ok()
        .cookie(refresh_cookie(
            &tokens.refresh_token,
            settings.refresh_token_expiry,
        ))
        .json(AuthResponse::from_pair(&tokens)))
}

/// POST /auth/refresh
///
/// Exchanges the refresh cookie for a new access token. The cookie keeps
/// its value: refresh tokens are not rotated.
pub async fn refresh(
    req: HttpRequest,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let cookie = req
        .cookie(REFRESH_COOKIE)
        .ok_or(AppError::Authentication(AuthError::InvalidRefreshToken))?;

    let tokens = service.refresh(cookie.value()).await?;

    Ok(HttpResponse::Ok().json(AuthResponse::from_pair(&tokens)))
}

/// POST /auth/logout
///
/// Revocation is advisory: always 200, and the cookie is cleared with an
/// immediately expiring max-age.
pub async fn logout(
    req: HttpRequest,
    user: web::ReqData<AuthenticatedUser>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let refresh_token = req
        .cookie(REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .unwrap_or_default();

    service.logout(&refresh_token, user.account_id).await;

    Ok(HttpResponse::Ok()
        .cookie(clear_refresh_cookie())
        .json(serde_json::json!({ "message": "logged out" })))
}

/// POST /auth/logout-all
///
/// Revokes every device's refresh token for the authenticated account.
pub async fn logout_all(
    user: web::ReqData<AuthenticatedUser>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    service.logout_all(user.account_id).await?;

    Ok(HttpResponse::Ok()
        .cookie(clear_refresh_cookie())
        .json(serde_json::json!({ "message": "logged out everywhere" })))
}

/// GET /auth/me
pub async fn me(
    user: web::ReqData<AuthenticatedUser>,
    service: web::Data<AuthService>,
) -> Result<HttpResponse, AppError> {
    let identity = service.get_me(user.account_id).await?;

    Ok(HttpResponse::Ok().json(identity))
}
