/// Unified error handling for the credential lifecycle subsystem.
///
/// The service layer returns typed sentinel errors; the transport boundary
/// maps each class to exactly one HTTP status with a generic, non-leaking
/// message. Internal causes are exposed in the response body only when
/// startup enables detailed errors for a non-production environment.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;
use std::sync::OnceLock;

/// Malformed-input errors, mapped to 400.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyField(&'static str),
    TooShort(&'static str, usize),
    TooLong(&'static str, usize),
    InvalidFormat(&'static str),
    SuspiciousContent(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
        }
    }
}

impl StdError for ValidationError {}

/// Credential and token failures, mapped to 401.
///
/// `InvalidCredentials` deliberately covers both "unknown email" and
/// "wrong password" so that the two are indistinguishable externally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    InvalidCredentials,
    InvalidRefreshToken,
    TokenExpired,
    InvalidSignature,
    MalformedToken,
    MissingAuthHeader,
    MalformedAuthHeader,
    AuthenticationRequired,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "invalid email or password"),
            AuthError::InvalidRefreshToken => write!(f, "invalid or expired refresh token"),
            AuthError::TokenExpired => write!(f, "token has expired"),
            AuthError::InvalidSignature => write!(f, "token signature is invalid"),
            AuthError::MalformedToken => write!(f, "token is malformed"),
            AuthError::MissingAuthHeader => write!(f, "missing authorization header"),
            AuthError::MalformedAuthHeader => write!(f, "invalid authorization format"),
            AuthError::AuthenticationRequired => write!(f, "authentication required"),
        }
    }
}

impl StdError for AuthError {}

/// Central application error type.
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Authentication(AuthError),
    /// Role gate rejection, mapped to 403.
    Authorization,
    /// Duplicate resource, mapped to 409.
    Conflict(&'static str),
    /// Unknown resource, mapped to 404.
    NotFound(&'static str),
    /// Storage or signing primitive failure, mapped to 500. Never retried:
    /// these indicate misconfiguration, not a transient fault.
    Internal {
        message: String,
        cause: Option<String>,
    },
}

impl AppError {
    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
            cause: None,
        }
    }

    pub fn internal_with_cause(message: impl Into<String>, cause: impl fmt::Display) -> Self {
        AppError::Internal {
            message: message.into(),
            cause: Some(cause.to_string()),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Authentication(e) => write!(f, "{}", e),
            AppError::Authorization => write!(f, "insufficient permissions"),
            AppError::Conflict(what) => write!(f, "{} already exists", what),
            AppError::NotFound(what) => write!(f, "{} not found", what),
            AppError::Internal { message, .. } => write!(f, "internal error: {}", message),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Authentication(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let error_msg = err.to_string();

        if error_msg.contains("duplicate key") || error_msg.contains("unique constraint") {
            AppError::Conflict("record")
        } else {
            AppError::internal_with_cause("database operation failed", error_msg)
        }
    }
}

/// JSON body for error responses. `details` carries the underlying cause
/// and is populated only when detailed errors are enabled at startup.
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Whether 500 bodies may carry the underlying cause. Startup sets this
/// once from the loaded settings; until then causes are withheld, so a
/// misconfigured or partially started process never leaks.
static DETAILED_ERRORS: OnceLock<bool> = OnceLock::new();

/// Called once at startup with the environment from the loaded settings.
/// Later calls are ignored.
pub fn set_detailed_errors(enabled: bool) {
    let _ = DETAILED_ERRORS.set(enabled);
}

fn detailed_errors() -> bool {
    DETAILED_ERRORS.get().copied().unwrap_or(false)
}

impl AppError {
    fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Authentication(_) => "UNAUTHORIZED",
            AppError::Authorization => "FORBIDDEN",
            AppError::Conflict(_) => "CONFLICT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message. Generic by class: never reveals whether an
    /// email exists or what a hashing primitive reported.
    fn public_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Authentication(AuthError::InvalidCredentials) => {
                "Invalid email or password".to_string()
            }
            AppError::Authentication(AuthError::InvalidRefreshToken) => {
                "Session expired, please login again".to_string()
            }
            AppError::Authentication(AuthError::MissingAuthHeader) => {
                "Missing authorization header".to_string()
            }
            AppError::Authentication(AuthError::MalformedAuthHeader) => {
                "Invalid authorization format".to_string()
            }
            AppError::Authentication(AuthError::AuthenticationRequired) => {
                "Authentication required".to_string()
            }
            AppError::Authentication(_) => "Invalid or expired token".to_string(),
            AppError::Authorization => "Insufficient permissions".to_string(),
            AppError::Conflict(_) => "Email already registered".to_string(),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::Internal { .. } => "Internal server error".to_string(),
        }
    }

    fn error_body(&self, detailed: bool) -> ErrorBody {
        let details = match self {
            AppError::Internal { cause, .. } if detailed => cause.clone(),
            _ => None,
        };

        ErrorBody {
            code: self.code(),
            message: self.public_message(),
            details,
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error = %e, "validation error");
            }
            AppError::Authentication(e) => {
                tracing::warn!(error = %e, "authentication error");
            }
            AppError::Authorization => {
                tracing::warn!("authorization error");
            }
            AppError::Conflict(what) => {
                tracing::warn!(resource = what, "duplicate entry attempt");
            }
            AppError::NotFound(what) => {
                tracing::warn!(resource = what, "resource not found");
            }
            AppError::Internal { message, cause } => {
                tracing::error!(error = %message, cause = ?cause, "internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();

        HttpResponse::build(self.status_code()).json(self.error_body(detailed_errors()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        let cases = [
            (
                AppError::Validation(ValidationError::EmptyField("email")),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::Authentication(AuthError::InvalidCredentials),
                StatusCode::UNAUTHORIZED,
            ),
            (AppError::Authorization, StatusCode::FORBIDDEN),
            (AppError::Conflict("account"), StatusCode::CONFLICT),
            (AppError::NotFound("account"), StatusCode::NOT_FOUND),
            (
                AppError::internal("signing failed"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.status_code(), status, "wrong status for {}", error);
        }
    }

    #[test]
    fn unknown_email_and_wrong_password_share_a_message() {
        let err = AppError::Authentication(AuthError::InvalidCredentials);
        assert_eq!(err.public_message(), "Invalid email or password");
    }

    #[test]
    fn internal_message_never_echoes_the_cause() {
        let err = AppError::internal_with_cause("hashing failed", "bcrypt: cost out of range");
        assert_eq!(err.public_message(), "Internal server error");
    }

    #[test]
    fn cause_is_withheld_unless_detailed_errors_are_enabled() {
        let err = AppError::internal_with_cause(
            "failed to create connection pool",
            "connection refused: postgres://app:s3cret@db:5432/market",
        );

        assert_eq!(err.error_body(false).details, None);
        assert_eq!(
            err.error_body(true).details.as_deref(),
            Some("connection refused: postgres://app:s3cret@db:5432/market")
        );
    }

    #[test]
    fn causes_stay_withheld_until_startup_enables_them() {
        // Nothing in this test binary calls set_detailed_errors.
        assert!(!detailed_errors());
    }

    #[test]
    fn duplicate_key_maps_to_conflict() {
        let err: AppError = sqlx::Error::Protocol(
            "duplicate key value violates unique constraint \"accounts_email_key\"".into(),
        )
        .into();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn validation_error_display() {
        let err = ValidationError::TooShort("password", 8);
        assert_eq!(err.to_string(), "password is too short (minimum 8 characters)");
    }
}
