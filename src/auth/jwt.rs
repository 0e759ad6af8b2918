/// Access token codec.
///
/// Tokens are self-contained HS256 JWTs; validity is proven entirely by
/// signature and embedded expiry, the server holds no access token state.
/// Expiry is strict (no clock skew leeway) and a token declaring any other
/// signing algorithm is rejected.
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::AuthSettings;
use crate::domain::Account;
use crate::error::{AppError, AuthError};

pub fn issue_access_token(account: &Account, settings: &AuthSettings) -> Result<String, AppError> {
    let claims = Claims::new(
        account.id,
        account.email.clone(),
        account.role,
        settings.access_token_expiry,
        settings.issuer.clone(),
    );

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_with_cause("access token signing failed", e))
}

pub fn validate_access_token(token: &str, settings: &AuthSettings) -> Result<Claims, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_nbf = true;
    validation.set_issuer(&[&settings.issuer]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        let reason = match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature
            | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
            _ => AuthError::MalformedToken,
        };
        tracing::warn!(error = %e, "access token validation failed");
        AppError::Authentication(reason)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use uuid::Uuid;

    fn test_settings() -> AuthSettings {
        AuthSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "market-api".to_string(),
            refresh_token_key_prefix: "rt_".to_string(),
        }
    }

    fn test_account(role: Role) -> Account {
        Account::new("test@example.com".to_string(), "hash".to_string(), role)
    }

    #[test]
    fn round_trips_claims_within_ttl() {
        let settings = test_settings();
        let account = test_account(Role::Vendor);

        let token = issue_access_token(&account, &settings).expect("failed to issue token");
        let claims = validate_access_token(&token, &settings).expect("failed to validate token");

        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.email, account.email);
        assert_eq!(claims.role, Role::Vendor);
        assert_eq!(claims.iss, "market-api");
    }

    #[test]
    fn rejects_expired_token() {
        let mut settings = test_settings();
        settings.access_token_expiry = -60;
        let account = test_account(Role::User);

        let token = issue_access_token(&account, &settings).expect("failed to issue token");
        let err = validate_access_token(&token, &settings).unwrap_err();

        assert!(matches!(
            err,
            AppError::Authentication(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn token_signed_with_secret_a_never_validates_under_secret_b() {
        let settings = test_settings();
        let account = test_account(Role::User);

        let token = issue_access_token(&account, &settings).expect("failed to issue token");

        let mut other = test_settings();
        other.secret = "a-completely-different-signing-secret!!".to_string();
        let err = validate_access_token(&token, &other).unwrap_err();

        assert!(matches!(
            err,
            AppError::Authentication(AuthError::InvalidSignature)
        ));
    }

    #[test]
    fn rejects_token_declaring_a_different_algorithm() {
        let settings = test_settings();
        let account = test_account(Role::User);
        let claims = Claims::new(
            account.id,
            account.email.clone(),
            account.role,
            settings.access_token_expiry,
            settings.issuer.clone(),
        );

        // Signed with the right secret but declaring HS384.
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(settings.secret.as_bytes()),
        )
        .expect("failed to issue token");

        assert!(validate_access_token(&token, &settings).is_err());
    }

    #[test]
    fn rejects_garbage_as_malformed() {
        let settings = test_settings();
        let err = validate_access_token("not.a.token", &settings).unwrap_err();

        assert!(matches!(
            err,
            AppError::Authentication(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn rejects_tampered_token() {
        let settings = test_settings();
        let account = test_account(Role::User);

        let token = issue_access_token(&account, &settings).expect("failed to issue token");
        let tampered = format!("{}x", token);

        assert!(validate_access_token(&tampered, &settings).is_err());
    }

    #[test]
    fn rejects_wrong_issuer() {
        let settings = test_settings();
        let account = test_account(Role::User);

        let token = issue_access_token(&account, &settings).expect("failed to issue token");

        let mut other = test_settings();
        other.issuer = "someone-else".to_string();

        assert!(validate_access_token(&token, &other).is_err());
    }

    #[test]
    fn expiry_matches_configured_ttl() {
        let settings = test_settings();
        let account = test_account(Role::User);

        let token = issue_access_token(&account, &settings).expect("failed to issue token");
        let claims = validate_access_token(&token, &settings).expect("failed to validate token");

        assert_eq!(claims.exp - claims.iat, 900);
    }
}
