use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Role;
use crate::error::AppError;

/// Access token payload: registered JWT claims (RFC 7519) plus the identity
/// the authorization middleware injects downstream.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account id as UUID string)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    pub iss: String,
}

impl Claims {
    pub fn new(
        account_id: Uuid,
        email: String,
        role: Role,
        expiry_seconds: i64,
        issuer: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: account_id.to_string(),
            email,
            role,
            exp: now + expiry_seconds,
            iat: now,
            nbf: now,
            iss: issuer,
        }
    }

    /// Extracts the account id. A non-UUID subject means the token was not
    /// minted by this service.
    pub fn account_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub)
            .map_err(|_| AppError::internal("invalid account id in token subject"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_carry_identity_and_lifetime() {
        let account_id = Uuid::new_v4();
        let claims = Claims::new(
            account_id,
            "vendor@example.com".to_string(),
            Role::Vendor,
            900,
            "market-api".to_string(),
        );

        assert_eq!(claims.sub, account_id.to_string());
        assert_eq!(claims.email, "vendor@example.com");
        assert_eq!(claims.role, Role::Vendor);
        assert_eq!(claims.iss, "market-api");
        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(claims.nbf, claims.iat);
    }

    #[test]
    fn account_id_extraction() {
        let account_id = Uuid::new_v4();
        let claims = Claims::new(
            account_id,
            "a@example.com".to_string(),
            Role::User,
            900,
            "market-api".to_string(),
        );

        assert_eq!(claims.account_id().unwrap(), account_id);
    }

    #[test]
    fn rejects_non_uuid_subject() {
        let mut claims = Claims::new(
            Uuid::new_v4(),
            "a@example.com".to_string(),
            Role::User,
            900,
            "market-api".to_string(),
        );
        claims.sub = "not-a-uuid".to_string();

        assert!(claims.account_id().is_err());
    }
}
