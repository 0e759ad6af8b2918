use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::AppError;

/// Marketplace account role. The wire representation is lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Vendor => "vendor",
        }
    }

    /// Parses the stored text representation. An unknown value indicates a
    /// corrupted row, not bad client input.
    pub fn parse(value: &str) -> Result<Role, AppError> {
        match value {
            "user" => Ok(Role::User),
            "vendor" => Ok(Role::Vendor),
            other => Err(AppError::internal_with_cause(
                "unknown account role in storage",
                other,
            )),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account identity record. Created once at signup and never hard-deleted
/// by this subsystem; the serialized form omits the password hash.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(email: String, password_hash: String, role: Role) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role,
            is_verified: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_account_starts_unverified() {
        let account = Account::new(
            "a@example.com".to_string(),
            "$2b$12$hash".to_string(),
            Role::User,
        );

        assert!(!account.is_verified);
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn role_round_trips_through_storage_text() {
        assert_eq!(Role::parse("user").unwrap(), Role::User);
        assert_eq!(Role::parse("vendor").unwrap(), Role::Vendor);
        assert_eq!(Role::Vendor.as_str(), "vendor");
        assert!(Role::parse("admin").is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Vendor).unwrap(), "\"vendor\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"user\"").unwrap(),
            Role::User
        );
        assert!(serde_json::from_str::<Role>("\"admin\"").is_err());
    }
}
