/// Storage contracts for the credential lifecycle subsystem.
///
/// The service layer depends on these traits only; `Pg*` implementations
/// go through sqlx, and tests substitute in-memory fakes. Every lookup is a
/// fresh storage round-trip so revocation takes effect within the same
/// process lifetime.
mod account;
mod profile;
mod refresh_token;

pub use account::PgAccountRepository;
pub use profile::PgProfileRepository;
pub use refresh_token::PgRefreshTokenRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Account;
use crate::error::AppError;

/// Outcome of a refresh token ownership check. The owner-mismatch case is
/// kept distinct from not-found for audit logging; clients only ever see a
/// generic invalid-token response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenCheck {
    Valid,
    NotFoundOrExpired,
    OwnerMismatch,
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn create(&self, account: &Account) -> Result<(), AppError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AppError>;
    async fn exists_by_email(&self, email: &str) -> Result<bool, AppError>;
    /// Seam for the email verification flow. Currently unused.
    async fn mark_verified(&self, id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Inserts a new record. A duplicate key is an error; with 64 random
    /// alphanumeric characters per token it is statistically unreachable.
    async fn save(
        &self,
        account_id: Uuid,
        token_key: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Resolves a live (unexpired) record to its owning account.
    async fn find_owner(&self, token_key: &str) -> Result<Option<Uuid>, AppError>;

    /// Checks existence, non-expiry and ownership in one read.
    async fn validate(
        &self,
        token_key: &str,
        account_id: Uuid,
    ) -> Result<RefreshTokenCheck, AppError>;

    /// Idempotent single revoke.
    async fn delete(&self, token_key: &str) -> Result<(), AppError>;

    /// Revokes every record the account holds (all devices).
    async fn delete_all(&self, account_id: Uuid) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn register_user_profile(&self, account_id: Uuid) -> Result<(), AppError>;
    async fn register_vendor_profile(&self, account_id: Uuid) -> Result<(), AppError>;
}
