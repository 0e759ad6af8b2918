/// Authentication service: orchestrates signup, login, refresh, logout and
/// identity projection over the account and refresh token repositories.
use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::jwt::issue_access_token;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::refresh_token::generate_refresh_token;
use crate::configuration::AuthSettings;
use crate::domain::{Account, Role};
use crate::error::{AppError, AuthError};
use crate::repository::{
    AccountRepository, ProfileRepository, RefreshTokenCheck, RefreshTokenRepository,
};

/// One access token plus the opaque refresh value backing it.
/// `expires_in` is the access token lifetime in seconds.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Public-safe projection of an account.
#[derive(Debug, Clone, Serialize)]
pub struct AccountIdentity {
    pub id: String,
    pub email: String,
    pub role: Role,
}

pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    refresh_tokens: Arc<dyn RefreshTokenRepository>,
    profiles: Arc<dyn ProfileRepository>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        profiles: Arc<dyn ProfileRepository>,
        settings: AuthSettings,
    ) -> Self {
        Self {
            accounts,
            refresh_tokens,
            profiles,
            settings,
        }
    }

    /// Creates an account, provisions the role-specific profile stub and
    /// issues a token pair (signup implies login).
    ///
    /// Account creation and profile provisioning are two separate writes
    /// with no shared transaction. A provisioning failure is surfaced as a
    /// fatal signup error rather than silently leaving an orphaned account
    /// unreported.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<TokenPair, AppError> {
        if self.accounts.exists_by_email(email).await? {
            return Err(AppError::Conflict("account"));
        }

        let password_hash = hash_password(password)?;
        let account = Account::new(email.to_string(), password_hash, role);
        self.accounts.create(&account).await?;

        let provisioned = match account.role {
            Role::User => self.profiles.register_user_profile(account.id).await,
            Role::Vendor => self.profiles.register_vendor_profile(account.id).await,
        };
        if let Err(e) = provisioned {
            tracing::error!(
                account_id = %account.id,
                role = %account.role,
                error = %e,
                "profile provisioning failed after account creation"
            );
            return Err(AppError::internal_with_cause(
                "failed to initialize profile",
                e,
            ));
        }

        tracing::info!(account_id = %account.id, role = %account.role, "account created");
        self.issue_token_pair(&account).await
    }

    /// Unknown email and wrong password produce the same error so accounts
    /// cannot be enumerated.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, AppError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(AppError::Authentication(AuthError::InvalidCredentials))?;

        if !verify_password(password, &account.password_hash)? {
            return Err(AppError::Authentication(AuthError::InvalidCredentials));
        }

        tracing::info!(account_id = %account.id, "login succeeded");
        self.issue_token_pair(&account).await
    }

    /// Exchanges a live refresh token for a new access token. The refresh
    /// value itself is reused, not rotated: the response carries the
    /// identical incoming value until its fixed expiry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AppError> {
        if refresh_token.is_empty() {
            return Err(AppError::Authentication(AuthError::InvalidRefreshToken));
        }

        let token_key = self.settings.refresh_token_key(refresh_token);
        let owner = self
            .refresh_tokens
            .find_owner(&token_key)
            .await?
            .ok_or(AppError::Authentication(AuthError::InvalidRefreshToken))?;

        // The account is re-verified on every exchange: tokens issued for a
        // since-deleted account stop working here.
        let account = self
            .accounts
            .find_by_id(owner)
            .await?
            .ok_or(AppError::NotFound("account"))?;

        let access_token = issue_access_token(&account, &self.settings)?;

        Ok(TokenPair {
            access_token,
            refresh_token: refresh_token.to_string(),
            expires_in: self.settings.access_token_expiry,
        })
    }

    /// Advisory revocation of a single refresh token. The access token is
    /// about to be discarded client-side, so nothing here blocks logout:
    /// failures are logged as warnings and swallowed.
    pub async fn logout(&self, refresh_token: &str, account_id: Uuid) {
        if refresh_token.is_empty() {
            return;
        }

        let token_key = self.settings.refresh_token_key(refresh_token);
        match self.refresh_tokens.validate(&token_key, account_id).await {
            Ok(RefreshTokenCheck::Valid) => {
                if let Err(e) = self.refresh_tokens.delete(&token_key).await {
                    tracing::warn!(
                        account_id = %account_id,
                        error = %e,
                        "refresh token revocation failed"
                    );
                }
            }
            Ok(RefreshTokenCheck::OwnerMismatch) => {
                tracing::warn!(
                    account_id = %account_id,
                    "logout presented a refresh token owned by another account"
                );
            }
            Ok(RefreshTokenCheck::NotFoundOrExpired) => {
                tracing::debug!(account_id = %account_id, "no live refresh token to revoke");
            }
            Err(e) => {
                tracing::warn!(
                    account_id = %account_id,
                    error = %e,
                    "refresh token revocation lookup failed"
                );
            }
        }
    }

    /// Revokes every refresh token the account holds, logging the account
    /// out of all devices.
    pub async fn logout_all(&self, account_id: Uuid) -> Result<(), AppError> {
        self.refresh_tokens.delete_all(account_id).await?;
        tracing::info!(account_id = %account_id, "all refresh tokens revoked");
        Ok(())
    }

    pub async fn get_me(&self, account_id: Uuid) -> Result<AccountIdentity, AppError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AppError::NotFound("account"))?;

        Ok(AccountIdentity {
            id: account.id.to_string(),
            email: account.email,
            role: account.role,
        })
    }

    /// Shared issuance path for signup and login: one access token, one
    /// fresh opaque refresh value persisted under its namespaced key.
    async fn issue_token_pair(&self, account: &Account) -> Result<TokenPair, AppError> {
        let access_token = issue_access_token(account, &self.settings)?;
        let refresh_token = generate_refresh_token();

        let token_key = self.settings.refresh_token_key(&refresh_token);
        let expires_at = Utc::now() + Duration::seconds(self.settings.refresh_token_expiry);
        self.refresh_tokens
            .save(account.id, &token_key, expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in: self.settings.access_token_expiry,
        })
    }
}
