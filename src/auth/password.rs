/// Password hashing and verification.
///
/// bcrypt with per-hash salts; the digest comparison inside `verify` is
/// constant time. Hashing failure is fatal to the calling operation, while
/// a verification mismatch is a normal negative result that callers map to
/// a generic invalid-credentials response.
use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::AppError;

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal_with_cause("password hashing failed", e))
}

pub fn verify_password(password: &str, digest: &str) -> Result<bool, AppError> {
    verify(password, digest)
        .map_err(|e| AppError::internal_with_cause("password verification failed", e))
}
