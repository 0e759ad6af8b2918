/// Credential lifecycle: access token codec, password hashing, refresh
/// token values and the authentication service orchestrating them.
mod claims;
mod jwt;
mod password;
mod refresh_token;
mod service;

pub use claims::Claims;
pub use jwt::{issue_access_token, validate_access_token};
pub use password::{hash_password, verify_password};
pub use refresh_token::generate_refresh_token;
pub use service::{AccountIdentity, AuthService, TokenPair};
