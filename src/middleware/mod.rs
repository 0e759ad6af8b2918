mod auth;
mod request_logging;
mod role;

pub use auth::{AuthMiddleware, AuthenticatedUser};
pub use request_logging::RequestLogger;
pub use role::RoleGuard;
