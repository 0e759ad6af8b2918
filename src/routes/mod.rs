mod auth;
mod health_check;

pub use auth::{login, logout, logout_all, me, refresh, signup};
pub use health_check::health_check;
