mod account;

pub use account::{Account, Role};
