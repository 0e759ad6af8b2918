/// Opaque refresh token values.
///
/// 64 alphanumeric characters from the thread-local CSPRNG, roughly 380
/// bits of entropy. URL-safe, never derived from account data, unlinkable
/// to an account without the store lookup.
use rand::distributions::Alphanumeric;
use rand::{thread_rng, Rng};

const REFRESH_TOKEN_LENGTH: usize = 64;

pub fn generate_refresh_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REFRESH_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_64_url_safe_characters() {
        let token = generate_refresh_token();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_do_not_repeat() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();

        assert_ne!(a, b);
    }
}
