// ABOUTME: One-shot verification tokens
// ABOUTME: Random generation and constant-time comparison

use rand::distributions::Alphanumeric;
use rand::Rng;
use subtle::ConstantTimeEq;

/// Length of generated verification tokens
pub const VERIFICATION_TOKEN_LENGTH: usize = 32;

/// Generate a URL-safe alphanumeric verification token
pub fn generate_verification_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(VERIFICATION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Compare two tokens without leaking the mismatch position through timing
pub fn tokens_match(expected: &str, provided: &str) -> bool {
    expected.as_bytes().ct_eq(provided.as_bytes()).into()
}
