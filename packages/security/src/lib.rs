// ABOUTME: Credentials, verification tokens and user persistence for ProfileHub
// ABOUTME: Argon2id password hashing, one-shot email tokens and the SQLite user store

pub mod password;
pub mod token;
pub mod users;

// Re-export main types for convenience
pub use password::{hash_password, verify_password, PasswordError};
pub use token::{generate_verification_token, tokens_match};
pub use users::UserStorage;
