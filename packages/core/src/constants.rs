// ABOUTME: Field limits and patterns shared by every user view
// ABOUTME: Centralised so validators, storage and API agree on the same rules

/// Minimum accepted nickname length (in characters)
pub const NICKNAME_MIN_LENGTH: usize = 3;

/// Minimum accepted password length (in characters)
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Punctuation characters that satisfy the "special character" password rule
pub const PASSWORD_SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

/// HTTP(S) URL shape accepted for profile links
pub const URL_PATTERN: &str = r"^https?://[^\s/$.?#].[^\s]*$";

/// Word characters and hyphens only
pub const NICKNAME_PATTERN: &str = r"^[\w-]+$";
