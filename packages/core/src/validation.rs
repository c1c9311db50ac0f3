// ABOUTME: Field validators for user input
// ABOUTME: URL, password strength, email syntax and nickname shape checks

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use validator::ValidateEmail;

use crate::constants::{
    NICKNAME_MIN_LENGTH, NICKNAME_PATTERN, PASSWORD_MIN_LENGTH, PASSWORD_SPECIAL_CHARACTERS,
    URL_PATTERN,
};

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(URL_PATTERN).expect("URL pattern is a valid regex"));

static NICKNAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(NICKNAME_PATTERN).expect("nickname pattern is a valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("Password does not meet strength requirements: {}", .0.join("; "))]
    WeakPassword(Vec<String>),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    #[error("Nickname must be at least {min} characters long")]
    NicknameTooShort { min: usize },

    #[error("Nickname may only contain letters, digits, underscores and hyphens: {0}")]
    InvalidNickname(String),

    #[error("At least one field must be provided for update")]
    EmptyUpdate,

    #[error("Malformed request body: {0}")]
    Malformed(String),

    #[error("{field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<ValidationError>,
    },
}

impl ValidationError {
    /// Attach the name of the offending field
    pub fn for_field(self, field: &'static str) -> Self {
        ValidationError::Field {
            field,
            source: Box::new(self),
        }
    }

    /// Name of the offending field, when known
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::Field { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Validate an optional profile URL. Absent values pass through untouched.
pub fn validate_url(value: Option<&str>) -> Result<Option<&str>, ValidationError> {
    match value {
        None => Ok(None),
        Some(url) if URL_REGEX.is_match(url) => Ok(Some(url)),
        Some(url) => Err(ValidationError::InvalidUrl(url.to_string())),
    }
}

/// Check a candidate password against the strength policy.
///
/// Every violated rule is reported, in a stable order, so the caller can show
/// the complete list to the user at once.
pub fn validate_password_strength(value: &str) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    if value.chars().count() < PASSWORD_MIN_LENGTH {
        problems.push(format!(
            "Password must be at least {} characters long",
            PASSWORD_MIN_LENGTH
        ));
    }
    if !value.chars().any(|c| c.is_ascii_uppercase()) {
        problems.push("Password must include at least one uppercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_lowercase()) {
        problems.push("Password must include at least one lowercase letter".to_string());
    }
    if !value.chars().any(|c| c.is_ascii_digit()) {
        problems.push("Password must include at least one number".to_string());
    }
    if !value.chars().any(|c| PASSWORD_SPECIAL_CHARACTERS.contains(c)) {
        problems.push("Password must include at least one special character".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::WeakPassword(problems))
    }
}

/// Syntax-only email check. Never errors and never touches the network.
pub fn validate_email_address(value: &str) -> bool {
    value.validate_email()
}

/// Like [`validate_email_address`] but returns a typed error for view validation
pub fn require_email(value: &str) -> Result<(), ValidationError> {
    if validate_email_address(value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidEmail(value.to_string()))
    }
}

/// Validate an optional nickname: minimum length and allowed character set
pub fn validate_nickname(value: Option<&str>) -> Result<Option<&str>, ValidationError> {
    let Some(nickname) = value else {
        return Ok(None);
    };

    if nickname.chars().count() < NICKNAME_MIN_LENGTH {
        return Err(ValidationError::NicknameTooShort {
            min: NICKNAME_MIN_LENGTH,
        });
    }

    if !NICKNAME_REGEX.is_match(nickname) {
        return Err(ValidationError::InvalidNickname(nickname.to_string()));
    }

    Ok(Some(nickname))
}
