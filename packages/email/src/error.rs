// ABOUTME: Error type for email rendering and delivery
// ABOUTME: Covers recipients, templates and mail API failures

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Unknown email type: {0}")]
    UnknownTemplate(String),

    #[error("Missing template field: {0}")]
    MissingField(&'static str),

    #[error("Template error: {0}")]
    Template(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Mail API returned {status}: {body}")]
    Api { status: u16, body: String },
}

impl From<minijinja::Error> for EmailError {
    fn from(error: minijinja::Error) -> Self {
        EmailError::Template(error.to_string())
    }
}

pub type EmailResult<T> = Result<T, EmailError>;
