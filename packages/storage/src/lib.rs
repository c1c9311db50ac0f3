// ABOUTME: Data layer for ProfileHub
// ABOUTME: Storage error type, SQLite connection management and embedded migrations

pub mod database;

use thiserror::Error;

pub use database::{connect, connect_in_memory, run_migrations, MIGRATOR};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("User not found")]
    NotFound,
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),
    #[error("Nickname already taken: {0}")]
    DuplicateNickname(String),
    #[error("Corrupt stored value in column {column}: {message}")]
    CorruptValue { column: &'static str, message: String },
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
