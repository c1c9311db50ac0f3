// ABOUTME: Configuration for ProfileHub
// ABOUTME: Environment variable names and the typed Settings built from them

pub mod constants;
pub mod settings;

pub use settings::{ConfigError, MailBackend, S3Settings, Settings, StorageBackend};
