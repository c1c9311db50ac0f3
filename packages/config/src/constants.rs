// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used across ProfileHub

// Server Configuration
pub const PROFILEHUB_HOST: &str = "PROFILEHUB_HOST";
pub const PROFILEHUB_PORT: &str = "PROFILEHUB_PORT";
pub const SERVER_BASE_URL: &str = "SERVER_BASE_URL";

// CORS Configuration
pub const CORS_ORIGIN: &str = "CORS_ORIGIN";

// Database Configuration
pub const DATABASE_URL: &str = "DATABASE_URL";

// Object Storage Configuration
pub const STORAGE_BACKEND: &str = "STORAGE_BACKEND";
pub const S3_BUCKET: &str = "S3_BUCKET";
pub const S3_REGION: &str = "S3_REGION";
pub const S3_ENDPOINT: &str = "S3_ENDPOINT";
pub const S3_PUBLIC_URL: &str = "S3_PUBLIC_URL";
pub const S3_ACCESS_KEY: &str = "S3_ACCESS_KEY";
pub const S3_SECRET_KEY: &str = "S3_SECRET_KEY";

// Profile Picture Limits
pub const MAX_UPLOAD_BYTES: &str = "MAX_UPLOAD_BYTES";
pub const PROFILE_PICTURE_MAX_DIMENSION: &str = "PROFILE_PICTURE_MAX_DIMENSION";

// Mail Configuration
pub const MAIL_BACKEND: &str = "MAIL_BACKEND";
pub const MAIL_API_URL: &str = "MAIL_API_URL";
pub const MAIL_API_KEY: &str = "MAIL_API_KEY";
pub const MAIL_FROM: &str = "MAIL_FROM";
pub const EMAIL_TEMPLATE_DIR: &str = "EMAIL_TEMPLATE_DIR";

// Defaults
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://profilehub.db";
pub const DEFAULT_SERVER_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_S3_BUCKET: &str = "profile-pictures";
pub const DEFAULT_S3_REGION: &str = "us-east-1";
pub const DEFAULT_MAIL_FROM: &str = "no-reply@profilehub.local";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
pub const DEFAULT_PROFILE_PICTURE_MAX_DIMENSION: u32 = 300;
