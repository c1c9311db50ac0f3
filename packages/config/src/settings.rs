use std::env;
use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::constants::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid port number: {0}")]
    InvalidPort(#[from] ParseIntError),
    #[error("Port {0} is out of valid range (1-65535)")]
    PortOutOfRange(u16),
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),
}

/// S3-compatible bucket settings (AWS, MinIO, R2)
#[derive(Debug, Clone, PartialEq)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    /// Base used to build public object URLs; falls back to the endpoint
    pub public_url: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    S3(S3Settings),
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MailBackend {
    Http { api_url: String, api_key: String },
    Log,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub server_base_url: String,
    pub cors_origin: String,
    pub storage: StorageBackend,
    pub mail: MailBackend,
    pub mail_from: String,
    pub email_template_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    pub profile_picture_max_dimension: u32,
}

impl Settings {
    /// Build settings from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get(PROFILEHUB_PORT) {
            Some(raw) => raw.trim().parse::<u16>()?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ConfigError::PortOutOfRange(port));
        }

        let storage = match get(STORAGE_BACKEND)
            .unwrap_or_else(|| "s3".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackend::S3(S3Settings {
                bucket: get(S3_BUCKET).unwrap_or_else(|| DEFAULT_S3_BUCKET.to_string()),
                region: get(S3_REGION).unwrap_or_else(|| DEFAULT_S3_REGION.to_string()),
                endpoint: get(S3_ENDPOINT),
                public_url: get(S3_PUBLIC_URL),
                access_key: get(S3_ACCESS_KEY),
                secret_key: get(S3_SECRET_KEY),
            }),
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::InvalidValue {
                    var: STORAGE_BACKEND,
                    value: other.to_string(),
                })
            }
        };

        let mail = match get(MAIL_BACKEND)
            .unwrap_or_else(|| "log".to_string())
            .to_lowercase()
            .as_str()
        {
            "http" => MailBackend::Http {
                api_url: get(MAIL_API_URL).ok_or(ConfigError::MissingVar(MAIL_API_URL))?,
                api_key: get(MAIL_API_KEY).ok_or(ConfigError::MissingVar(MAIL_API_KEY))?,
            },
            "log" => MailBackend::Log,
            other => {
                return Err(ConfigError::InvalidValue {
                    var: MAIL_BACKEND,
                    value: other.to_string(),
                })
            }
        };

        let max_upload_bytes =
            parse_number(get(MAX_UPLOAD_BYTES), MAX_UPLOAD_BYTES, DEFAULT_MAX_UPLOAD_BYTES)?;
        let profile_picture_max_dimension = parse_number(
            get(PROFILE_PICTURE_MAX_DIMENSION),
            PROFILE_PICTURE_MAX_DIMENSION,
            DEFAULT_PROFILE_PICTURE_MAX_DIMENSION,
        )?;

        let settings = Settings {
            host: get(PROFILEHUB_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database_url: get(DATABASE_URL).unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            server_base_url: get(SERVER_BASE_URL)
                .unwrap_or_else(|| DEFAULT_SERVER_BASE_URL.to_string()),
            cors_origin: get(CORS_ORIGIN).unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
            storage,
            mail,
            mail_from: get(MAIL_FROM).unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            email_template_dir: get(EMAIL_TEMPLATE_DIR).map(PathBuf::from),
            max_upload_bytes,
            profile_picture_max_dimension,
        };

        debug!(
            "Loaded settings: port={}, database={}, storage={:?}",
            settings.port,
            settings.database_url,
            match &settings.storage {
                StorageBackend::S3(_) => "s3",
                StorageBackend::Memory => "memory",
            }
        );

        Ok(settings)
    }
}

fn parse_number<T: FromStr + PartialOrd + Default>(
    raw: Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::InvalidValue { var, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let settings = settings_from(&[]).unwrap();

        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(settings.mail, MailBackend::Log);
        assert_eq!(settings.max_upload_bytes, 2 * 1024 * 1024);
        assert_eq!(settings.profile_picture_max_dimension, 300);
        match settings.storage {
            StorageBackend::S3(s3) => {
                assert_eq!(s3.bucket, DEFAULT_S3_BUCKET);
                assert_eq!(s3.region, DEFAULT_S3_REGION);
                assert!(s3.endpoint.is_none());
            }
            StorageBackend::Memory => panic!("Expected S3 backend by default"),
        }
    }

    #[test]
    fn test_custom_values() {
        let settings = settings_from(&[
            (PROFILEHUB_PORT, "9000"),
            (STORAGE_BACKEND, "memory"),
            (MAIL_BACKEND, "http"),
            (MAIL_API_URL, "https://mail.example.com/send"),
            (MAIL_API_KEY, "key"),
            (MAX_UPLOAD_BYTES, "1024"),
            (EMAIL_TEMPLATE_DIR, "/etc/profilehub/templates"),
        ])
        .unwrap();

        assert_eq!(settings.port, 9000);
        assert_eq!(settings.storage, StorageBackend::Memory);
        assert_eq!(
            settings.mail,
            MailBackend::Http {
                api_url: "https://mail.example.com/send".to_string(),
                api_key: "key".to_string(),
            }
        );
        assert_eq!(settings.max_upload_bytes, 1024);
        assert_eq!(
            settings.email_template_dir,
            Some(PathBuf::from("/etc/profilehub/templates"))
        );
    }

    #[test]
    fn test_invalid_port() {
        assert!(matches!(
            settings_from(&[(PROFILEHUB_PORT, "not-a-number")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            settings_from(&[(PROFILEHUB_PORT, "0")]),
            Err(ConfigError::PortOutOfRange(0))
        ));
    }

    #[test]
    fn test_invalid_backends() {
        assert!(matches!(
            settings_from(&[(STORAGE_BACKEND, "ftp")]),
            Err(ConfigError::InvalidValue { var: STORAGE_BACKEND, .. })
        ));
        assert!(matches!(
            settings_from(&[(MAIL_BACKEND, "pigeon")]),
            Err(ConfigError::InvalidValue { var: MAIL_BACKEND, .. })
        ));
    }

    #[test]
    fn test_http_mail_requires_url_and_key() {
        assert!(matches!(
            settings_from(&[(MAIL_BACKEND, "http")]),
            Err(ConfigError::MissingVar(MAIL_API_URL))
        ));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(
            settings_from(&[(MAX_UPLOAD_BYTES, "0")]),
            Err(ConfigError::InvalidValue { var: MAX_UPLOAD_BYTES, .. })
        ));
        assert!(matches!(
            settings_from(&[(PROFILE_PICTURE_MAX_DIMENSION, "big")]),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
