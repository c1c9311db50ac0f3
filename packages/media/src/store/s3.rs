// ABOUTME: S3-compatible object store
// ABOUTME: Uploads through aws-sdk-s3 to AWS, MinIO or any S3 endpoint

use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use bytes::Bytes;
use tracing::debug;

use profilehub_config::S3Settings;

use super::{object_url, ObjectStore, StoreError, StoreResult};

const CREDENTIALS_PROVIDER_NAME: &str = "profilehub-settings";

/// Object store for AWS S3 and S3-compatible services
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
    region: String,
    public_url: String,
}

impl S3ObjectStore {
    /// Build a client from settings. Explicit keys take precedence over the
    /// default AWS credential chain; a custom endpoint switches to path-style addressing.
    ///
    /// SDK retries are disabled: each `store` call issues at most one request.
    pub async fn connect(settings: &S3Settings) -> StoreResult<Self> {
        let mut config_builder = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(settings.region.clone()))
            .retry_config(RetryConfig::disabled());

        match (&settings.access_key, &settings.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                config_builder = config_builder.credentials_provider(Credentials::new(
                    access_key,
                    secret_key,
                    None,
                    None,
                    CREDENTIALS_PROVIDER_NAME,
                ));
            }
            (None, None) => {}
            _ => {
                return Err(StoreError::Configuration(
                    "S3 access key and secret key must be set together".to_string(),
                ))
            }
        }

        if let Some(endpoint) = &settings.endpoint {
            config_builder = config_builder.endpoint_url(endpoint);
        }

        let sdk_config = config_builder.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.endpoint.is_some())
            .build();

        let public_url = settings
            .public_url
            .clone()
            .or_else(|| settings.endpoint.clone())
            .unwrap_or_else(|| format!("https://s3.{}.amazonaws.com", settings.region));

        debug!(
            "S3 object store ready: region={}, public_url={}",
            settings.region, public_url
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            region: settings.region.clone(),
            public_url,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

fn classify_sdk_error<E, R>(error: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug + 'static,
{
    let message = DisplayErrorContext(&error).to_string();
    match error {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => StoreError::Network(message),
        _ => StoreError::Provider(message),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn provider_name(&self) -> &'static str {
        "aws-s3"
    }

    async fn store(
        &self,
        bucket: &str,
        object_name: &str,
        data: Bytes,
        length: usize,
        content_type: &str,
    ) -> StoreResult<String> {
        debug!(
            "Uploading {} bytes to s3://{}/{}",
            length, bucket, object_name
        );

        let content_length = i64::try_from(length)
            .map_err(|_| StoreError::Provider(format!("Object too large: {} bytes", length)))?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(object_name)
            .body(ByteStream::from(data))
            .content_length(content_length)
            .content_type(content_type)
            .send()
            .await
            .map_err(classify_sdk_error)?;

        Ok(object_url(&self.public_url, bucket, object_name))
    }
}
