// ABOUTME: Profile picture upload pipeline
// ABOUTME: Type and size checks, RGB conversion, bounded resize, JPEG re-encode and storage hand-off

use std::io::Cursor;
use std::sync::Arc;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, ImageReader, Limits};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::store::ObjectStore;

/// Upload limit applied when none is configured (2 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
/// Bounding box edge for stored pictures
pub const DEFAULT_MAX_DIMENSION: u32 = 300;
pub const JPEG_QUALITY: u8 = 85;
pub const OBJECT_PREFIX: &str = "profile_pictures";
pub const STORED_CONTENT_TYPE: &str = "image/jpeg";
/// Largest width or height accepted for decoding
pub const MAX_DECODE_DIMENSION: u32 = 4096;
/// Decoder allocation ceiling (64 MiB)
pub const MAX_DECODE_ALLOC: u64 = 64 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Invalid file type. Only JPEG and PNG images are allowed.")]
    UnsupportedMediaType { content_type: Option<String> },

    #[error("File too large: {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Error uploading file: {0}")]
    UploadFailed(String),
}

impl From<ImageError> for UploadError {
    fn from(error: ImageError) -> Self {
        UploadError::UploadFailed(error.to_string())
    }
}

/// Accepts raw uploads, normalizes them and hands the result to an [`ObjectStore`]
pub struct ProfilePictureUploader {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    max_upload_bytes: usize,
    max_dimension: u32,
}

impl ProfilePictureUploader {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }

    pub fn with_limits(mut self, max_upload_bytes: usize, max_dimension: u32) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self.max_dimension = max_dimension;
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Run the full pipeline for one upload and return the stored object's URL.
    ///
    /// Checks run in order: content type, then size, then decoding. The store
    /// is called exactly once, and only after every check has passed.
    pub async fn upload(
        &self,
        user_id: Uuid,
        content_type: Option<&str>,
        data: Bytes,
    ) -> Result<String, UploadError> {
        if !is_accepted_content_type(content_type) {
            warn!(
                "Rejected profile picture for user {}: content type {:?}",
                user_id, content_type
            );
            return Err(UploadError::UnsupportedMediaType {
                content_type: content_type.map(str::to_string),
            });
        }

        if data.len() > self.max_upload_bytes {
            warn!(
                "Rejected profile picture for user {}: {} bytes",
                user_id,
                data.len()
            );
            return Err(UploadError::PayloadTooLarge {
                size: data.len(),
                limit: self.max_upload_bytes,
            });
        }

        let max_dimension = self.max_dimension;
        let normalized = tokio::task::spawn_blocking(move || normalize(&data, max_dimension))
            .await
            .map_err(|e| UploadError::UploadFailed(e.to_string()))??;

        let object_name = object_name_for(user_id);
        let length = normalized.len();
        debug!(
            "Normalized profile picture for user {}: {} bytes via {}",
            user_id,
            length,
            self.store.provider_name()
        );

        let url = self
            .store
            .store(
                &self.bucket,
                &object_name,
                Bytes::from(normalized),
                length,
                STORED_CONTENT_TYPE,
            )
            .await
            .map_err(|e| UploadError::UploadFailed(e.to_string()))?;

        info!("Stored profile picture for user {} at {}", user_id, url);
        Ok(url)
    }
}

fn is_accepted_content_type(content_type: Option<&str>) -> bool {
    matches!(
        content_type,
        Some(ct) if ct == mime::IMAGE_JPEG.essence_str() || ct == mime::IMAGE_PNG.essence_str()
    )
}

/// `profile_pictures/{user_id}_{random}.jpg`
pub fn object_name_for(user_id: Uuid) -> String {
    format!("{}/{}_{}.jpg", OBJECT_PREFIX, user_id, Uuid::new_v4())
}

/// Decode, drop alpha, shrink to fit `max_dimension` square (never enlarge)
/// and re-encode as JPEG.
pub fn normalize(data: &[u8], max_dimension: u32) -> Result<Vec<u8>, ImageError> {
    let mut limits = Limits::default();
    limits.max_image_width = Some(MAX_DECODE_DIMENSION);
    limits.max_image_height = Some(MAX_DECODE_DIMENSION);
    limits.max_alloc = Some(MAX_DECODE_ALLOC);

    let mut reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    reader.limits(limits);
    let decoded = reader.decode()?;
    let mut rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());

    if rgb.width() > max_dimension || rgb.height() > max_dimension {
        rgb = rgb.resize(max_dimension, max_dimension, FilterType::Lanczos3);
    }

    let mut encoded = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut encoded, JPEG_QUALITY))?;
    Ok(encoded)
}
