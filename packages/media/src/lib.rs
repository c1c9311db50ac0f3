// ABOUTME: Media handling for ProfileHub
// ABOUTME: Profile picture normalization pipeline and pluggable object storage

pub mod profile_picture;
pub mod store;

pub use profile_picture::{ProfilePictureUploader, UploadError};
pub use store::{MemoryObjectStore, ObjectStore, S3ObjectStore, StoreError, StoreResult};
