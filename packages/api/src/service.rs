// ABOUTME: User workflows behind the HTTP handlers
// ABOUTME: Coordinates the user store, picture pipeline and email notifications

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use profilehub_core::{PaginationParams, UserCreate, UserRecord, UserUpdate};
use profilehub_email::EmailService;
use profilehub_media::ProfilePictureUploader;
use profilehub_security::UserStorage;

use crate::error::{ApiError, ApiResult};

pub struct UserService {
    storage: UserStorage,
    uploader: ProfilePictureUploader,
    email: Arc<EmailService>,
}

impl UserService {
    pub fn new(
        storage: UserStorage,
        uploader: ProfilePictureUploader,
        email: Arc<EmailService>,
    ) -> Self {
        Self {
            storage,
            uploader,
            email,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.uploader.max_upload_bytes()
    }

    /// Self-registration. The first account becomes a verified ADMIN; every
    /// later account starts ANONYMOUS and is sent a verification link.
    pub async fn register(&self, input: UserCreate) -> ApiResult<UserRecord> {
        let user = self.storage.register_user(&input).await?;
        info!("Registered user {} with role {}", user.id, user.role);

        self.send_verification(&user).await;
        Ok(user)
    }

    /// Administrative creation with the role given in the payload
    pub async fn create(&self, input: UserCreate) -> ApiResult<UserRecord> {
        let user = self.storage.create_user(&input, input.role, false).await?;
        info!("Created user {} with role {}", user.id, user.role);

        self.send_verification(&user).await;
        Ok(user)
    }

    pub async fn verify_email(&self, user_id: Uuid, token: &str) -> ApiResult<()> {
        if self.storage.verify_email(user_id, token).await? {
            info!("Email verified for user {}", user_id);
            Ok(())
        } else {
            Err(ApiError::InvalidVerificationLink)
        }
    }

    pub async fn get(&self, user_id: Uuid) -> ApiResult<UserRecord> {
        Ok(self.storage.get_user(user_id).await?)
    }

    /// One page of users plus the overall count
    pub async fn list(&self, params: &PaginationParams) -> ApiResult<(Vec<UserRecord>, i64)> {
        let (limit, offset) = params.validate();
        let users = self.storage.list_users(limit, offset).await?;
        let total = self.storage.count_users().await?;
        Ok((users, total))
    }

    pub async fn update(&self, user_id: Uuid, update: UserUpdate) -> ApiResult<UserRecord> {
        update.validate()?;
        Ok(self.storage.update_user(user_id, &update).await?)
    }

    /// Toggle the professional flag and notify the user. A failed
    /// notification does not undo the change.
    pub async fn set_professional_status(
        &self,
        user_id: Uuid,
        is_professional: bool,
    ) -> ApiResult<UserRecord> {
        let user = self
            .storage
            .set_professional_status(user_id, is_professional)
            .await?;

        if let Err(e) = self.email.send_professional_status_email(&user).await {
            warn!(
                "Failed to send professional status email to user {}: {}",
                user.id, e
            );
        }
        Ok(user)
    }

    /// Validate, normalize and store a new picture, then record its URL
    pub async fn upload_profile_picture(
        &self,
        user_id: Uuid,
        content_type: Option<&str>,
        data: Bytes,
    ) -> ApiResult<UserRecord> {
        // 404 before doing any image work
        self.storage.get_user(user_id).await?;

        let url = self.uploader.upload(user_id, content_type, data).await?;
        Ok(self.storage.update_profile_picture_url(user_id, &url).await?)
    }

    async fn send_verification(&self, user: &UserRecord) {
        let Some(token) = user.verification_token.as_deref() else {
            return;
        };
        if let Err(e) = self.email.send_verification_email(user, token).await {
            warn!("Failed to send verification email to user {}: {}", user.id, e);
        }
    }
}
