// ABOUTME: User storage layer using SQLite
// ABOUTME: Handles creation, lookup, partial updates and verification state for users

use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::{debug, warn};
use uuid::Uuid;

use profilehub_core::{generate_nickname, UserCreate, UserRecord, UserRole, UserUpdate};
use profilehub_storage::StorageError;

use crate::password::hash_password;
use crate::token::{generate_verification_token, tokens_match};

/// Attempts at finding a free generated nickname before giving up
const NICKNAME_ATTEMPTS: usize = 10;

pub struct UserStorage {
    pool: SqlitePool,
}

impl UserStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a new user. The password is hashed here; a nickname is generated
    /// when none was supplied, and unverified accounts receive a verification token.
    pub async fn create_user(
        &self,
        input: &UserCreate,
        role: UserRole,
        email_verified: bool,
    ) -> Result<UserRecord, StorageError> {
        self.insert_user(input, role, email_verified, false).await
    }

    /// Self-registration. The first account in an empty table becomes a
    /// verified ADMIN; any later one is ANONYMOUS with a verification token.
    /// The emptiness check and the insert are a single statement, so two
    /// concurrent first registrations cannot both become admin.
    pub async fn register_user(&self, input: &UserCreate) -> Result<UserRecord, StorageError> {
        self.insert_user(input, UserRole::Anonymous, false, true).await
    }

    async fn insert_user(
        &self,
        input: &UserCreate,
        role: UserRole,
        email_verified: bool,
        first_user_is_admin: bool,
    ) -> Result<UserRecord, StorageError> {
        debug!("Creating user: {}", input.email);

        if self.get_user_by_email(&input.email).await?.is_some() {
            return Err(StorageError::DuplicateEmail(input.email.clone()));
        }

        let nickname = match &input.nickname {
            Some(nickname) => {
                if self.get_user_by_nickname(nickname).await?.is_some() {
                    return Err(StorageError::DuplicateNickname(nickname.clone()));
                }
                nickname.clone()
            }
            None => self.free_generated_nickname().await?,
        };

        let hashed_password =
            hash_password(&input.password).map_err(|e| StorageError::Hashing(e.to_string()))?;
        let verification_token = (!email_verified).then(generate_verification_token);

        let id = Uuid::new_v4();
        let now = Utc::now();

        // promote_admin is true only when first-user promotion was requested
        // and the table is still empty at insert time.
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, nickname, first_name, last_name, bio,
                profile_picture_url, linkedin_profile_url, github_profile_url,
                role, is_professional, email_verified, verification_token,
                hashed_password, created_at, updated_at
            )
            SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?,
                CASE WHEN promote_admin THEN 'ADMIN' ELSE ? END,
                0,
                CASE WHEN promote_admin THEN 1 ELSE ? END,
                CASE WHEN promote_admin THEN NULL ELSE ? END,
                ?, ?, ?
            FROM (SELECT (? AND NOT EXISTS (SELECT 1 FROM users)) AS promote_admin)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.email)
        .bind(&nickname)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.bio)
        .bind(&input.profile_picture_url)
        .bind(&input.linkedin_profile_url)
        .bind(&input.github_profile_url)
        .bind(role.as_str())
        .bind(email_verified)
        .bind(&verification_token)
        .bind(&hashed_password)
        .bind(now)
        .bind(now)
        .bind(first_user_is_admin)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &input.email, Some(nickname.as_str())))?;

        self.get_user(id).await
    }

    pub async fn get_user(&self, user_id: Uuid) -> Result<UserRecord, StorageError> {
        debug!("Fetching user: {}", user_id);

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?
            .ok_or(StorageError::NotFound)?;

        row_to_user(&row)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn get_user_by_nickname(
        &self,
        nickname: &str,
    ) -> Result<Option<UserRecord>, StorageError> {
        let row = sqlx::query("SELECT * FROM users WHERE nickname = ?")
            .bind(nickname)
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        row.as_ref().map(row_to_user).transpose()
    }

    pub async fn count_users(&self) -> Result<i64, StorageError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(StorageError::Sqlx)
    }

    /// Oldest first
    pub async fn list_users(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserRecord>, StorageError> {
        debug!("Listing users: limit={} offset={}", limit, offset);

        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at, id LIMIT ? OFFSET ?")
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        rows.iter().map(row_to_user).collect()
    }

    /// Apply a partial update. Only fields present in `input` are written;
    /// `updated_at` is always refreshed.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        input: &UserUpdate,
    ) -> Result<UserRecord, StorageError> {
        debug!("Updating user: {}", user_id);

        // Column names are literals; values go through push_bind.
        let mut query_builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("UPDATE users SET updated_at = ");
        query_builder.push_bind(Utc::now());

        let text_columns = [
            ("email", &input.email),
            ("nickname", &input.nickname),
            ("first_name", &input.first_name),
            ("last_name", &input.last_name),
            ("bio", &input.bio),
            ("profile_picture_url", &input.profile_picture_url),
            ("linkedin_profile_url", &input.linkedin_profile_url),
            ("github_profile_url", &input.github_profile_url),
        ];
        for (column, value) in text_columns {
            if let Some(value) = value {
                query_builder.push(", ").push(column).push(" = ");
                query_builder.push_bind(value.clone());
            }
        }
        if let Some(role) = input.role {
            query_builder.push(", role = ");
            query_builder.push_bind(role.as_str());
        }

        query_builder.push(" WHERE id = ");
        query_builder.push_bind(user_id.to_string());

        let mut tx = self.pool.begin().await.map_err(StorageError::Sqlx)?;

        let result = query_builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                map_unique_violation(
                    e,
                    input.email.as_deref().unwrap_or_default(),
                    input.nickname.as_deref(),
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_one(&mut *tx)
            .await
            .map_err(StorageError::Sqlx)?;

        let user = row_to_user(&row)?;

        tx.commit().await.map_err(StorageError::Sqlx)?;

        Ok(user)
    }

    pub async fn update_profile_picture_url(
        &self,
        user_id: Uuid,
        url: &str,
    ) -> Result<UserRecord, StorageError> {
        debug!("Updating profile picture for user: {}", user_id);

        let result = sqlx::query(
            r#"
            UPDATE users
            SET profile_picture_url = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(url)
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        self.get_user(user_id).await
    }

    pub async fn set_professional_status(
        &self,
        user_id: Uuid,
        is_professional: bool,
    ) -> Result<UserRecord, StorageError> {
        debug!(
            "Setting professional status for user {}: {}",
            user_id, is_professional
        );

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE users
            SET is_professional = ?, professional_status_updated_at = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(is_professional)
        .bind(now)
        .bind(now)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        self.get_user(user_id).await
    }

    /// Consume a verification token. Returns `false` for unknown users, already
    /// verified users and mismatching tokens. Anonymous accounts are promoted
    /// to authenticated on success.
    pub async fn verify_email(&self, user_id: Uuid, token: &str) -> Result<bool, StorageError> {
        debug!("Verifying email for user: {}", user_id);

        let user = match self.get_user(user_id).await {
            Ok(user) => user,
            Err(StorageError::NotFound) => return Ok(false),
            Err(e) => return Err(e),
        };

        let Some(expected) = user.verification_token.as_deref() else {
            return Ok(false);
        };
        if !tokens_match(expected, token) {
            warn!("Verification token mismatch for user: {}", user_id);
            return Ok(false);
        }

        let role = match user.role {
            UserRole::Anonymous => UserRole::Authenticated,
            other => other,
        };

        sqlx::query(
            r#"
            UPDATE users
            SET email_verified = 1, verification_token = NULL, role = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(role.as_str())
        .bind(Utc::now())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StorageError::Sqlx)?;

        Ok(true)
    }

    /// Stamp `last_login_at`; called by the authentication layer after a successful login
    pub async fn record_login(&self, user_id: Uuid) -> Result<(), StorageError> {
        let result = sqlx::query("UPDATE users SET last_login_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::Sqlx)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn free_generated_nickname(&self) -> Result<String, StorageError> {
        for _ in 0..NICKNAME_ATTEMPTS {
            let candidate = generate_nickname();
            if self.get_user_by_nickname(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        // Fall back to a suffix that cannot collide in practice
        let suffix = Uuid::new_v4().simple().to_string();
        Ok(format!("{}_{}", generate_nickname(), &suffix[..8]))
    }
}

fn map_unique_violation(error: sqlx::Error, email: &str, nickname: Option<&str>) -> StorageError {
    if let sqlx::Error::Database(db) = &error {
        if db.is_unique_violation() {
            if db.message().contains("users.nickname") {
                return StorageError::DuplicateNickname(nickname.unwrap_or_default().to_string());
            }
            return StorageError::DuplicateEmail(email.to_string());
        }
    }
    StorageError::Sqlx(error)
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<UserRecord, StorageError> {
    let id: String = row.try_get("id")?;
    let id = Uuid::parse_str(&id).map_err(|e| StorageError::CorruptValue {
        column: "id",
        message: e.to_string(),
    })?;

    let role: String = row.try_get("role")?;
    let role = role
        .parse::<UserRole>()
        .map_err(|e| StorageError::CorruptValue {
            column: "role",
            message: e.to_string(),
        })?;

    Ok(UserRecord {
        id,
        email: row.try_get("email")?,
        nickname: row.try_get("nickname")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        bio: row.try_get("bio")?,
        profile_picture_url: row.try_get("profile_picture_url")?,
        linkedin_profile_url: row.try_get("linkedin_profile_url")?,
        github_profile_url: row.try_get("github_profile_url")?,
        role,
        is_professional: row.try_get("is_professional")?,
        professional_status_updated_at: row.try_get("professional_status_updated_at")?,
        email_verified: row.try_get("email_verified")?,
        verification_token: row.try_get("verification_token")?,
        hashed_password: row.try_get("hashed_password")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        last_login_at: row.try_get("last_login_at")?,
    })
}
