// ABOUTME: User record and its capability-scoped views
// ABOUTME: Canonical record plus independent create/update/response shapes

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::policy::check_at_least_one_value;
use crate::validation::{
    require_email, validate_nickname, validate_password_strength, validate_url, ValidationError,
};

/// Permission level of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[serde(alias = "anonymous")]
    Anonymous,
    #[serde(alias = "authenticated")]
    Authenticated,
    #[serde(alias = "manager")]
    Manager,
    #[serde(alias = "admin")]
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Anonymous => "ANONYMOUS",
            UserRole::Authenticated => "AUTHENTICATED",
            UserRole::Manager => "MANAGER",
            UserRole::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ANONYMOUS" => Ok(UserRole::Anonymous),
            "AUTHENTICATED" => Ok(UserRole::Authenticated),
            "MANAGER" => Ok(UserRole::Manager),
            "ADMIN" => Ok(UserRole::Admin),
            _ => Err(ValidationError::Malformed(format!("Unknown role: {}", s))),
        }
    }
}

/// The persisted user, as the storage layer sees it
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub nickname: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub linkedin_profile_url: Option<String>,
    pub github_profile_url: Option<String>,
    pub role: UserRole,
    pub is_professional: bool,
    pub professional_status_updated_at: Option<DateTime<Utc>>,
    pub email_verified: bool,
    pub verification_token: Option<String>,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Registration / admin creation payload
#[derive(Clone, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub password: String,
    pub role: UserRole,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    #[serde(default)]
    pub linkedin_profile_url: Option<String>,
    #[serde(default)]
    pub github_profile_url: Option<String>,
}

// Keeps the plaintext password out of logs
impl fmt::Debug for UserCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCreate")
            .field("email", &self.email)
            .field("password", &"********")
            .field("role", &self.role)
            .field("nickname", &self.nickname)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("bio", &self.bio)
            .field("profile_picture_url", &self.profile_picture_url)
            .field("linkedin_profile_url", &self.linkedin_profile_url)
            .field("github_profile_url", &self.github_profile_url)
            .finish()
    }
}

impl UserCreate {
    /// Deserialize and validate a raw JSON body
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let create: UserCreate =
            serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        create.validate()?;
        Ok(create)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_email(&self.email).map_err(|e| e.for_field("email"))?;
        validate_nickname(self.nickname.as_deref()).map_err(|e| e.for_field("nickname"))?;
        validate_profile_urls(
            self.profile_picture_url.as_deref(),
            self.linkedin_profile_url.as_deref(),
            self.github_profile_url.as_deref(),
        )?;
        validate_password_strength(&self.password).map_err(|e| e.for_field("password"))?;
        Ok(())
    }
}

/// Partial update payload. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin_profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_profile_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

impl UserUpdate {
    /// Apply the update policy to the raw body, then deserialize and run the
    /// per-field validators.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let Value::Object(fields) = &value else {
            return Err(ValidationError::Malformed(
                "Update body must be a JSON object".to_string(),
            ));
        };
        check_at_least_one_value(fields)?;

        let update: UserUpdate =
            serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        update.validate()?;
        Ok(update)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyUpdate);
        }
        if let Some(email) = &self.email {
            require_email(email).map_err(|e| e.for_field("email"))?;
        }
        validate_nickname(self.nickname.as_deref()).map_err(|e| e.for_field("nickname"))?;
        validate_profile_urls(
            self.profile_picture_url.as_deref(),
            self.linkedin_profile_url.as_deref(),
            self.github_profile_url.as_deref(),
        )
    }

    /// True when no field carries a non-empty value
    pub fn is_empty(&self) -> bool {
        let texts = [
            &self.email,
            &self.nickname,
            &self.first_name,
            &self.last_name,
            &self.bio,
            &self.profile_picture_url,
            &self.linkedin_profile_url,
            &self.github_profile_url,
        ];
        self.role.is_none()
            && texts
                .iter()
                .all(|field| field.as_deref().map_or(true, str::is_empty))
    }
}

/// Outgoing representation. Never carries credentials or tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub nickname: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub linkedin_profile_url: Option<String>,
    pub github_profile_url: Option<String>,
    pub role: UserRole,
    pub is_professional: bool,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<HashMap<String, String>>,
}

impl UserResponse {
    pub fn with_links(mut self, links: HashMap<String, String>) -> Self {
        self.links = Some(links);
        self
    }
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            email: user.email,
            nickname: user.nickname,
            first_name: user.first_name,
            last_name: user.last_name,
            bio: user.bio,
            profile_picture_url: user.profile_picture_url,
            linkedin_profile_url: user.linkedin_profile_url,
            github_profile_url: user.github_profile_url,
            role: user.role,
            is_professional: user.is_professional,
            email_verified: user.email_verified,
            created_at: user.created_at,
            updated_at: user.updated_at,
            last_login_at: user.last_login_at,
            links: None,
        }
    }
}

/// One page of users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub items: Vec<UserResponse>,
    pub total: i64,
    pub page: i64,
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<HashMap<String, String>>,
}

fn validate_profile_urls(
    profile_picture_url: Option<&str>,
    linkedin_profile_url: Option<&str>,
    github_profile_url: Option<&str>,
) -> Result<(), ValidationError> {
    validate_url(profile_picture_url).map_err(|e| e.for_field("profile_picture_url"))?;
    validate_url(linkedin_profile_url).map_err(|e| e.for_field("linkedin_profile_url"))?;
    validate_url(github_profile_url).map_err(|e| e.for_field("github_profile_url"))?;
    Ok(())
}
