// ABOUTME: HTTP request handlers for user operations
// ABOUTME: Registration, verification, CRUD, professional status and profile picture upload

use axum::{
    extract::{multipart::MultipartError, rejection::JsonRejection, Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use profilehub_core::{
    pagination_links, user_links, PaginationParams, UserCreate, UserListResponse, UserRecord,
    UserResponse, UserRole, UserUpdate, ValidationError,
};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Multipart field carrying the picture
const UPLOAD_FIELD: &str = "file";

fn to_response(state: &AppState, user: UserRecord) -> UserResponse {
    let links = user_links(&state.server_base_url, user.id);
    UserResponse::from(user).with_links(links)
}

/// Unwrap a JSON body, turning extractor rejections into the standard error body
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Self-registration; any role in the body is ignored
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("Registering new user");

    let mut body = json_body(payload)?;
    if let Value::Object(fields) = &mut body {
        fields.insert("role".to_string(), json!(UserRole::Anonymous));
    }
    let input = UserCreate::from_json(body)?;

    let user = state.users.register(input).await?;
    Ok((StatusCode::CREATED, Json(to_response(&state, user))))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Path((user_id, token)): Path<(Uuid, String)>,
) -> ApiResult<impl IntoResponse> {
    info!("Verifying email for user {}", user_id);

    state.users.verify_email(user_id, &token).await?;
    Ok(Json(json!({ "message": "Email verified successfully" })))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("Creating user");

    let input = UserCreate::from_json(json_body(payload)?)?;
    let user = state.users.create(input).await?;
    Ok((StatusCode::CREATED, Json(to_response(&state, user))))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<impl IntoResponse> {
    info!("Listing users: page={} limit={}", params.page, params.limit);

    let (users, total) = state.users.list(&params).await?;
    let items: Vec<UserResponse> = users
        .into_iter()
        .map(|user| to_response(&state, user))
        .collect();

    Ok(Json(UserListResponse {
        items,
        total,
        page: params.page(),
        size: params.limit(),
        links: Some(pagination_links(&state.server_base_url, &params, total)),
    }))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    info!("Getting user: {}", user_id);

    let user = state.users.get(user_id).await?;
    Ok(Json(to_response(&state, user)))
}

/// Partial update. The raw body goes through the update policy before any
/// field is deserialized.
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    info!("Updating user: {}", user_id);

    let update = UserUpdate::from_json(json_body(payload)?)?;
    let user = state.users.update(user_id, update).await?;
    Ok(Json(to_response(&state, user)))
}

/// Request body for toggling professional status
#[derive(Debug, Deserialize)]
pub struct ProfessionalStatusRequest {
    pub is_professional: bool,
}

pub async fn update_professional_status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    payload: Result<Json<ProfessionalStatusRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let request = json_body(payload)?;
    info!(
        "Setting professional status for user {}: {}",
        user_id, request.is_professional
    );

    let user = state
        .users
        .set_professional_status(user_id, request.is_professional)
        .await?;
    Ok(Json(to_response(&state, user)))
}

pub async fn upload_profile_picture(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    info!("Uploading profile picture for user {}", user_id);

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(multipart_error)?;

        let user = state
            .users
            .upload_profile_picture(user_id, content_type.as_deref(), data)
            .await?;
        return Ok(Json(to_response(&state, user)));
    }

    Err(ValidationError::Malformed(format!("Missing multipart field '{}'", UPLOAD_FIELD)).into())
}

fn multipart_error(error: MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::RequestTooLarge
    } else {
        ApiError::BadRequest(error.body_text())
    }
}
