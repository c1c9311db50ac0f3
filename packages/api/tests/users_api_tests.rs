// ABOUTME: Router-level tests for the users API
// ABOUTME: Drives the real router with an in-memory database, object store and recording mailer

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use profilehub_api::{create_router, AppState, UserService};
use profilehub_email::{EmailResult, EmailService, Mailer, OutgoingEmail, TemplateManager};
use profilehub_media::{MemoryObjectStore, ProfilePictureUploader};
use profilehub_security::UserStorage;

const BASE_URL: &str = "http://localhost:8000";
const BOUNDARY: &str = "profilehub-test-boundary";

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> EmailResult<()> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

struct TestApp {
    router: Router,
    mailer: Arc<RecordingMailer>,
    store: Arc<MemoryObjectStore>,
}

impl TestApp {
    async fn new() -> Self {
        let pool = profilehub_storage::connect_in_memory().await.unwrap();
        let mailer = Arc::new(RecordingMailer::default());
        let store = Arc::new(MemoryObjectStore::new("http://localhost:9000"));

        let email = Arc::new(EmailService::new(
            mailer.clone(),
            TemplateManager::new(),
            "no-reply@profilehub.test",
            BASE_URL,
        ));
        let uploader = ProfilePictureUploader::new(store.clone(), "profile-pictures");
        let users = UserService::new(UserStorage::new(pool), uploader, email);

        Self {
            router: create_router(AppState::new(users, BASE_URL)),
            mailer,
            store,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn json(&self, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn upload(&self, user_id: &str, content_type: &str, data: &[u8]) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"picture\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, content_type
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(format!("/users/{}/upload-profile-picture", user_id))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn register(&self, email: &str) -> Value {
        let (status, body) = self
            .json(
                "POST",
                "/register",
                json!({ "email": email, "password": "Secure*1234" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }
}

fn rgba_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([30, 60, 90, 100]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_first_registration_becomes_admin() {
    let app = TestApp::new().await;

    let admin = app.register("admin@example.com").await;
    assert_eq!(admin["role"], "ADMIN");
    assert_eq!(admin["email_verified"], true);
    assert!(app.mailer.sent().is_empty());

    let user = app.register("john@example.com").await;
    assert_eq!(user["role"], "ANONYMOUS");
    assert_eq!(user["email_verified"], false);
    assert!(user.get("password").is_none());
    assert!(user.get("hashed_password").is_none());
    assert!(user.get("verification_token").is_none());
    assert!(user["links"]["self"]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:8000/users/"));

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "john@example.com");
    assert_eq!(sent[0].subject, "Verify Your Account");
}

#[tokio::test]
async fn test_success_bodies_are_bare_records() {
    let app = TestApp::new().await;
    let user = app.register("john@example.com").await;
    assert!(user.get("success").is_none());
    assert!(user.get("data").is_none());
    assert_eq!(user["email"], "john@example.com");

    let (status, body) = app.get("/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["email"], "john@example.com");
}

#[tokio::test]
async fn test_malformed_json_gets_error_envelope() {
    let app = TestApp::new().await;

    let request = Request::builder()
        .method("POST")
        .uri("/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"email\": "))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let request = Request::builder()
        .method("POST")
        .uri("/users")
        .body(Body::from(r#"{"email": "a@b.co"}"#))
        .unwrap();
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let user = app.register("john@example.com").await;
    let (status, body) = app
        .json(
            "PUT",
            &format!("/users/{}/professional-status", user["id"].as_str().unwrap()),
            json!({ "is_professional": "yes" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_register_ignores_requested_role() {
    let app = TestApp::new().await;
    app.register("admin@example.com").await;

    let (status, body) = app
        .json(
            "POST",
            "/register",
            json!({ "email": "sneaky@example.com", "password": "Secure*1234", "role": "ADMIN" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "ANONYMOUS");
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            "POST",
            "/register",
            json!({ "email": "john@example.com", "password": "weak" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"]["field"], "password");
    assert!(body["request_id"].is_string());

    let (status, body) = app
        .json(
            "POST",
            "/register",
            json!({ "email": "not-an-email", "password": "Secure*1234" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field"], "email");
}

#[tokio::test]
async fn test_duplicate_email_conflict() {
    let app = TestApp::new().await;
    app.register("john@example.com").await;

    let (status, body) = app
        .json(
            "POST",
            "/register",
            json!({ "email": "john@example.com", "password": "Secure*1234" }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_verify_email_flow() {
    let app = TestApp::new().await;
    app.register("admin@example.com").await;
    let user = app.register("john@example.com").await;
    let id = user["id"].as_str().unwrap();

    let html = app.mailer.sent()[0].html.clone();
    let prefix = format!("{}/verify-email/{}/", BASE_URL, id);
    let start = html.find(&prefix).unwrap() + prefix.len();
    let token: String = html[start..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();

    let (status, body) = app
        .get(&format!("/verify-email/{}/wrong-token", id))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_VERIFICATION_LINK");

    let (status, _) = app.get(&format!("/verify-email/{}/{}", id, token)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get(&format!("/users/{}", id)).await;
    assert_eq!(body["email_verified"], true);
    assert_eq!(body["role"], "AUTHENTICATED");
}

#[tokio::test]
async fn test_create_and_get_user() {
    let app = TestApp::new().await;

    let (status, body) = app
        .json(
            "POST",
            "/users",
            json!({
                "email": "manager@example.com",
                "password": "Secure*1234",
                "role": "MANAGER",
                "nickname": "the_manager",
                "github_profile_url": "https://github.com/manager"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["role"], "MANAGER");

    let (status, body) = app.get(&format!("/users/{}", id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nickname"], "the_manager");
    assert_eq!(body["github_profile_url"], "https://github.com/manager");

    let (status, body) = app
        .get("/users/00000000-0000-4000-8000-000000000000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_update_policy_and_partial_update() {
    let app = TestApp::new().await;
    let user = app.register("john@example.com").await;
    let id = user["id"].as_str().unwrap();

    let (status, body) = app
        .json("PUT", &format!("/users/{}", id), json!({ "bio": "", "first_name": null }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .json(
            "PUT",
            &format!("/users/{}", id),
            json!({ "github_profile_url": "not a url" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["field"], "github_profile_url");

    let (status, body) = app
        .json("PUT", &format!("/users/{}", id), json!({ "bio": "Rust developer" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bio"], "Rust developer");
    assert_eq!(body["email"], "john@example.com");
    assert_eq!(body["created_at"], user["created_at"]);
}

#[tokio::test]
async fn test_list_users_paginates() {
    let app = TestApp::new().await;
    for i in 0..3 {
        app.register(&format!("user{}@example.com", i)).await;
    }

    let (status, body) = app.get("/users?page=2&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body;
    assert_eq!(data["total"], 3);
    assert_eq!(data["page"], 2);
    assert_eq!(data["size"], 2);
    assert_eq!(data["items"].as_array().unwrap().len(), 1);
    assert_eq!(
        data["links"]["prev"],
        "http://localhost:8000/users?page=1&limit=2"
    );
    assert!(data["links"].get("next").is_none());
}

#[tokio::test]
async fn test_list_users_huge_page_is_empty() {
    let app = TestApp::new().await;
    app.register("john@example.com").await;

    let (status, body) = app
        .get("/users?page=9223372036854775807&limit=10")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert!(body["items"].as_array().unwrap().is_empty());
    assert!(body["links"].get("next").is_none());
}

#[tokio::test]
async fn test_professional_status_sends_notification() {
    let app = TestApp::new().await;
    let user = app.register("admin@example.com").await;
    let id = user["id"].as_str().unwrap();

    let (status, body) = app
        .json(
            "PUT",
            &format!("/users/{}/professional-status", id),
            json!({ "is_professional": true }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_professional"], true);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Professional Status Update");
}

#[tokio::test]
async fn test_upload_profile_picture() {
    let app = TestApp::new().await;
    let user = app.register("john@example.com").await;
    let id = user["id"].as_str().unwrap();

    let (status, body) = app.upload(id, "image/png", &rgba_png(100, 100)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let url = body["profile_picture_url"].as_str().unwrap();
    assert!(url.contains(id));
    assert!(url.ends_with(".jpg"));
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_upload_rejects_bad_type_and_size() {
    let app = TestApp::new().await;
    let user = app.register("john@example.com").await;
    let id = user["id"].as_str().unwrap();

    let (status, body) = app.upload(id, "text/plain", b"hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_FILE_TYPE");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("Invalid file type"));

    let oversized = vec![0u8; 2 * 1024 * 1024 + 1];
    let (status, body) = app.upload(id, "image/jpeg", &oversized).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");

    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn test_upload_for_missing_user() {
    let app = TestApp::new().await;
    let (status, _) = app
        .upload(
            "00000000-0000-4000-8000-000000000000",
            "image/png",
            &rgba_png(10, 10),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(app.store.is_empty().await);
}
