// ABOUTME: Server bootstrap for ProfileHub
// ABOUTME: Builds collaborators from Settings, wires the router and runs the HTTP server

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use profilehub_api::{create_router, AppState, UserService};
use profilehub_config::{MailBackend, Settings, StorageBackend};
use profilehub_email::{EmailService, HttpMailer, LogMailer, Mailer, TemplateManager};
use profilehub_media::{MemoryObjectStore, ObjectStore, ProfilePictureUploader, S3ObjectStore};
use profilehub_security::UserStorage;

/// Bucket used by the in-memory store when no S3 settings exist
const MEMORY_BUCKET: &str = "profile-pictures";

/// Initialise the global tracing subscriber; `RUST_LOG` overrides the `info` default
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();
}

async fn build_object_store(settings: &Settings) -> Result<(Arc<dyn ObjectStore>, String)> {
    match &settings.storage {
        StorageBackend::S3(s3) => {
            let store = S3ObjectStore::connect(s3)
                .await
                .context("Failed to configure S3 object store")?;
            Ok((Arc::new(store), s3.bucket.clone()))
        }
        StorageBackend::Memory => {
            info!("Using in-memory object store; uploads are lost on restart");
            Ok((
                Arc::new(MemoryObjectStore::default()),
                MEMORY_BUCKET.to_string(),
            ))
        }
    }
}

fn build_mailer(settings: &Settings) -> Result<Arc<dyn Mailer>> {
    match &settings.mail {
        MailBackend::Http { api_url, api_key } => {
            let mailer = HttpMailer::new(api_url.clone(), api_key.clone())
                .context("Failed to build mail API client")?;
            Ok(Arc::new(mailer))
        }
        MailBackend::Log => {
            info!("Email delivery disabled; messages will be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

/// Connect to the database and build every collaborator the handlers need
pub async fn build_state(settings: &Settings) -> Result<AppState> {
    let pool = profilehub_storage::connect(&settings.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", settings.database_url))?;

    let (store, bucket) = build_object_store(settings).await?;
    let uploader = ProfilePictureUploader::new(store, bucket).with_limits(
        settings.max_upload_bytes,
        settings.profile_picture_max_dimension,
    );

    let templates = match &settings.email_template_dir {
        Some(dir) => TemplateManager::with_override_dir(dir.clone()),
        None => TemplateManager::new(),
    };
    let email = Arc::new(EmailService::new(
        build_mailer(settings)?,
        templates,
        settings.mail_from.clone(),
        settings.server_base_url.clone(),
    ));

    let users = UserService::new(UserStorage::new(pool), uploader, email);
    Ok(AppState::new(users, settings.server_base_url.clone()))
}

pub fn build_cors(settings: &Settings) -> Result<CorsLayer> {
    let origin = settings
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", settings.cors_origin))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers(Any))
}

/// Full application: routes, tracing and CORS
pub async fn build_app(settings: &Settings) -> Result<Router> {
    let state = build_state(settings).await?;
    Ok(create_router(state).layer(build_cors(settings)?))
}

/// Bind the HTTP listener; `host` may be an IP address or a resolvable hostname
pub async fn bind_listener(host: &str, port: u16) -> Result<TcpListener> {
    TcpListener::bind((host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))
}

pub async fn run_server(settings: Settings) -> Result<()> {
    let app = build_app(&settings).await?;

    let listener = bind_listener(&settings.host, settings.port).await?;
    info!("ProfileHub listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Apply pending schema migrations and exit
pub async fn run_migrations(settings: &Settings) -> Result<()> {
    let pool = profilehub_storage::connect(&settings.database_url)
        .await
        .with_context(|| format!("Failed to migrate {}", settings.database_url))?;
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
