// ABOUTME: Shared application state for request handlers
// ABOUTME: Arc-wrapped collaborators built once at startup

use std::sync::Arc;

use crate::service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<UserService>,
    /// Public base URL used to build hypermedia links
    pub server_base_url: Arc<str>,
}

impl AppState {
    pub fn new(users: UserService, server_base_url: impl Into<String>) -> Self {
        Self {
            users: Arc::new(users),
            server_base_url: Arc::from(server_base_url.into()),
        }
    }
}
