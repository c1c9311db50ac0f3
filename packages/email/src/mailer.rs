// ABOUTME: Outbound mail transports
// ABOUTME: Mailer trait with an HTTP mail API client and a tracing-only fallback

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{error, info};

use crate::error::{EmailError, EmailResult};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A fully rendered message, in the shape posted to the mail API
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutgoingEmail) -> EmailResult<()>;
}

/// Delivers mail by POSTing JSON to an HTTP mail API with a bearer key
pub struct HttpMailer {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpMailer {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> EmailResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &OutgoingEmail) -> EmailResult<()> {
        info!("Sending email to {}: {}", email.to, email.subject);

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| {
                error!("Mail API request failed: {}", e);
                EmailError::RequestFailed(e)
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Mail API error: {} - {}", status, body);
            return Err(EmailError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Writes messages to the log instead of delivering them
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &OutgoingEmail) -> EmailResult<()> {
        info!(
            to = %email.to,
            from = %email.from,
            subject = %email.subject,
            "Email delivery disabled, logging message ({} bytes of HTML)",
            email.html.len()
        );
        Ok(())
    }
}
