// ABOUTME: Email service for user-facing notifications
// ABOUTME: Maps email types to subjects and templates, validates recipients and hands off to a Mailer

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use profilehub_core::{validate_email_address, UserRecord};

use crate::error::{EmailError, EmailResult};
use crate::mailer::{Mailer, OutgoingEmail};
use crate::templates::{apply_email_styles, markdown_to_html, TemplateManager};

/// Subject line for each supported email type; the type doubles as the template name
const SUBJECTS: &[(&str, &str)] = &[
    ("email_verification", "Verify Your Account"),
    ("password_reset", "Password Reset Instructions"),
    ("account_locked", "Account Locked Notification"),
    ("professional_status_update", "Professional Status Update"),
];

pub fn subject_for(email_type: &str) -> Option<&'static str> {
    SUBJECTS
        .iter()
        .find(|(kind, _)| *kind == email_type)
        .map(|(_, subject)| *subject)
}

pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    templates: TemplateManager,
    from: String,
    server_base_url: String,
}

impl EmailService {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        templates: TemplateManager,
        from: impl Into<String>,
        server_base_url: impl Into<String>,
    ) -> Self {
        Self {
            mailer,
            templates,
            from: from.into(),
            server_base_url: server_base_url.into(),
        }
    }

    /// Send ad-hoc markdown content, styled like the templated emails
    pub async fn send_markdown_email(
        &self,
        to: &str,
        subject: &str,
        markdown: &str,
    ) -> EmailResult<()> {
        let html = apply_email_styles(&markdown_to_html(markdown));
        self.deliver(to, subject, html).await
    }

    /// Render the template for `email_type` with `user_data` and send it to
    /// `user_data["email"]`.
    pub async fn send_user_email(
        &self,
        user_data: &HashMap<String, String>,
        email_type: &str,
    ) -> EmailResult<()> {
        let subject = subject_for(email_type)
            .ok_or_else(|| EmailError::UnknownTemplate(email_type.to_string()))?;
        let to = user_data
            .get("email")
            .ok_or(EmailError::MissingField("email"))?;

        let html = self.templates.render_template(email_type, user_data)?;
        self.deliver(to, subject, html).await
    }

    /// Link format: `{server_base_url}/verify-email/{user_id}/{token}`
    pub fn verification_url(&self, user_id: &Uuid, token: &str) -> String {
        format!(
            "{}/verify-email/{}/{}",
            self.server_base_url.trim_end_matches('/'),
            user_id,
            token
        )
    }

    pub async fn send_verification_email(
        &self,
        user: &UserRecord,
        token: &str,
    ) -> EmailResult<()> {
        let mut user_data = base_context(user);
        user_data.insert(
            "verification_url".to_string(),
            self.verification_url(&user.id, token),
        );
        self.send_user_email(&user_data, "email_verification").await
    }

    pub async fn send_professional_status_email(&self, user: &UserRecord) -> EmailResult<()> {
        let status_message = if user.is_professional {
            "Congratulations! Your account has been upgraded to professional status."
        } else {
            "Your account no longer has professional status."
        };

        let mut user_data = base_context(user);
        user_data.insert("status_message".to_string(), status_message.to_string());
        self.send_user_email(&user_data, "professional_status_update")
            .await
    }

    async fn deliver(&self, to: &str, subject: &str, html: String) -> EmailResult<()> {
        if !validate_email_address(to) {
            warn!("Refusing to send email to invalid recipient: {}", to);
            return Err(EmailError::InvalidRecipient(to.to_string()));
        }

        self.mailer
            .send(&OutgoingEmail {
                from: self.from.clone(),
                to: to.to_string(),
                subject: subject.to_string(),
                html,
            })
            .await?;

        info!("Email sent to {}: {}", to, subject);
        Ok(())
    }
}

/// Fields every user email can reference: `email` and a display `name`
fn base_context(user: &UserRecord) -> HashMap<String, String> {
    let name = user
        .first_name
        .clone()
        .or_else(|| user.nickname.clone())
        .unwrap_or_else(|| user.email.clone());

    HashMap::from([
        ("email".to_string(), user.email.clone()),
        ("name".to_string(), name),
    ])
}
