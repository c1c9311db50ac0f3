// ABOUTME: Transactional email for ProfileHub
// ABOUTME: Markdown templates rendered to styled HTML and delivered through a pluggable Mailer

pub mod error;
pub mod mailer;
pub mod service;
pub mod templates;

pub use error::{EmailError, EmailResult};
pub use mailer::{HttpMailer, LogMailer, Mailer, OutgoingEmail};
pub use service::{subject_for, EmailService};
pub use templates::TemplateManager;
