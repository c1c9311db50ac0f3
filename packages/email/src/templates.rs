// ABOUTME: Markdown email templates
// ABOUTME: Renders header + body + footer with placeholders, converts to HTML and inlines styles

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use minijinja::{Environment, UndefinedBehavior};
use pulldown_cmark::{html, Options, Parser};
use tracing::debug;

use crate::error::{EmailError, EmailResult};

const HEADER: &str = "header";
const FOOTER: &str = "footer";

/// Built-in templates, keyed by name
const EMBEDDED_TEMPLATES: &[(&str, &str)] = &[
    (HEADER, include_str!("../templates/header.md")),
    (FOOTER, include_str!("../templates/footer.md")),
    (
        "email_verification",
        include_str!("../templates/email_verification.md"),
    ),
    ("password_reset", include_str!("../templates/password_reset.md")),
    ("account_locked", include_str!("../templates/account_locked.md")),
    (
        "professional_status_update",
        include_str!("../templates/professional_status_update.md"),
    ),
];

/// Inline CSS applied per element, since most mail clients ignore stylesheets
const ELEMENT_STYLES: &[(&str, &str)] = &[
    ("h1", "font-size: 24px; color: #333333; font-weight: bold; margin-top: 20px;"),
    ("h2", "font-size: 20px; color: #666666; font-weight: bold; margin-top: 16px;"),
    ("p", "font-size: 16px; color: #666666; margin: 10px 0; line-height: 1.6;"),
    ("a", "color: #0056b3; text-decoration: none; font-weight: bold;"),
    ("hr", "border: none; border-top: 1px solid #dddddd; margin: 24px 0;"),
];

const BODY_STYLE: &str =
    "font-family: Arial, sans-serif; font-size: 16px; color: #333333; background-color: #ffffff; line-height: 1.5;";

/// Loads and renders email templates.
///
/// Templates ship embedded in the binary; when an override directory is set,
/// a `{name}.md` file found there wins over the embedded copy.
#[derive(Debug, Clone, Default)]
pub struct TemplateManager {
    override_dir: Option<PathBuf>,
}

impl TemplateManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override_dir(override_dir: impl Into<PathBuf>) -> Self {
        Self {
            override_dir: Some(override_dir.into()),
        }
    }

    fn load(&self, name: &str) -> EmailResult<String> {
        if let Some(dir) = &self.override_dir {
            let path = dir.join(format!("{}.md", name));
            if path.is_file() {
                debug!("Loading email template override: {}", path.display());
                return fs::read_to_string(&path).map_err(|e| {
                    EmailError::Template(format!("Failed to read {}: {}", path.display(), e))
                });
            }
        }

        EMBEDDED_TEMPLATES
            .iter()
            .find(|(template, _)| *template == name)
            .map(|(_, source)| source.to_string())
            .ok_or_else(|| EmailError::UnknownTemplate(name.to_string()))
    }

    /// Render `header + {name} + footer` with `context` and return styled HTML.
    ///
    /// Context values are inserted as literal text: markdown and HTML in them
    /// is escaped, so user-supplied fields cannot add links or markup.
    pub fn render_template(
        &self,
        name: &str,
        context: &HashMap<String, String>,
    ) -> EmailResult<String> {
        let markdown = format!(
            "{}\n{}\n{}",
            self.load(HEADER)?,
            self.load(name)?,
            self.load(FOOTER)?
        );

        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        let escaped: HashMap<&str, String> = context
            .iter()
            .map(|(key, value)| (key.as_str(), escape_markdown(value)))
            .collect();
        let filled = env.render_str(&markdown, escaped)?;

        Ok(apply_email_styles(&markdown_to_html(&filled)))
    }
}

/// Backslash-escape every ASCII punctuation character so the value renders
/// verbatim, both in running text and inside link destinations. Line breaks
/// collapse to spaces so a value cannot open a new block.
pub fn escape_markdown(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\r' | '\n' => escaped.push(' '),
            c if c.is_ascii_punctuation() => {
                escaped.push('\\');
                escaped.push(c);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// CommonMark (plus tables and strikethrough) to HTML
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options);
    let mut html_out = String::new();
    html::push_html(&mut html_out, parser);
    html_out
}

/// Attach inline styles to known elements and wrap the document in a styled container
pub fn apply_email_styles(html: &str) -> String {
    let mut styled = html.to_string();
    for (tag, style) in ELEMENT_STYLES {
        // Attribute form first, so freshly styled bare tags are not matched again
        styled = styled
            .replace(&format!("<{} ", tag), &format!("<{} style=\"{}\" ", tag, style))
            .replace(&format!("<{}>", tag), &format!("<{} style=\"{}\">", tag, style));
    }
    format!("<div style=\"{}\">{}</div>", BODY_STYLE, styled)
}
