mod inmemory;
mod mailgun;

use crate::config::{MailConfig, MailTransport};
use charity_reminders_domain::{EmailMessage, EmailTemplate, TemplateError, Url};
pub use inmemory::InMemoryMailer;
pub use mailgun::MailgunMailer;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum MailError {
    #[error("Mail service credentials are not configured")]
    NotConfigured,
    #[error("Mail provider did not respond in time")]
    Timeout,
    #[error("Request to mail provider failed: {0}")]
    Request(String),
    #[error("Mail provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error(transparent)]
    Compose(#[from] TemplateError),
}

impl From<reqwest::Error> for MailError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e.to_string())
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigurationError {
    #[error("Mail service is not configured, missing environment variables: {}", .0.join(", "))]
    MissingMailCredentials(Vec<&'static str>),
}

/// Outbound mail client. One instance is created at startup and shared by
/// every sweep.
#[async_trait::async_trait]
pub trait IMailer: Send + Sync {
    /// Hands the message to the provider and returns the provider message id
    async fn send(&self, message: &EmailMessage) -> Result<String, MailError>;
}

/// Builds the mail client for the configured transport. Credentials are not
/// checked here, see `verify_mail_service_configured`.
pub fn create_mailer(config: &MailConfig) -> anyhow::Result<Arc<dyn IMailer>> {
    let mailer: Arc<dyn IMailer> = match config.transport {
        MailTransport::Mailgun => Arc::new(MailgunMailer::new(config)?),
        MailTransport::Log => {
            info!("MAIL_TRANSPORT is set to log, emails will only be logged");
            Arc::new(InMemoryMailer::new())
        }
    };
    Ok(mailer)
}

/// Checks that the credentials needed to send mail are present. Meant to be
/// called once when the process boots.
pub fn verify_mail_service_configured(config: &MailConfig) -> Result<(), ConfigurationError> {
    if config.transport == MailTransport::Log {
        return Ok(());
    }

    let mut missing = Vec::new();
    if config.api_key.is_none() {
        missing.push("MAILGUN_API_KEY");
    }
    if config.domain.is_none() {
        missing.push("MAILGUN_DOMAIN");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigurationError::MissingMailCredentials(missing))
    }
}

pub async fn compose_and_send(
    mailer: &dyn IMailer,
    template: &EmailTemplate,
    to: &str,
    frontend_url: &Url,
) -> Result<String, MailError> {
    let message = template.compose(to, frontend_url)?;
    mailer.send(&message).await
}
