use super::{IMailer, MailError};
use crate::config::MailConfig;
use charity_reminders_domain::EmailMessage;
use reqwest::Client;
use serde::Deserialize;

/// Sends emails through the Mailgun messages api
pub struct MailgunMailer {
    client: Client,
    api_base: String,
    api_key: Option<String>,
    domain: Option<String>,
    sender: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MailgunResponse {
    id: String,
}

impl MailgunMailer {
    pub fn new(config: &MailConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.send_timeout).build()?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            domain: config.domain.clone(),
            sender: config.sender(),
        })
    }
}

#[async_trait::async_trait]
impl IMailer for MailgunMailer {
    async fn send(&self, message: &EmailMessage) -> Result<String, MailError> {
        let (api_key, domain, sender) = match (&self.api_key, &self.domain, &self.sender) {
            (Some(api_key), Some(domain), Some(sender)) => (api_key, domain, sender),
            _ => return Err(MailError::NotConfigured),
        };

        let params = [
            ("from", sender.as_str()),
            ("to", message.to.as_str()),
            ("subject", message.subject.as_str()),
            ("html", message.html.as_str()),
        ];
        let res = self
            .client
            .post(&format!("{}/v3/{}/messages", self.api_base, domain))
            .basic_auth("api", Some(api_key))
            .form(&params)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = res.json::<MailgunResponse>().await?;
        Ok(body.id)
    }
}
