use super::{IMailer, MailError};
use charity_reminders_domain::EmailMessage;
use std::sync::Mutex;
use tracing::info;

/// Mailer that keeps messages in memory and logs them instead of
/// delivering. Recipients can be scripted to fail.
pub struct InMemoryMailer {
    attempts: Mutex<Vec<String>>,
    sent: Mutex<Vec<EmailMessage>>,
    failing_recipients: Mutex<Vec<String>>,
}

impl InMemoryMailer {
    pub fn new() -> Self {
        Self {
            attempts: Mutex::new(Vec::new()),
            sent: Mutex::new(Vec::new()),
            failing_recipients: Mutex::new(Vec::new()),
        }
    }

    /// Every send to `recipient` will be rejected
    pub fn fail_for(&self, recipient: &str) {
        lock(&self.failing_recipients).push(recipient.to_string());
    }

    pub fn stop_failing_for(&self, recipient: &str) {
        lock(&self.failing_recipients).retain(|r| r != recipient);
    }

    /// Recipients of every send attempt, in order, including rejected ones
    pub fn attempted_recipients(&self) -> Vec<String> {
        lock(&self.attempts).clone()
    }

    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        lock(&self.sent).clone()
    }
}

impl Default for InMemoryMailer {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait::async_trait]
impl IMailer for InMemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<String, MailError> {
        lock(&self.attempts).push(message.to.clone());

        if lock(&self.failing_recipients).contains(&message.to) {
            return Err(MailError::Rejected {
                status: 550,
                body: format!("Mailbox unavailable: {}", message.to),
            });
        }

        let mut sent = lock(&self.sent);
        sent.push(message.clone());
        let id = format!("<inmemory-{}@localhost>", sent.len());
        info!(
            "Email {} to {} with subject: {}",
            id, message.to, message.subject
        );
        Ok(id)
    }
}
