use crate::{APIResponse, BaseClient};
use charity_reminders_api_structs::send_event_reminders;
use reqwest::StatusCode;
use std::sync::Arc;

#[derive(Clone)]
pub struct ReminderClient {
    base: Arc<BaseClient>,
}

impl ReminderClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    /// Runs a reminder sweep right away and waits for its summary
    pub async fn trigger_sweep(&self) -> APIResponse<send_event_reminders::APIResponse> {
        self.base
            .post((), "reminders/sweep".into(), StatusCode::OK)
            .await
    }
}
