mod base;
mod reminder;
mod status;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};
pub use charity_reminders_api_structs::dtos::*;
pub use charity_reminders_domain::{ReminderKind, ID};
use reminder::ReminderClient;
use status::StatusClient;
use std::sync::Arc;

// Domain
pub use charity_reminders_api_structs::dtos::SweepFailureDTO as SweepFailure;
pub use charity_reminders_api_structs::dtos::SweepSummaryDTO as SweepSummary;

/// Charity Reminders SDK
///
/// Methods for operating the reminder service over its HTTP api.
#[derive(Clone)]
pub struct ReminderSDK {
    pub reminder: ReminderClient,
    pub status: StatusClient,
}

impl ReminderSDK {
    pub fn new<T: Into<String>>(address: String, admin_key: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_admin_key(admin_key.into());
        let base = Arc::new(base);
        let reminder = ReminderClient::new(base.clone());
        let status = StatusClient::new(base);

        Self { reminder, status }
    }
}
