use charity_reminders_domain::{ReminderKind, SweepFailure, SweepSummary, ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SweepFailureDTO {
    pub kind: String,
    pub event_id: Option<ID>,
    pub user_id: Option<ID>,
    pub reminder_kind: Option<ReminderKind>,
    pub reason: String,
}

impl SweepFailureDTO {
    pub fn new(failure: &SweepFailure) -> Self {
        let kind = failure.kind_name().to_string();
        match failure {
            SweepFailure::Discovery { reason } => Self {
                kind,
                event_id: None,
                user_id: None,
                reminder_kind: None,
                reason: reason.clone(),
            },
            SweepFailure::ParticipantLookup { event_id, reason } => Self {
                kind,
                event_id: Some(*event_id),
                user_id: None,
                reminder_kind: None,
                reason: reason.clone(),
            },
            SweepFailure::BulkNotification {
                event_id,
                kind: reminder_kind,
                reason,
            } => Self {
                kind,
                event_id: Some(*event_id),
                user_id: None,
                reminder_kind: Some(*reminder_kind),
                reason: reason.clone(),
            },
            SweepFailure::Send {
                event_id,
                user_id,
                kind: reminder_kind,
                reason,
            } => Self {
                kind,
                event_id: Some(*event_id),
                user_id: Some(*user_id),
                reminder_kind: Some(*reminder_kind),
                reason: reason.clone(),
            },
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SweepSummaryDTO {
    pub sweep_date: NaiveDate,
    pub events_discovered: usize,
    pub events_processed: usize,
    pub events_skipped: usize,
    pub notifications_created: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    pub duplicates_skipped: usize,
    pub failures: Vec<SweepFailureDTO>,
}

impl SweepSummaryDTO {
    pub fn new(summary: &SweepSummary) -> Self {
        Self {
            sweep_date: summary.sweep_date,
            events_discovered: summary.events_discovered,
            events_processed: summary.events_processed,
            events_skipped: summary.events_skipped,
            notifications_created: summary.notifications_created,
            emails_sent: summary.emails_sent,
            emails_failed: summary.emails_failed,
            duplicates_skipped: summary.duplicates_skipped,
            failures: summary.failures.iter().map(SweepFailureDTO::new).collect(),
        }
    }
}
