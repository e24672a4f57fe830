use crate::{reminder::ReminderKind, shared::entity::ID};
use chrono::NaiveDate;
use thiserror::Error;

/// A failure that was isolated during a sweep. None of these abort the
/// sweep, they are collected so that operators can see what went wrong.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SweepFailure {
    #[error("Unable to discover events needing reminders: {reason}")]
    Discovery { reason: String },
    #[error("Unable to fetch participants of event {event_id}: {reason}")]
    ParticipantLookup { event_id: ID, reason: String },
    #[error("Unable to create {kind} reminder notifications for event {event_id}: {reason}")]
    BulkNotification {
        event_id: ID,
        kind: ReminderKind,
        reason: String,
    },
    #[error("Unable to send {kind} reminder for event {event_id} to user {user_id}: {reason}")]
    Send {
        event_id: ID,
        user_id: ID,
        kind: ReminderKind,
        reason: String,
    },
}

impl SweepFailure {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Discovery { .. } => "discovery",
            Self::ParticipantLookup { .. } => "participant_lookup",
            Self::BulkNotification { .. } => "bulk_notification",
            Self::Send { .. } => "send",
        }
    }
}

/// Outcome of one sweep
#[derive(Debug, Clone, PartialEq)]
pub struct SweepSummary {
    /// The day the sweep considered to be today
    pub sweep_date: NaiveDate,
    pub events_discovered: usize,
    /// Events for which notifications and emails were attempted
    pub events_processed: usize,
    /// Events without anyone left to remind, or whose participants could not be fetched
    pub events_skipped: usize,
    pub notifications_created: usize,
    pub emails_sent: usize,
    pub emails_failed: usize,
    /// Participants that had already been reminded earlier the same day
    pub duplicates_skipped: usize,
    pub failures: Vec<SweepFailure>,
}

impl SweepSummary {
    pub fn new(sweep_date: NaiveDate) -> Self {
        Self {
            sweep_date,
            events_discovered: 0,
            events_processed: 0,
            events_skipped: 0,
            notifications_created: 0,
            emails_sent: 0,
            emails_failed: 0,
            duplicates_skipped: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_failure(&mut self, failure: SweepFailure) {
        if let SweepFailure::Send { .. } = failure {
            self.emails_failed += 1;
        }
        self.failures.push(failure);
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
