use crate::{
    reminder::{EventReminder, ReminderKind},
    shared::entity::ID,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventStatus {
    Open,
    Closed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }
}

/// Anything that is not `OPEN` is treated as closed so that an unexpected
/// status value never results in reminders being sent.
impl From<&str> for EventStatus {
    fn from(status: &str) -> Self {
        if status.trim().eq_ignore_ascii_case("OPEN") {
            Self::Open
        } else {
            Self::Closed
        }
    }
}

impl Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A charity event that volunteers and scholars can enroll in.
///
/// Events are created and updated by the event management flows of the
/// admin dashboard; the reminder service only ever reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct CharityEvent {
    pub id: ID,
    pub title: String,
    /// Calendar date of the event, without any timezone
    pub date: NaiveDate,
    pub location: String,
    /// Events without a start time are shown as "TBA" in reminders
    pub start_time: Option<NaiveTime>,
    pub status: EventStatus,
}

impl CharityEvent {
    /// The reminder that is due for this event on `today`, if any.
    /// Only `OPEN` events exactly one or seven days ahead qualify.
    pub fn reminder_due(&self, today: NaiveDate) -> Option<ReminderKind> {
        if self.status != EventStatus::Open {
            return None;
        }
        ReminderKind::for_event_date(self.date, today)
    }

    pub fn to_reminder(&self, kind: ReminderKind) -> EventReminder {
        EventReminder {
            event_id: self.id,
            title: self.title.clone(),
            date: self.date,
            location: self.location.clone(),
            start_time: self.start_time,
            kind,
        }
    }
}
