use crate::{
    email::format_event_date,
    participant::Participant,
    reminder::{EventReminder, ReminderKind},
    shared::entity::ID,
};

/// In-app reminder shown in the participant's notification feed
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub user_id: ID,
    pub event_id: ID,
    pub kind: ReminderKind,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub const EVENT_REMINDER_TYPE: &'static str = "event_reminder";

    pub fn event_reminder(participant: &Participant, reminder: &EventReminder) -> Self {
        Self {
            user_id: participant.user_id,
            event_id: reminder.event_id,
            kind: reminder.kind,
            title: format!("Upcoming event: {}", reminder.title),
            message: format!(
                "{} {} on {} at {}.",
                reminder.title,
                reminder.kind.lead_phrase(),
                format_event_date(reminder.date),
                reminder.location
            ),
        }
    }
}
