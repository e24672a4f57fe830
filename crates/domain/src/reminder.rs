use crate::{participant::Participant, shared::entity::ID};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// How long before an event a reminder is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    /// Seven days before the event
    Week,
    /// The day before the event
    Day,
}

impl ReminderKind {
    pub const ALL: [ReminderKind; 2] = [ReminderKind::Week, ReminderKind::Day];

    pub fn days_before(&self) -> i64 {
        match self {
            Self::Week => 7,
            Self::Day => 1,
        }
    }

    /// Determines which reminder, if any, an event on `event_date` should get on `today`.
    /// Events today or in the past never get one.
    pub fn for_event_date(event_date: NaiveDate, today: NaiveDate) -> Option<Self> {
        let days_until = event_date.signed_duration_since(today).num_days();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.days_before() == days_until)
    }

    /// The event date that triggers this reminder kind on `today`
    pub fn event_date_for(&self, today: NaiveDate) -> NaiveDate {
        today + Duration::days(self.days_before())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Day => "day",
        }
    }

    /// Human readable framing of the deadline used in emails and notifications
    pub fn lead_phrase(&self) -> &'static str {
        match self {
            Self::Week => "starts in 7 days",
            Self::Day => "starts tomorrow",
        }
    }
}

impl Display for ReminderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReminderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "week" => Ok(Self::Week),
            "day" => Ok(Self::Day),
            other => Err(format!("Unknown reminder kind: {}", other)),
        }
    }
}

/// An event that needs a reminder today, as returned by discovery
#[derive(Debug, Clone, PartialEq)]
pub struct EventReminder {
    pub event_id: ID,
    pub title: String,
    pub date: NaiveDate,
    pub location: String,
    pub start_time: Option<NaiveTime>,
    pub kind: ReminderKind,
}

/// Working set for one event during a sweep. Lives only for the
/// duration of that sweep.
#[derive(Debug, Clone)]
pub struct ReminderBatch {
    pub reminder: EventReminder,
    /// Participants still missing the in-app notification
    pub to_notify: Vec<Participant>,
    /// Participants still missing the email
    pub to_email: Vec<Participant>,
}

impl ReminderBatch {
    pub fn new(reminder: EventReminder, participants: Vec<Participant>) -> Self {
        Self {
            reminder,
            to_notify: participants.clone(),
            to_email: participants,
        }
    }

    /// Drops participants that were already reminded through `channel`.
    /// Returns how many were dropped.
    pub fn retain_undelivered(&mut self, channel: DeliveryChannel, delivered: &[ID]) -> usize {
        let participants = match channel {
            DeliveryChannel::Notification => &mut self.to_notify,
            DeliveryChannel::Email => &mut self.to_email,
        };
        let before = participants.len();
        participants.retain(|p| !delivered.contains(&p.user_id));
        before - participants.len()
    }

    /// Nothing left to deliver on any channel
    pub fn is_complete(&self) -> bool {
        self.to_notify.is_empty() && self.to_email.is_empty()
    }

    /// Everyone that still misses the reminder on at least one channel
    pub fn user_ids(&self) -> Vec<ID> {
        let mut ids = self
            .to_notify
            .iter()
            .chain(self.to_email.iter())
            .map(|p| p.user_id)
            .collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// How a reminder reaches a participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryChannel {
    Notification,
    Email,
}

impl DeliveryChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Notification => "notification",
            Self::Email => "email",
        }
    }
}

impl Display for DeliveryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger entry stating that a reminder was stored as a notification or
/// accepted by the mail provider. Re-running a sweep on the same day skips
/// what the ledger already holds, per channel.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderDelivery {
    pub event_id: ID,
    pub user_id: ID,
    pub kind: ReminderKind,
    pub channel: DeliveryChannel,
    pub sweep_date: NaiveDate,
}
