use crate::{
    participant::Participant,
    reminder::{EventReminder, ReminderKind},
};
use chrono::{NaiveDate, NaiveTime};
use handlebars::Handlebars;
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// A fully composed outbound email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Everything the event reminder template needs
#[derive(Debug, Clone, PartialEq)]
pub struct EventReminderEmail {
    pub participant_name: String,
    pub event_title: String,
    pub date: NaiveDate,
    pub location: String,
    pub start_time: Option<NaiveTime>,
    pub kind: ReminderKind,
}

impl EventReminderEmail {
    pub fn new(participant: &Participant, reminder: &EventReminder) -> Self {
        Self {
            participant_name: participant.name.clone(),
            event_title: reminder.title.clone(),
            date: reminder.date,
            location: reminder.location.clone(),
            start_time: reminder.start_time,
            kind: reminder.kind,
        }
    }

    fn subject(&self) -> String {
        format!("Reminder: {} {}", self.event_title, self.kind.lead_phrase())
    }

    fn call_to_action(&self) -> &'static str {
        match self.kind {
            ReminderKind::Week => {
                "Please mark your calendar and let the organizers know early if your plans change."
            }
            ReminderKind::Day => {
                "Please arrive a few minutes early. If you can no longer attend, let the organizers know as soon as possible."
            }
        }
    }

    fn html(&self) -> Result<String, TemplateError> {
        let start_time = self
            .start_time
            .map(format_start_time)
            .unwrap_or_else(|| "TBA".to_string());
        render(
            EVENT_REMINDER_TEMPLATE,
            &EventReminderData {
                name: &self.participant_name,
                title: &self.event_title,
                lead: self.kind.lead_phrase(),
                date: format_event_date(self.date),
                time: start_time,
                location: &self.location,
                call_to_action: self.call_to_action(),
            },
        )
    }
}

const EVENT_REMINDER_TEMPLATE: &str = include_str!("templates/event_reminder.hbs");
const ACCOUNT_ACTION_TEMPLATE: &str = include_str!("templates/account_action.hbs");

#[derive(Serialize)]
struct EventReminderData<'a> {
    name: &'a str,
    title: &'a str,
    lead: &'a str,
    date: String,
    time: String,
    location: &'a str,
    call_to_action: &'a str,
}

#[derive(Serialize)]
struct AccountActionData<'a> {
    name: &'a str,
    intro: &'a str,
    button: &'a str,
    link: &'a str,
    outro: &'a str,
}

#[derive(Error, Debug)]
#[error("Unable to render email template: {0}")]
pub struct TemplateError(String);

/// Renders with html escaping on, missing fields are errors
fn render<T: Serialize>(template: &str, data: &T) -> Result<String, TemplateError> {
    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(true);
    handlebars
        .render_template(template, data)
        .map_err(|e| TemplateError(e.to_string()))
}

/// The kinds of email the platform sends
#[derive(Debug, Clone, PartialEq)]
pub enum EmailTemplate {
    Verification { name: String, token: String },
    PasswordReset { name: String, token: String },
    EventReminder(EventReminderEmail),
}

impl EmailTemplate {
    /// Renders the template for `to`. Rendering is deterministic: the same
    /// input always yields the same subject and body.
    pub fn compose(&self, to: &str, frontend_url: &Url) -> Result<EmailMessage, TemplateError> {
        let (subject, html) = match self {
            Self::Verification { name, token } => {
                let link = frontend_link(frontend_url, "verify-email", token);
                (
                    "Verify your email address".to_string(),
                    render(
                        ACCOUNT_ACTION_TEMPLATE,
                        &AccountActionData {
                            name,
                            intro: "Thanks for signing up! Please confirm your email address to activate your account.",
                            button: "Verify email",
                            link: link.as_str(),
                            outro: "If you did not create an account, you can safely ignore this email.",
                        },
                    )?,
                )
            }
            Self::PasswordReset { name, token } => {
                let link = frontend_link(frontend_url, "reset-password", token);
                (
                    "Reset your password".to_string(),
                    render(
                        ACCOUNT_ACTION_TEMPLATE,
                        &AccountActionData {
                            name,
                            intro: "We received a request to reset the password for your account.",
                            button: "Reset password",
                            link: link.as_str(),
                            outro: "If you did not request a password reset, no action is needed.",
                        },
                    )?,
                )
            }
            Self::EventReminder(reminder) => (reminder.subject(), reminder.html()?),
        };

        Ok(EmailMessage {
            to: to.to_string(),
            subject,
            html,
        })
    }
}

/// e.g. "Monday, January 8, 2024"
pub fn format_event_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// e.g. "9:00 AM"
pub fn format_start_time(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

// `Url` percent-encodes quotes and angle brackets, so the link is rendered unescaped
fn frontend_link(frontend_url: &Url, page: &str, token: &str) -> Url {
    let mut link = frontend_url.clone();
    let path = format!("{}/{}", link.path().trim_end_matches('/'), page);
    link.set_path(&path);
    link.set_query(None);
    link.query_pairs_mut().append_pair("token", token);
    link
}
