mod email;
mod event;
mod notification;
mod participant;
mod reminder;
mod shared;
mod sweep;

pub use email::{
    format_event_date, format_start_time, EmailMessage, EmailTemplate, EventReminderEmail,
    TemplateError,
};
pub use event::{CharityEvent, EventStatus};
pub use notification::Notification;
pub use participant::{Enrollment, EnrollmentStatus, Participant};
pub use reminder::{
    DeliveryChannel, EventReminder, ReminderBatch, ReminderDelivery, ReminderKind,
};
pub use shared::entity::ID;
pub use sweep::{SweepFailure, SweepSummary};
pub use url::Url;
