use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};

/// A user enrolled in an event, as far as reminders are concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: ID,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EnrollmentStatus {
    /// Approved by an administrator, the only status that receives reminders
    Active,
    Pending,
    Rejected,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Pending => "PENDING",
            Self::Rejected => "REJECTED",
        }
    }
}

/// Link between a `Participant` and the event they signed up for
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub event_id: ID,
    pub participant: Participant,
    pub status: EnrollmentStatus,
}

impl Enrollment {
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }
}
