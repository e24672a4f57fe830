use super::IParticipantRepo;
use crate::repos::shared::inmemory_repo::*;
use charity_reminders_domain::{Enrollment, Participant, ID};

pub struct InMemoryParticipantRepo {
    enrollments: std::sync::Mutex<Vec<Enrollment>>,
}

impl InMemoryParticipantRepo {
    pub fn new() -> Self {
        Self {
            enrollments: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, enrollment: &Enrollment) {
        insert(enrollment, &self.enrollments);
    }
}

impl Default for InMemoryParticipantRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IParticipantRepo for InMemoryParticipantRepo {
    async fn find_active_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Participant>> {
        let participants = find_by(&self.enrollments, |e| {
            e.event_id == *event_id && e.is_active()
        })
        .into_iter()
        .map(|e| e.participant)
        .collect();
        Ok(participants)
    }
}
