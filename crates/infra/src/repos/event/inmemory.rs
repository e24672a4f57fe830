use super::IEventRepo;
use crate::repos::shared::inmemory_repo::*;
use charity_reminders_domain::{CharityEvent, EventReminder};
use chrono::NaiveDate;

pub struct InMemoryEventRepo {
    events: std::sync::Mutex<Vec<CharityEvent>>,
}

impl InMemoryEventRepo {
    pub fn new() -> Self {
        Self {
            events: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Events are owned by the dashboard, this is only used to seed tests
    pub fn insert(&self, event: &CharityEvent) {
        insert(event, &self.events);
    }
}

impl Default for InMemoryEventRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IEventRepo for InMemoryEventRepo {
    async fn find_needing_reminders(&self, today: NaiveDate) -> anyhow::Result<Vec<EventReminder>> {
        let reminders = find_by(&self.events, |e| e.reminder_due(today).is_some())
            .into_iter()
            .filter_map(|e| e.reminder_due(today).map(|kind| e.to_reminder(kind)))
            .collect();
        Ok(reminders)
    }
}
