use super::INotificationRepo;
use crate::repos::shared::inmemory_repo::*;
use charity_reminders_domain::Notification;

pub struct InMemoryNotificationRepo {
    notifications: std::sync::Mutex<Vec<Notification>>,
}

impl InMemoryNotificationRepo {
    pub fn new() -> Self {
        Self {
            notifications: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn find_all(&self) -> Vec<Notification> {
        find_by(&self.notifications, |_| true)
    }
}

impl Default for InMemoryNotificationRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotificationRepo for InMemoryNotificationRepo {
    async fn bulk_insert(&self, notifications: &[Notification]) -> anyhow::Result<()> {
        insert_many(notifications, &self.notifications);
        Ok(())
    }
}
