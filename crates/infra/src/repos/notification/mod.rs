mod inmemory;
mod postgres;

use charity_reminders_domain::Notification;
pub use inmemory::InMemoryNotificationRepo;
pub use postgres::PostgresNotificationRepo;

#[async_trait::async_trait]
pub trait INotificationRepo: Send + Sync {
    /// Stores all the notifications in one call
    async fn bulk_insert(&self, notifications: &[Notification]) -> anyhow::Result<()>;
}
