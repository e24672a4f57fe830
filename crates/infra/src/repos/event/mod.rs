mod inmemory;
mod postgres;

use charity_reminders_domain::EventReminder;
use chrono::NaiveDate;
pub use inmemory::InMemoryEventRepo;
pub use postgres::PostgresEventRepo;

#[async_trait::async_trait]
pub trait IEventRepo: Send + Sync {
    /// `OPEN` events taking place exactly seven or exactly one day after `today`,
    /// tagged with the reminder they are due for
    async fn find_needing_reminders(&self, today: NaiveDate) -> anyhow::Result<Vec<EventReminder>>;
}
