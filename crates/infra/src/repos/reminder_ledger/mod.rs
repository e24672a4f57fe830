mod inmemory;
mod postgres;

use charity_reminders_domain::{DeliveryChannel, ReminderDelivery, ReminderKind, ID};
use chrono::NaiveDate;
pub use inmemory::InMemoryReminderLedgerRepo;
pub use postgres::PostgresReminderLedgerRepo;

/// Keeps track of which reminders were stored as notifications or handed to
/// the mail provider, per channel, so that re-running a sweep on the same day
/// does not deliver duplicates.
#[async_trait::async_trait]
pub trait IReminderLedgerRepo: Send + Sync {
    async fn find_delivered(
        &self,
        event_id: &ID,
        kind: ReminderKind,
        channel: DeliveryChannel,
        sweep_date: NaiveDate,
    ) -> anyhow::Result<Vec<ID>>;
    /// Recording the same delivery twice is not an error
    async fn insert(&self, delivery: &ReminderDelivery) -> anyhow::Result<()>;
}
