mod inmemory;
mod postgres;

use charity_reminders_domain::{Participant, ID};
pub use inmemory::InMemoryParticipantRepo;
pub use postgres::PostgresParticipantRepo;

#[async_trait::async_trait]
pub trait IParticipantRepo: Send + Sync {
    /// Participants whose enrollment in the event is `ACTIVE`
    async fn find_active_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Participant>>;
}
