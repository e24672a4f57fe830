mod event;
mod notification;
mod participant;
mod reminder_ledger;
mod shared;

pub use event::{IEventRepo, InMemoryEventRepo, PostgresEventRepo};
pub use notification::{INotificationRepo, InMemoryNotificationRepo, PostgresNotificationRepo};
pub use participant::{IParticipantRepo, InMemoryParticipantRepo, PostgresParticipantRepo};
pub use reminder_ledger::{
    IReminderLedgerRepo, InMemoryReminderLedgerRepo, PostgresReminderLedgerRepo,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct Repos {
    pub events: Arc<dyn IEventRepo>,
    pub participants: Arc<dyn IParticipantRepo>,
    pub notifications: Arc<dyn INotificationRepo>,
    pub reminder_ledger: Arc<dyn IReminderLedgerRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        Ok(Self {
            events: Arc::new(PostgresEventRepo::new(pool.clone())),
            participants: Arc::new(PostgresParticipantRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool.clone())),
            reminder_ledger: Arc::new(PostgresReminderLedgerRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            events: Arc::new(InMemoryEventRepo::new()),
            participants: Arc::new(InMemoryParticipantRepo::new()),
            notifications: Arc::new(InMemoryNotificationRepo::new()),
            reminder_ledger: Arc::new(InMemoryReminderLedgerRepo::new()),
        }
    }
}
