use super::IReminderLedgerRepo;
use charity_reminders_domain::{DeliveryChannel, ReminderDelivery, ReminderKind, ID};
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool};

pub struct PostgresReminderLedgerRepo {
    pool: PgPool,
}

impl PostgresReminderLedgerRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeliveredRaw {
    user_id: i64,
}

#[async_trait::async_trait]
impl IReminderLedgerRepo for PostgresReminderLedgerRepo {
    async fn find_delivered(
        &self,
        event_id: &ID,
        kind: ReminderKind,
        channel: DeliveryChannel,
        sweep_date: NaiveDate,
    ) -> anyhow::Result<Vec<ID>> {
        let delivered: Vec<DeliveredRaw> = sqlx::query_as(
            r#"
            SELECT l.user_id
            FROM event_reminder_ledger AS l
            WHERE l.event_id = $1 AND l.reminder_kind = $2 AND l.channel = $3 AND l.sweep_date = $4
            "#,
        )
        .bind(event_id.inner())
        .bind(kind.as_str())
        .bind(channel.as_str())
        .bind(sweep_date)
        .fetch_all(&self.pool)
        .await?;

        Ok(delivered.into_iter().map(|d| d.user_id.into()).collect())
    }

    async fn insert(&self, delivery: &ReminderDelivery) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO event_reminder_ledger
                (event_id, user_id, reminder_kind, channel, sweep_date)
            VALUES($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(delivery.event_id.inner())
        .bind(delivery.user_id.inner())
        .bind(delivery.kind.as_str())
        .bind(delivery.channel.as_str())
        .bind(delivery.sweep_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
