use super::INotificationRepo;
use charity_reminders_domain::Notification;
use sqlx::PgPool;

pub struct PostgresNotificationRepo {
    pool: PgPool,
}

impl PostgresNotificationRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl INotificationRepo for PostgresNotificationRepo {
    async fn bulk_insert(&self, notifications: &[Notification]) -> anyhow::Result<()> {
        if notifications.is_empty() {
            return Ok(());
        }

        let mut user_ids = Vec::with_capacity(notifications.len());
        let mut event_ids = Vec::with_capacity(notifications.len());
        let mut kinds = Vec::with_capacity(notifications.len());
        let mut titles = Vec::with_capacity(notifications.len());
        let mut messages = Vec::with_capacity(notifications.len());
        for n in notifications {
            user_ids.push(n.user_id.inner());
            event_ids.push(n.event_id.inner());
            kinds.push(n.kind.as_str().to_string());
            titles.push(n.title.clone());
            messages.push(n.message.clone());
        }

        sqlx::query(
            r#"
            INSERT INTO notifications
                (user_id, type, title, message, related_event_id, reminder_kind)
            SELECT t.user_id, $1, t.title, t.message, t.event_id, t.kind
            FROM UNNEST($2::bigint[], $3::bigint[], $4::text[], $5::text[], $6::text[])
                AS t(user_id, event_id, kind, title, message)
            "#,
        )
        .bind(Notification::EVENT_REMINDER_TYPE)
        .bind(&user_ids)
        .bind(&event_ids)
        .bind(&kinds)
        .bind(&titles)
        .bind(&messages)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
