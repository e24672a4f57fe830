use super::IEventRepo;
use charity_reminders_domain::{CharityEvent, EventReminder, EventStatus, ReminderKind};
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, PgPool};

pub struct PostgresEventRepo {
    pool: PgPool,
}

impl PostgresEventRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct EventRaw {
    event_id: i64,
    title: String,
    event_date: NaiveDate,
    location: Option<String>,
    start_time: Option<NaiveTime>,
    status: String,
}

impl Into<CharityEvent> for EventRaw {
    fn into(self) -> CharityEvent {
        CharityEvent {
            id: self.event_id.into(),
            title: self.title,
            date: self.event_date,
            location: self.location.unwrap_or_default(),
            start_time: self.start_time,
            status: EventStatus::from(self.status.as_str()),
        }
    }
}

#[async_trait::async_trait]
impl IEventRepo for PostgresEventRepo {
    async fn find_needing_reminders(&self, today: NaiveDate) -> anyhow::Result<Vec<EventReminder>> {
        let events: Vec<EventRaw> = sqlx::query_as(
            r#"
            SELECT e.event_id, e.title, e.event_date, e.location, e.start_time, e.status
            FROM events AS e
            WHERE e.status = $1
                AND e.event_date > $2
                AND e.event_date IN ($3, $4)
            ORDER BY e.event_date, e.event_id
            "#,
        )
        .bind(EventStatus::Open.as_str())
        .bind(today)
        .bind(ReminderKind::Week.event_date_for(today))
        .bind(ReminderKind::Day.event_date_for(today))
        .fetch_all(&self.pool)
        .await?;

        // Kind is assigned by the domain rule
        Ok(events
            .into_iter()
            .map(|raw| -> CharityEvent { raw.into() })
            .filter_map(|e| e.reminder_due(today).map(|kind| e.to_reminder(kind)))
            .collect())
    }
}
