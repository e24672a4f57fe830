use super::IParticipantRepo;
use charity_reminders_domain::{EnrollmentStatus, Participant, ID};
use sqlx::{FromRow, PgPool};

pub struct PostgresParticipantRepo {
    pool: PgPool,
}

impl PostgresParticipantRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ParticipantRaw {
    user_id: i64,
    name: String,
    email: String,
}

impl Into<Participant> for ParticipantRaw {
    fn into(self) -> Participant {
        Participant {
            user_id: self.user_id.into(),
            name: self.name,
            email: self.email,
        }
    }
}

#[async_trait::async_trait]
impl IParticipantRepo for PostgresParticipantRepo {
    async fn find_active_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Participant>> {
        let participants: Vec<ParticipantRaw> = sqlx::query_as(
            r#"
            SELECT u.user_id, u.name, u.email
            FROM event_participants AS ep
            INNER JOIN users AS u
                ON u.user_id = ep.user_id
            WHERE ep.event_id = $1 AND ep.status = $2
            ORDER BY u.user_id
            "#,
        )
        .bind(event_id.inner())
        .bind(EnrollmentStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(participants.into_iter().map(|p| p.into()).collect())
    }
}
