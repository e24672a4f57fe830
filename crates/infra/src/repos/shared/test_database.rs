use chrono::Utc;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::sync::atomic::{AtomicI64, Ordering};

/// Platform tables the repos read from and write to. They are owned by the
/// wider platform so the crate migrations do not create them.
const PLATFORM_TABLES: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        user_id BIGINT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS events (
        event_id BIGINT PRIMARY KEY,
        title TEXT NOT NULL,
        event_date DATE NOT NULL,
        location TEXT,
        start_time TIME,
        status TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS event_participants (
        event_id BIGINT NOT NULL,
        user_id BIGINT NOT NULL,
        status TEXT NOT NULL,
        PRIMARY KEY (event_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS notifications (
        notification_id BIGSERIAL PRIMARY KEY,
        user_id BIGINT NOT NULL,
        type TEXT NOT NULL,
        title TEXT NOT NULL,
        message TEXT NOT NULL,
        related_event_id BIGINT,
        reminder_kind TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
];

/// Connects to `DATABASE_URL` and makes sure every table the repos touch
/// exists. `None` when no database is configured, the calling test is then
/// skipped.
pub async fn postgres_pool() -> Option<PgPool> {
    let connection_string = std::env::var("DATABASE_URL").ok()?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&connection_string)
        .await
        .expect("To connect to postgres");

    // Tests run concurrently and CREATE TABLE IF NOT EXISTS is not safe to race
    let mut tx = pool.begin().await.expect("To start transaction");
    sqlx::query("SELECT pg_advisory_xact_lock(20240101)")
        .execute(&mut *tx)
        .await
        .expect("To take schema lock");
    for statement in PLATFORM_TABLES {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .expect("To create platform table");
    }
    tx.commit().await.expect("To commit schema");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("To run migrations");

    Some(pool)
}

/// Id that no other test run has used, so tests can share one database
pub fn unique_id() -> i64 {
    static NEXT: AtomicI64 = AtomicI64::new(0);
    Utc::now().timestamp_micros() * 1000 + NEXT.fetch_add(1, Ordering::SeqCst) % 1000
}
