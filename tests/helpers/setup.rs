use charity_reminders_api::Application;
use charity_reminders_domain::{
    CharityEvent, Enrollment, EnrollmentStatus, EventStatus, Participant, ID,
};
use charity_reminders_infra::{
    Config, InMemoryEventRepo, InMemoryMailer, InMemoryNotificationRepo, InMemoryParticipantRepo,
    ReminderContext, StaticTimeSys,
};
use charity_reminders_sdk::ReminderSDK;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

// 2024-01-01T10:00:00Z
pub const NOW_MILLIS: i64 = 1704103200000;

pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub struct TestApp {
    pub config: Config,
    pub events: Arc<InMemoryEventRepo>,
    pub participants: Arc<InMemoryParticipantRepo>,
    pub notifications: Arc<InMemoryNotificationRepo>,
    pub mailer: Arc<InMemoryMailer>,
}

impl TestApp {
    pub fn insert_event(&self, id: i64, title: &str, days_ahead: i64) {
        self.events.insert(&CharityEvent {
            id: ID::new(id),
            title: title.into(),
            date: today() + Duration::days(days_ahead),
            location: "Sunset Beach".into(),
            start_time: None,
            status: EventStatus::Open,
        });
    }

    pub fn enroll(&self, event_id: i64, user_id: i64, name: &str, status: EnrollmentStatus) {
        self.participants.insert(&Enrollment {
            event_id: ID::new(event_id),
            participant: Participant {
                user_id: ID::new(user_id),
                name: name.into(),
                email: format!("{}@x.com", name.to_lowercase()),
            },
            status,
        });
    }
}

/// In-memory context with a frozen clock. The startup sweep is disabled.
pub fn build_context() -> (ReminderContext, TestApp) {
    let mut ctx = ReminderContext::create_inmemory();
    ctx.config.port = 0; // Random port
    ctx.config.skip_startup_sweep = true;
    ctx.sys = Arc::new(StaticTimeSys(NOW_MILLIS));

    let events = Arc::new(InMemoryEventRepo::new());
    let participants = Arc::new(InMemoryParticipantRepo::new());
    let notifications = Arc::new(InMemoryNotificationRepo::new());
    let mailer = Arc::new(InMemoryMailer::new());
    ctx.repos.events = events.clone();
    ctx.repos.participants = participants.clone();
    ctx.repos.notifications = notifications.clone();
    ctx.mailer = mailer.clone();

    let app = TestApp {
        config: ctx.config.clone(),
        events,
        participants,
        notifications,
        mailer,
    };
    (ctx, app)
}

// Launch the application as a background task
pub async fn spawn(ctx: ReminderContext) -> (ReminderSDK, String) {
    let admin_key = ctx.config.admin_secret_code.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let sdk = ReminderSDK::new(address.clone(), admin_key);
    (sdk, address)
}

pub async fn spawn_app() -> (TestApp, ReminderSDK, String) {
    let (ctx, app) = build_context();
    let (sdk, address) = spawn(ctx).await;
    (app, sdk, address)
}
