use super::{discover_events_needing_reminders, get_active_participants};
use crate::{
    error::ApiError,
    shared::{
        auth::protect_admin_route,
        usecase::{execute, UseCase},
    },
};
use actix_web::{rt::time::timeout, web, HttpRequest, HttpResponse};
use charity_reminders_api_structs::send_event_reminders::APIResponse;
use charity_reminders_domain::{
    DeliveryChannel, EmailTemplate, EventReminder, EventReminderEmail, Notification, Participant,
    ReminderBatch, ReminderDelivery, SweepFailure, SweepSummary,
};
use charity_reminders_infra::{compose_and_send, MailError, ReminderContext};
use chrono::NaiveDate;
use tracing::{error, info, warn};

pub async fn send_event_reminders_controller(
    http_req: HttpRequest,
    ctx: web::Data<ReminderContext>,
) -> Result<HttpResponse, ApiError> {
    protect_admin_route(&http_req, &ctx)?;

    let usecase = SendEventRemindersUseCase {
        trigger: SweepTrigger::Manual,
    };
    execute(usecase, &ctx)
        .await
        .map(|summary| HttpResponse::Ok().json(APIResponse::new(&summary)))
        .map_err(ApiError::from)
}

/// What started a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepTrigger {
    /// The daily job scheduler
    Scheduled,
    /// The one-off sweep when the process boots
    Startup,
    /// An administrator through the api
    Manual,
}

/// Sends the `week` and `day` reminders that are due today, both as in-app
/// notifications and as emails, to every active participant.
///
/// Failures are isolated per event and per participant and reported in the
/// returned `SweepSummary`, the sweep itself never fails.
#[derive(Debug)]
pub struct SendEventRemindersUseCase {
    pub trigger: SweepTrigger,
}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for ApiError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for SendEventRemindersUseCase {
    type Response = SweepSummary;

    type Error = UseCaseError;

    const NAME: &'static str = "SendEventReminders";

    async fn execute(&mut self, ctx: &ReminderContext) -> Result<Self::Response, Self::Error> {
        let today = ctx.sys.get_today(&ctx.config.timezone);
        info!("Starting {:?} reminder sweep for {}", self.trigger, today);

        let mut summary = SweepSummary::new(today);
        let reminders = match discover_events_needing_reminders(today, ctx).await {
            Ok(reminders) => reminders,
            Err(failure) => {
                error!("{}", failure);
                summary.record_failure(failure);
                return Ok(summary);
            }
        };
        summary.events_discovered = reminders.len();
        info!("Found {} events needing reminders", reminders.len());

        for reminder in reminders {
            remind_participants(reminder, today, ctx, &mut summary).await;
        }

        info!(
            "Reminder sweep for {} finished. Events processed: {}, skipped: {}. Notifications created: {}. Emails sent: {}, failed: {}, already sent: {}",
            today,
            summary.events_processed,
            summary.events_skipped,
            summary.notifications_created,
            summary.emails_sent,
            summary.emails_failed,
            summary.duplicates_skipped
        );
        Ok(summary)
    }
}

async fn remind_participants(
    reminder: EventReminder,
    today: NaiveDate,
    ctx: &ReminderContext,
    summary: &mut SweepSummary,
) {
    let participants = match get_active_participants(&reminder.event_id, ctx).await {
        Ok(participants) => participants,
        Err(failure) => {
            error!("{}", failure);
            summary.events_skipped += 1;
            summary.record_failure(failure);
            return;
        }
    };
    if participants.is_empty() {
        info!(
            "No active participants for event {} ({}), skipping",
            reminder.event_id, reminder.title
        );
        summary.events_skipped += 1;
        return;
    }

    let mut batch = ReminderBatch::new(reminder, participants);
    for channel in &[DeliveryChannel::Notification, DeliveryChannel::Email] {
        match ctx
            .repos
            .reminder_ledger
            .find_delivered(
                &batch.reminder.event_id,
                batch.reminder.kind,
                *channel,
                today,
            )
            .await
        {
            Ok(delivered) => {
                let dropped = batch.retain_undelivered(*channel, &delivered);
                if *channel == DeliveryChannel::Email {
                    summary.duplicates_skipped += dropped;
                }
            }
            // Rather send a duplicate than miss a reminder
            Err(e) => warn!(
                "Unable to read {} reminder ledger for event {}, reminding all participants. Err: {:?}",
                channel, batch.reminder.event_id, e
            ),
        }
    }
    if batch.is_complete() {
        info!(
            "All participants of event {} already received the {} reminder today",
            batch.reminder.event_id, batch.reminder.kind
        );
        summary.events_skipped += 1;
        return;
    }

    summary.events_processed += 1;
    info!(
        "Sending {} reminders for event {} to users {:?}",
        batch.reminder.kind,
        batch.reminder.event_id,
        batch.user_ids()
    );
    if !batch.to_notify.is_empty() {
        create_notifications(&batch, today, ctx, summary).await;
    }
    send_emails(&batch, today, ctx, summary).await;
}

async fn record_delivery(
    reminder: &EventReminder,
    participant: &Participant,
    channel: DeliveryChannel,
    today: NaiveDate,
    ctx: &ReminderContext,
) {
    let delivery = ReminderDelivery {
        event_id: reminder.event_id,
        user_id: participant.user_id,
        kind: reminder.kind,
        channel,
        sweep_date: today,
    };
    if let Err(e) = ctx.repos.reminder_ledger.insert(&delivery).await {
        warn!(
            "Unable to record reminder delivery {:?} in the ledger. Err: {:?}",
            delivery, e
        );
    }
}

/// A failure here does not stop the emails from going out
async fn create_notifications(
    batch: &ReminderBatch,
    today: NaiveDate,
    ctx: &ReminderContext,
    summary: &mut SweepSummary,
) {
    let notifications = batch
        .to_notify
        .iter()
        .map(|p| Notification::event_reminder(p, &batch.reminder))
        .collect::<Vec<_>>();

    match ctx.repos.notifications.bulk_insert(&notifications).await {
        Ok(_) => {
            summary.notifications_created += notifications.len();
            for participant in &batch.to_notify {
                record_delivery(
                    &batch.reminder,
                    participant,
                    DeliveryChannel::Notification,
                    today,
                    ctx,
                )
                .await;
            }
        }
        Err(e) => {
            let failure = SweepFailure::BulkNotification {
                event_id: batch.reminder.event_id,
                kind: batch.reminder.kind,
                reason: e.to_string(),
            };
            error!("{}", failure);
            summary.record_failure(failure);
        }
    }
}

async fn send_emails(
    batch: &ReminderBatch,
    today: NaiveDate,
    ctx: &ReminderContext,
    summary: &mut SweepSummary,
) {
    let reminder = &batch.reminder;
    for participant in &batch.to_email {
        let template = EmailTemplate::EventReminder(EventReminderEmail::new(participant, reminder));
        let send = compose_and_send(
            ctx.mailer.as_ref(),
            &template,
            &participant.email,
            &ctx.config.frontend_url,
        );
        let res = match timeout(ctx.config.mail.send_timeout, send).await {
            Ok(res) => res,
            Err(_) => Err(MailError::Timeout),
        };

        match res {
            Ok(message_id) => {
                info!(
                    "Sent {} reminder for event {} to user {}, message id: {}",
                    reminder.kind, reminder.event_id, participant.user_id, message_id
                );
                summary.emails_sent += 1;
                record_delivery(reminder, participant, DeliveryChannel::Email, today, ctx).await;
            }
            Err(e) => {
                let failure = SweepFailure::Send {
                    event_id: reminder.event_id,
                    user_id: participant.user_id,
                    kind: reminder.kind,
                    reason: e.to_string(),
                };
                error!("{}", failure);
                summary.record_failure(failure);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charity_reminders_domain::{
        CharityEvent, EmailMessage, Enrollment, EnrollmentStatus, EventStatus, ReminderKind, ID,
    };
    use charity_reminders_infra::{
        IEventRepo, IMailer, INotificationRepo, IParticipantRepo, InMemoryEventRepo,
        InMemoryMailer, InMemoryNotificationRepo, InMemoryParticipantRepo, StaticTimeSys,
    };
    use chrono::Duration;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    };

    // 2024-01-01T10:00:00Z
    const NOW_MILLIS: i64 = 1704103200000;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    struct TestContext {
        ctx: ReminderContext,
        events: Arc<InMemoryEventRepo>,
        participants: Arc<InMemoryParticipantRepo>,
        notifications: Arc<InMemoryNotificationRepo>,
        mailer: Arc<InMemoryMailer>,
    }

    fn setup() -> TestContext {
        let mut ctx = ReminderContext::create_inmemory();
        let events = Arc::new(InMemoryEventRepo::new());
        let participants = Arc::new(InMemoryParticipantRepo::new());
        let notifications = Arc::new(InMemoryNotificationRepo::new());
        let mailer = Arc::new(InMemoryMailer::new());
        ctx.repos.events = events.clone();
        ctx.repos.participants = participants.clone();
        ctx.repos.notifications = notifications.clone();
        ctx.mailer = mailer.clone();
        ctx.sys = Arc::new(StaticTimeSys(NOW_MILLIS));

        TestContext {
            ctx,
            events,
            participants,
            notifications,
            mailer,
        }
    }

    fn insert_event(ctx: &TestContext, id: i64, title: &str, days_ahead: i64, status: EventStatus) {
        ctx.events.insert(&CharityEvent {
            id: ID::new(id),
            title: title.into(),
            date: today() + Duration::days(days_ahead),
            location: "Sunset Beach".into(),
            start_time: None,
            status,
        });
    }

    fn participant(id: i64, name: &str) -> Participant {
        Participant {
            user_id: ID::new(id),
            name: name.into(),
            email: format!("{}@x.com", name.to_lowercase()),
        }
    }

    fn enroll(ctx: &TestContext, event_id: i64, participant: Participant, status: EnrollmentStatus) {
        ctx.participants.insert(&Enrollment {
            event_id: ID::new(event_id),
            participant,
            status,
        });
    }

    async fn sweep(ctx: &ReminderContext) -> SweepSummary {
        let usecase = SendEventRemindersUseCase {
            trigger: SweepTrigger::Manual,
        };
        match execute(usecase, ctx).await {
            Ok(summary) => summary,
            Err(e) => match e {},
        }
    }

    struct RecordingNotificationRepo {
        calls: Mutex<Vec<Vec<Notification>>>,
    }

    #[async_trait::async_trait]
    impl INotificationRepo for RecordingNotificationRepo {
        async fn bulk_insert(&self, notifications: &[Notification]) -> anyhow::Result<()> {
            self.calls.lock().unwrap().push(notifications.to_vec());
            Ok(())
        }
    }

    struct FailingNotificationRepo;

    #[async_trait::async_trait]
    impl INotificationRepo for FailingNotificationRepo {
        async fn bulk_insert(&self, _notifications: &[Notification]) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("notifications table is locked"))
        }
    }

    struct UnavailableOnceNotificationRepo {
        unavailable: AtomicBool,
        inner: Arc<InMemoryNotificationRepo>,
    }

    #[async_trait::async_trait]
    impl INotificationRepo for UnavailableOnceNotificationRepo {
        async fn bulk_insert(&self, notifications: &[Notification]) -> anyhow::Result<()> {
            if self.unavailable.swap(false, Ordering::SeqCst) {
                return Err(anyhow::anyhow!("notifications table is locked"));
            }
            self.inner.bulk_insert(notifications).await
        }
    }

    struct FailingEventRepo;

    #[async_trait::async_trait]
    impl IEventRepo for FailingEventRepo {
        async fn find_needing_reminders(
            &self,
            _today: NaiveDate,
        ) -> anyhow::Result<Vec<EventReminder>> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    struct FlakyParticipantRepo {
        failing_event: ID,
        inner: Arc<InMemoryParticipantRepo>,
    }

    #[async_trait::async_trait]
    impl IParticipantRepo for FlakyParticipantRepo {
        async fn find_active_by_event(&self, event_id: &ID) -> anyhow::Result<Vec<Participant>> {
            if *event_id == self.failing_event {
                return Err(anyhow::anyhow!("connection reset"));
            }
            self.inner.find_active_by_event(event_id).await
        }
    }

    struct HangingMailer;

    #[async_trait::async_trait]
    impl IMailer for HangingMailer {
        async fn send(&self, _message: &EmailMessage) -> Result<String, MailError> {
            actix_web::rt::time::sleep(std::time::Duration::from_secs(30)).await;
            Ok("never".into())
        }
    }

    #[actix_web::test]
    async fn sends_week_reminder_to_every_active_participant() {
        let mut ctx = setup();
        let notifications = Arc::new(RecordingNotificationRepo {
            calls: Mutex::new(Vec::new()),
        });
        ctx.ctx.repos.notifications = notifications.clone();
        insert_event(&ctx, 42, "Beach Cleanup", 7, EventStatus::Open);
        enroll(&ctx, 42, participant(1, "Ana"), EnrollmentStatus::Active);
        enroll(&ctx, 42, participant(2, "Bo"), EnrollmentStatus::Active);

        let summary = sweep(&ctx.ctx).await;

        assert_eq!(summary.sweep_date, today());
        assert_eq!(summary.events_discovered, 1);
        assert_eq!(summary.emails_sent, 2);
        assert!(summary.is_clean());

        let sent = ctx.mailer.sent_messages();
        assert_eq!(sent.len(), 2);
        assert_eq!(
            ctx.mailer.attempted_recipients(),
            vec!["ana@x.com".to_string(), "bo@x.com".to_string()]
        );
        for message in &sent {
            assert!(message.subject.contains("Beach Cleanup"));
            assert!(message.html.contains("starts in 7 days"));
        }

        let calls = notifications.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let user_ids = calls[0].iter().map(|n| n.user_id).collect::<Vec<_>>();
        assert_eq!(user_ids, vec![ID::new(1), ID::new(2)]);
        assert!(calls[0]
            .iter()
            .all(|n| n.kind == ReminderKind::Week && n.event_id == ID::new(42)));
    }

    #[actix_web::test]
    async fn sends_day_reminders_with_tomorrow_framing() {
        let ctx = setup();
        insert_event(&ctx, 7, "Tutoring Day", 1, EventStatus::Open);
        enroll(&ctx, 7, participant(1, "Ana"), EnrollmentStatus::Active);

        let summary = sweep(&ctx.ctx).await;

        assert_eq!(summary.emails_sent, 1);
        let sent = ctx.mailer.sent_messages();
        assert_eq!(sent[0].subject, "Reminder: Tutoring Day starts tomorrow");
        assert_eq!(ctx.notifications.find_all()[0].kind, ReminderKind::Day);
    }

    #[actix_web::test]
    async fn ignores_events_outside_the_window_and_closed_events() {
        let ctx = setup();
        insert_event(&ctx, 1, "Today", 0, EventStatus::Open);
        insert_event(&ctx, 2, "Past", -2, EventStatus::Open);
        insert_event(&ctx, 3, "Closed", 7, EventStatus::Closed);
        insert_event(&ctx, 4, "In three days", 3, EventStatus::Open);
        for event_id in 1..=4 {
            enroll(&ctx, event_id, participant(event_id, "Ana"), EnrollmentStatus::Active);
        }

        let summary = sweep(&ctx.ctx).await;

        assert_eq!(summary.events_discovered, 0);
        assert!(ctx.mailer.attempted_recipients().is_empty());
        assert!(ctx.notifications.find_all().is_empty());
    }

    #[actix_web::test]
    async fn skips_participants_that_are_not_active() {
        let ctx = setup();
        insert_event(&ctx, 42, "Beach Cleanup", 7, EventStatus::Open);
        enroll(&ctx, 42, participant(1, "Ana"), EnrollmentStatus::Active);
        enroll(&ctx, 42, participant(2, "Bo"), EnrollmentStatus::Pending);
        enroll(&ctx, 42, participant(3, "Cy"), EnrollmentStatus::Rejected);

        sweep(&ctx.ctx).await;

        assert_eq!(
            ctx.mailer.attempted_recipients(),
            vec!["ana@x.com".to_string()]
        );
        let notified = ctx
            .notifications
            .find_all()
            .into_iter()
            .map(|n| n.user_id)
            .collect::<Vec<_>>();
        assert_eq!(notified, vec![ID::new(1)]);
    }

    #[actix_web::test]
    async fn skips_events_without_active_participants() {
        let ctx = setup();
        insert_event(&ctx, 42, "Beach Cleanup", 7, EventStatus::Open);
        enroll(&ctx, 42, participant(2, "Bo"), EnrollmentStatus::Pending);

        let summary = sweep(&ctx.ctx).await;

        assert_eq!(summary.events_discovered, 1);
        assert_eq!(summary.events_skipped, 1);
        assert_eq!(summary.events_processed, 0);
        assert!(summary.is_clean());
        assert!(ctx.notifications.find_all().is_empty());
    }

    #[actix_web::test]
    async fn a_failed_send_does_not_stop_the_other_participants() {
        let ctx = setup();
        insert_event(&ctx, 42, "Beach Cleanup", 7, EventStatus::Open);
        enroll(&ctx, 42, participant(1, "Ana"), EnrollmentStatus::Active);
        enroll(&ctx, 42, participant(2, "Bo"), EnrollmentStatus::Active);
        enroll(&ctx, 42, participant(3, "Cy"), EnrollmentStatus::Active);
        ctx.mailer.fail_for("bo@x.com");

        let summary = sweep(&ctx.ctx).await;

        assert_eq!(
            ctx.mailer.attempted_recipients(),
            vec![
                "ana@x.com".to_string(),
                "bo@x.com".to_string(),
                "cy@x.com".to_string()
            ]
        );
        assert_eq!(summary.emails_sent, 2);
        assert_eq!(summary.emails_failed, 1);
        assert_eq!(summary.failures.len(), 1);
        match &summary.failures[0] {
            SweepFailure::Send {
                event_id, user_id, ..
            } => {
                assert_eq!(*event_id, ID::new(42));
                assert_eq!(*user_id, ID::new(2));
            }
            other => panic!("Unexpected failure: {:?}", other),
        }
    }

    #[actix_web::test]
    async fn a_failed_participant_lookup_does_not_stop_the_other_events() {
        let mut ctx = setup();
        ctx.ctx.repos.participants = Arc::new(FlakyParticipantRepo {
            failing_event: ID::new(1),
            inner: ctx.participants.clone(),
        });
        insert_event(&ctx, 1, "Feeding Program", 7, EventStatus::Open);
        insert_event(&ctx, 2, "Tree Planting", 1, EventStatus::Open);
        enroll(&ctx, 1, participant(1, "Ana"), EnrollmentStatus::Active);
        enroll(&ctx, 2, participant(2, "Bo"), EnrollmentStatus::Active);

        let summary = sweep(&ctx.ctx).await;

        assert_eq!(summary.events_discovered, 2);
        assert_eq!(summary.events_skipped, 1);
        assert_eq!(summary.events_processed, 1);
        assert_eq!(ctx.mailer.attempted_recipients(), vec!["bo@x.com".to_string()]);
        assert!(matches!(
            summary.failures.as_slice(),
            [SweepFailure::ParticipantLookup { .. }]
        ));
    }

    #[actix_web::test]
    async fn emails_are_sent_even_if_notifications_fail() {
        let mut ctx = setup();
        ctx.ctx.repos.notifications = Arc::new(FailingNotificationRepo);
        insert_event(&ctx, 42, "Beach Cleanup", 7, EventStatus::Open);
        enroll(&ctx, 42, participant(1, "Ana"), EnrollmentStatus::Active);
        enroll(&ctx, 42, participant(2, "Bo"), EnrollmentStatus::Active);

        let summary = sweep(&ctx.ctx).await;

        assert_eq!(summary.notifications_created, 0);
        assert_eq!(summary.emails_sent, 2);
        assert!(matches!(
            summary.failures.as_slice(),
            [SweepFailure::BulkNotification { .. }]
        ));
    }

    #[actix_web::test]
    async fn a_failed_discovery_ends_the_sweep_cleanly() {
        let mut ctx = setup();
        ctx.ctx.repos.events = Arc::new(FailingEventRepo);

        let summary = sweep(&ctx.ctx).await;

        assert_eq!(summary.events_discovered, 0);
        assert!(matches!(
            summary.failures.as_slice(),
            [SweepFailure::Discovery { .. }]
        ));
        assert!(ctx.mailer.attempted_recipients().is_empty());
    }

    #[actix_web::test]
    async fn hanging_sends_are_timed_out() {
        let mut ctx = setup();
        ctx.ctx.mailer = Arc::new(HangingMailer);
        ctx.ctx.config.mail.send_timeout = std::time::Duration::from_millis(20);
        insert_event(&ctx, 42, "Beach Cleanup", 7, EventStatus::Open);
        enroll(&ctx, 42, participant(1, "Ana"), EnrollmentStatus::Active);
        enroll(&ctx, 42, participant(2, "Bo"), EnrollmentStatus::Active);

        let summary = sweep(&ctx.ctx).await;

        assert_eq!(summary.emails_sent, 0);
        assert_eq!(summary.emails_failed, 2);
        assert!(summary
            .failures
            .iter()
            .all(|f| f.to_string().contains("did not respond in time")));
    }

    #[actix_web::test]
    async fn rerunning_a_sweep_on_the_same_day_does_not_send_duplicates() {
        let ctx = setup();
        insert_event(&ctx, 42, "Beach Cleanup", 7, EventStatus::Open);
        enroll(&ctx, 42, participant(1, "Ana"), EnrollmentStatus::Active);
        enroll(&ctx, 42, participant(2, "Bo"), EnrollmentStatus::Active);
        ctx.mailer.fail_for("bo@x.com");

        let first = sweep(&ctx.ctx).await;
        assert_eq!(first.emails_sent, 1);
        assert_eq!(first.emails_failed, 1);

        ctx.mailer.stop_failing_for("bo@x.com");
        let second = sweep(&ctx.ctx).await;
        assert_eq!(second.duplicates_skipped, 1);
        assert_eq!(second.emails_sent, 1);
        assert_eq!(
            ctx.mailer.attempted_recipients(),
            vec![
                "ana@x.com".to_string(),
                "bo@x.com".to_string(),
                "bo@x.com".to_string()
            ]
        );

        let third = sweep(&ctx.ctx).await;
        assert_eq!(third.duplicates_skipped, 2);
        assert_eq!(third.emails_sent, 0);
        assert_eq!(third.events_skipped, 1);
        assert_eq!(ctx.mailer.sent_messages().len(), 2);
        assert_eq!(third.notifications_created, 0);
        // Ana and Bo were notified by the first sweep
        assert_eq!(ctx.notifications.find_all().len(), 2);
    }

    #[actix_web::test]
    async fn rerunning_a_sweep_retries_notifications_without_resending_emails() {
        let mut ctx = setup();
        let notifications = Arc::new(UnavailableOnceNotificationRepo {
            unavailable: AtomicBool::new(true),
            inner: ctx.notifications.clone(),
        });
        ctx.ctx.repos.notifications = notifications;
        insert_event(&ctx, 42, "Beach Cleanup", 7, EventStatus::Open);
        enroll(&ctx, 42, participant(1, "Ana"), EnrollmentStatus::Active);
        enroll(&ctx, 42, participant(2, "Bo"), EnrollmentStatus::Active);

        let first = sweep(&ctx.ctx).await;
        assert_eq!(first.notifications_created, 0);
        assert_eq!(first.emails_sent, 2);
        assert!(ctx.notifications.find_all().is_empty());

        let second = sweep(&ctx.ctx).await;
        assert!(second.is_clean());
        assert_eq!(second.events_processed, 1);
        assert_eq!(second.notifications_created, 2);
        assert_eq!(second.emails_sent, 0);
        assert_eq!(second.duplicates_skipped, 2);
        assert_eq!(ctx.mailer.attempted_recipients().len(), 2);

        let third = sweep(&ctx.ctx).await;
        assert_eq!(third.events_skipped, 1);
        assert_eq!(ctx.notifications.find_all().len(), 2);
    }
}
