use charity_reminders_domain::{EventReminder, SweepFailure};
use charity_reminders_infra::ReminderContext;
use chrono::NaiveDate;

/// Finds the `OPEN` events that need a `week` or `day` reminder on `today`
pub async fn discover_events_needing_reminders(
    today: NaiveDate,
    ctx: &ReminderContext,
) -> Result<Vec<EventReminder>, SweepFailure> {
    ctx.repos
        .events
        .find_needing_reminders(today)
        .await
        .map_err(|e| SweepFailure::Discovery {
            reason: e.to_string(),
        })
}
