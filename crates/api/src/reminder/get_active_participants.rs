use charity_reminders_domain::{Participant, SweepFailure, ID};
use charity_reminders_infra::ReminderContext;

pub async fn get_active_participants(
    event_id: &ID,
    ctx: &ReminderContext,
) -> Result<Vec<Participant>, SweepFailure> {
    ctx.repos
        .participants
        .find_active_by_event(event_id)
        .await
        .map_err(|e| SweepFailure::ParticipantLookup {
            event_id: *event_id,
            reason: e.to_string(),
        })
}
