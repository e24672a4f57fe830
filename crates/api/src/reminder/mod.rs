mod discover_events;
mod get_active_participants;
mod send_event_reminders;

use actix_web::web;
pub use discover_events::discover_events_needing_reminders;
pub use get_active_participants::get_active_participants;
use send_event_reminders::send_event_reminders_controller;
pub use send_event_reminders::{SendEventRemindersUseCase, SweepTrigger};

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/reminders/sweep",
        web::post().to(send_event_reminders_controller),
    );
}
