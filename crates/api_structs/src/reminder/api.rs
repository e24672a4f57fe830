use crate::dtos::SweepSummaryDTO;
use charity_reminders_domain::SweepSummary;
use serde::{Deserialize, Serialize};

pub mod send_event_reminders {
    use super::*;

    #[derive(Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub summary: SweepSummaryDTO,
    }

    impl APIResponse {
        pub fn new(summary: &SweepSummary) -> Self {
            Self {
                summary: SweepSummaryDTO::new(summary),
            }
        }
    }
}
