use super::IReminderLedgerRepo;
use crate::repos::shared::inmemory_repo::*;
use charity_reminders_domain::{DeliveryChannel, ReminderDelivery, ReminderKind, ID};
use chrono::NaiveDate;

pub struct InMemoryReminderLedgerRepo {
    deliveries: std::sync::Mutex<Vec<ReminderDelivery>>,
}

impl InMemoryReminderLedgerRepo {
    pub fn new() -> Self {
        Self {
            deliveries: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl Default for InMemoryReminderLedgerRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl IReminderLedgerRepo for InMemoryReminderLedgerRepo {
    async fn find_delivered(
        &self,
        event_id: &ID,
        kind: ReminderKind,
        channel: DeliveryChannel,
        sweep_date: NaiveDate,
    ) -> anyhow::Result<Vec<ID>> {
        let delivered = find_by(&self.deliveries, |d| {
            d.event_id == *event_id
                && d.kind == kind
                && d.channel == channel
                && d.sweep_date == sweep_date
        })
        .into_iter()
        .map(|d| d.user_id)
        .collect();
        Ok(delivered)
    }

    async fn insert(&self, delivery: &ReminderDelivery) -> anyhow::Result<()> {
        if find_by(&self.deliveries, |d| d == delivery).is_empty() {
            insert(delivery, &self.deliveries);
        }
        Ok(())
    }
}
