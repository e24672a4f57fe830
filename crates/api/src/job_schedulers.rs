use crate::{
    reminder::{SendEventRemindersUseCase, SweepTrigger},
    shared::usecase::execute,
};
use actix_web::rt::time::sleep;
use charity_reminders_infra::{Config, ISys, ReminderContext};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

/// Decides when the next reminder sweep runs
#[async_trait::async_trait(?Send)]
pub trait Ticker {
    /// Resolves when a sweep is due. Returns `false` when the job should stop.
    async fn tick(&mut self) -> bool;
}

/// Ticks once a day at a wall-clock time in the configured timezone
pub struct DailyTicker {
    sys: Arc<dyn ISys>,
    run_at: NaiveTime,
    timezone: Tz,
}

impl DailyTicker {
    pub fn new(ctx: &ReminderContext) -> Self {
        Self {
            sys: ctx.sys.clone(),
            run_at: ctx.config.sweep_time,
            timezone: ctx.config.timezone,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl Ticker for DailyTicker {
    async fn tick(&mut self) -> bool {
        let now = self.sys.get_datetime(&self.timezone);
        let delay = get_delay_until_next_run(now, self.run_at);
        info!(
            "Next reminder sweep at {} {} (in {} seconds)",
            self.run_at,
            self.timezone,
            delay.as_secs()
        );
        sleep(delay).await;
        true
    }
}

fn at_local_time(tz: &Tz, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
    let local = date.and_time(time);
    tz.from_local_datetime(&local)
        .earliest()
        // Wall-clock time skipped by a DST transition
        .or_else(|| {
            tz.from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
}

/// The first occurrence of `run_at` strictly after `now`, in the timezone of `now`
pub fn get_next_run(now: DateTime<Tz>, run_at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    let run_today = at_local_time(&tz, today, run_at);
    if run_today > now {
        run_today
    } else {
        at_local_time(&tz, today + Duration::days(1), run_at)
    }
}

pub fn get_delay_until_next_run(now: DateTime<Tz>, run_at: NaiveTime) -> std::time::Duration {
    (get_next_run(now, run_at) - now)
        .to_std()
        .unwrap_or_default()
}

/// Runs one sweep per tick until the ticker stops. Returns the number of sweeps.
pub async fn run_reminder_sweep_job<T: Ticker>(mut ticker: T, ctx: ReminderContext) -> usize {
    let mut sweeps = 0;
    while ticker.tick().await {
        let usecase = SendEventRemindersUseCase {
            trigger: SweepTrigger::Scheduled,
        };
        if let Ok(summary) = execute(usecase, &ctx).await {
            if !summary.is_clean() {
                warn!(
                    "Scheduled reminder sweep for {} had {} failures",
                    summary.sweep_date,
                    summary.failures.len()
                );
            }
        }
        sweeps += 1;
    }
    info!("Reminder sweep job stopped after {} sweeps", sweeps);
    sweeps
}

pub fn start_reminder_sweep_job(ctx: ReminderContext) {
    actix_web::rt::spawn(async move {
        let ticker = DailyTicker::new(&ctx);
        run_reminder_sweep_job(ticker, ctx).await;
    });
}

pub fn should_run_startup_sweep(config: &Config) -> bool {
    !config.is_production && !config.skip_startup_sweep
}

pub fn start_startup_sweep(ctx: ReminderContext) {
    actix_web::rt::spawn(async move {
        let usecase = SendEventRemindersUseCase {
            trigger: SweepTrigger::Startup,
        };
        let _ = execute(usecase, &ctx).await;
    });
}
