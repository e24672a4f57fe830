use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

// Mocking out time so that it is possible to run tests that depend on time.
pub trait ISys: Send + Sync {
    /// The current timestamp in millis
    fn get_timestamp_millis(&self) -> i64;

    /// The current wall clock time in the given timezone
    fn get_datetime(&self, tz: &Tz) -> DateTime<Tz> {
        Utc.timestamp_millis_opt(self.get_timestamp_millis())
            .single()
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
            .with_timezone(tz)
    }

    /// The calendar date of today in the given timezone
    fn get_today(&self, tz: &Tz) -> NaiveDate {
        self.get_datetime(tz).date_naive()
    }
}

/// System that gets the real time and is used when not testing
pub struct RealSys {}
impl ISys for RealSys {
    fn get_timestamp_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// System frozen at a given timestamp
pub struct StaticTimeSys(pub i64);
impl ISys for StaticTimeSys {
    fn get_timestamp_millis(&self) -> i64 {
        self.0
    }
}
