use charity_reminders_domain::Url;
use charity_reminders_utils::create_random_secret;
use chrono::NaiveTime;
use chrono_tz::Tz;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTransport {
    /// Deliver through the Mailgun HTTP api
    Mailgun,
    /// Only log outgoing emails, for local development
    Log,
}

#[derive(Clone)]
pub struct MailConfig {
    pub transport: MailTransport,
    /// Mailgun private api key
    pub api_key: Option<String>,
    /// Sending domain registered at Mailgun
    pub domain: Option<String>,
    /// Base url of the Mailgun api, differs for the EU region
    pub api_base: String,
    /// Sender display address, defaults to `noreply@<domain>`
    pub from: Option<String>,
    /// Upper bound for a single send request
    pub send_timeout: Duration,
}

impl MailConfig {
    pub fn sender(&self) -> Option<String> {
        match (&self.from, &self.domain) {
            (Some(from), _) => Some(from.clone()),
            (None, Some(domain)) => Some(format!("Charity Reminders <noreply@{}>", domain)),
            (None, None) => None,
        }
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("transport", &self.transport)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("domain", &self.domain)
            .field("api_base", &self.api_base)
            .field("from", &self.from)
            .field("send_timeout", &self.send_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret code required to manually trigger a reminder sweep
    pub admin_secret_code: String,
    /// Port for the application to run on
    pub port: usize,
    /// Whether the process runs in production (`APP_ENV=production`)
    pub is_production: bool,
    /// Operators can opt out of the sweep that runs at boot outside production
    pub skip_startup_sweep: bool,
    /// Wall clock time at which the daily sweep runs
    pub sweep_time: NaiveTime,
    /// Timezone used for `sweep_time` and for deciding what "today" is
    pub timezone: Tz,
    /// Base url of the dashboard, used for links in account emails
    pub frontend_url: Url,
    pub mail: MailConfig,
}

const DEFAULT_PORT: usize = 5000;
const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";
const DEFAULT_MAILGUN_API_BASE: &str = "https://api.mailgun.net";
const DEFAULT_SEND_TIMEOUT_SECS: u64 = 10;

impl Config {
    pub fn new() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Invalid values
    /// fall back to their defaults with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let admin_secret_code = match var("ADMIN_SECRET_CODE") {
            Some(code) => code,
            None => {
                info!("Did not find ADMIN_SECRET_CODE environment variable. Going to create one.");
                let code = create_random_secret(16);
                info!(
                    "Secret code for triggering reminder sweeps was generated and set to: {}",
                    code
                );
                code
            }
        };

        let port = match var("PORT") {
            None => DEFAULT_PORT,
            Some(port) => port.parse::<usize>().unwrap_or_else(|_| {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, DEFAULT_PORT
                );
                DEFAULT_PORT
            }),
        };

        let is_production = var("APP_ENV")
            .map(|env| env.eq_ignore_ascii_case("production"))
            .unwrap_or(false);
        let skip_startup_sweep = var("SKIP_STARTUP_SWEEP")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        let default_sweep_time = NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN);
        let sweep_time = match var("REMINDER_SWEEP_TIME") {
            None => default_sweep_time,
            Some(time) => NaiveTime::parse_from_str(&time, "%H:%M").unwrap_or_else(|_| {
                warn!(
                    "The given REMINDER_SWEEP_TIME: {} is not in HH:MM format, falling back to {}.",
                    time, default_sweep_time
                );
                default_sweep_time
            }),
        };

        let timezone = match var("REMINDER_TIMEZONE") {
            None => chrono_tz::UTC,
            Some(tz) => tz.parse::<Tz>().unwrap_or_else(|_| {
                warn!(
                    "The given REMINDER_TIMEZONE: {} is not a known timezone, falling back to UTC.",
                    tz
                );
                chrono_tz::UTC
            }),
        };

        let frontend_url = match var("FRONTEND_URL") {
            None => default_frontend_url(),
            Some(url) => Url::parse(&url).unwrap_or_else(|_| {
                warn!(
                    "The given FRONTEND_URL: {} is not a valid url, falling back to {}.",
                    url, DEFAULT_FRONTEND_URL
                );
                default_frontend_url()
            }),
        };

        let transport = match var("MAIL_TRANSPORT").as_deref() {
            None | Some("mailgun") => MailTransport::Mailgun,
            Some("log") => MailTransport::Log,
            Some(other) => {
                warn!(
                    "Unknown MAIL_TRANSPORT: {}, falling back to mailgun.",
                    other
                );
                MailTransport::Mailgun
            }
        };
        let send_timeout = match var("MAIL_SEND_TIMEOUT_SECS") {
            None => DEFAULT_SEND_TIMEOUT_SECS,
            Some(secs) => match secs.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warn!(
                        "The given MAIL_SEND_TIMEOUT_SECS: {} is not valid, falling back to {}.",
                        secs, DEFAULT_SEND_TIMEOUT_SECS
                    );
                    DEFAULT_SEND_TIMEOUT_SECS
                }
            },
        };
        let mail = MailConfig {
            transport,
            api_key: var("MAILGUN_API_KEY"),
            domain: var("MAILGUN_DOMAIN"),
            api_base: var("MAILGUN_API_BASE").unwrap_or_else(|| DEFAULT_MAILGUN_API_BASE.into()),
            from: var("MAIL_FROM"),
            send_timeout: Duration::from_secs(send_timeout),
        };

        Self {
            admin_secret_code,
            port,
            is_production,
            skip_startup_sweep,
            sweep_time,
            timezone,
            frontend_url,
            mail,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn default_frontend_url() -> Url {
    Url::parse(DEFAULT_FRONTEND_URL).expect("Default frontend url to be valid")
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes"
    )
}
