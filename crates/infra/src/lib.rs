mod config;
mod repos;
mod services;
mod system;

pub use config::{Config, MailConfig, MailTransport};
pub use repos::*;
pub use services::mailer::{
    compose_and_send, create_mailer, verify_mail_service_configured, ConfigurationError, IMailer,
    InMemoryMailer, MailError, MailgunMailer,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
pub use system::{ISys, RealSys, StaticTimeSys};

#[derive(Clone)]
pub struct ReminderContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    /// Created once by the composition root and shared by every sweep
    pub mailer: Arc<dyn IMailer>,
}

struct ContextParams {
    pub postgres_connection_string: String,
}

impl ReminderContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let repos = Repos::create_postgres(&params.postgres_connection_string).await?;
        let config = Config::new();
        let mailer = create_mailer(&config.mail)?;
        Ok(Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            mailer,
        })
    }

    /// Context backed by in-memory repositories and an in-memory mailer.
    /// Does not read the process environment.
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::from_lookup(|_| None),
            sys: Arc::new(RealSys {}),
            mailer: Arc::new(InMemoryMailer::new()),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<ReminderContext> {
    ReminderContext::create(ContextParams {
        postgres_connection_string: get_psql_connection_string()?,
    })
    .await
}

fn get_psql_connection_string() -> anyhow::Result<String> {
    const PSQL_CONNECTION_STRING: &str = "DATABASE_URL";

    std::env::var(PSQL_CONNECTION_STRING)
        .map_err(|_| anyhow::anyhow!("{} env var to be present.", PSQL_CONNECTION_STRING))
}

pub async fn run_migration() -> anyhow::Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&get_psql_connection_string()?)
        .await?;

    sqlx::migrate!().run(&pool).await?;
    Ok(())
}
