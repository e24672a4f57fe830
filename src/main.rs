mod telemetry;

use charity_reminders_api::Application;
use charity_reminders_infra::{run_migration, setup_context, verify_mail_service_configured};
use telemetry::{get_subscriber, init_subscriber};
use tracing::{error, info};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    openssl_probe::init_ssl_cert_env_vars();

    let subscriber = get_subscriber("charity_reminders".into(), "info".into());
    init_subscriber(subscriber)?;

    let context = setup_context().await?;
    if let Err(e) = verify_mail_service_configured(&context.config.mail) {
        error!("{}", e);
        return Err(e.into());
    }

    info!("Running database migrations");
    run_migration().await?;

    let app = Application::new(context).await?;
    info!("Reminder service listening on port {}", app.port());
    app.start().await?;
    Ok(())
}
