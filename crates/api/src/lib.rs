mod error;
mod job_schedulers;
mod reminder;
mod shared;
mod status;

use actix_cors::Cors;
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use charity_reminders_infra::ReminderContext;
use job_schedulers::{should_run_startup_sweep, start_reminder_sweep_job, start_startup_sweep};
use std::net::TcpListener;
use tracing::info;
use tracing_actix_web::TracingLogger;

pub use job_schedulers::{
    get_delay_until_next_run, get_next_run, run_reminder_sweep_job, DailyTicker, Ticker,
};
pub use reminder::{SendEventRemindersUseCase, SweepTrigger};
pub use shared::usecase::{execute, UseCase};

pub fn configure_server_api(cfg: &mut web::ServiceConfig) {
    reminder::configure_routes(cfg);
    status::configure_routes(cfg);
}

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    pub async fn new(context: ReminderContext) -> Result<Self, std::io::Error> {
        let (server, port) = Application::configure_server(context.clone()).await?;
        Application::start_job_schedulers(context);

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    fn start_job_schedulers(context: ReminderContext) {
        if should_run_startup_sweep(&context.config) {
            info!("Running reminder sweep on startup");
            start_startup_sweep(context.clone());
        }
        start_reminder_sweep_job(context);
    }

    async fn configure_server(context: ReminderContext) -> Result<(Server, u16), std::io::Error> {
        let port = context.config.port;
        let address = format!("0.0.0.0:{}", port);
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();

        let server = HttpServer::new(move || {
            let ctx = context.clone();

            App::new()
                .wrap(Cors::permissive())
                .wrap(middleware::Compress::default())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new(ctx))
                .service(web::scope("/api/v1").configure(configure_server_api))
        })
        .listen(listener)?
        .workers(4)
        .run();

        Ok((server, port))
    }

    pub async fn start(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}
