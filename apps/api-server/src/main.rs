//! # Postpilot API Server
//!
//! Schedules social posts and publishes them at their scheduled time.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;
#[cfg(feature = "websocket")]
mod websocket;

use config::AppConfig;
use state::AppState;
use telemetry::TelemetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    telemetry::init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = config.port,
        tz_offset = %config.clock.offset(),
        "Starting Postpilot API server"
    );

    let state = AppState::new(&config).await?;

    // Publish overdue posts and re-arm future ones before anything can fire.
    let report = state.reconciler.run_startup().await;
    let restored = state.scheduler.start().await?;
    tracing::info!(
        published = report.published,
        rearmed = report.rearmed,
        failed = report.failed,
        restored,
        "Publish scheduler running"
    );

    let mut background = Background::start(&config, &state).await;

    let max_upload_bytes = config.max_upload_bytes;
    let app_state = state.clone();
    let served = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    tracing::info!("HTTP server stopped, shutting down");
    background.stop().await;
    state.scheduler.shutdown().await;

    served.map_err(Into::into)
}

/// Tasks that run beside the HTTP server.
struct Background {
    #[cfg(feature = "scheduler")]
    cron: Option<background::CronScheduler>,
    #[cfg(feature = "websocket")]
    socketio: Option<SocketServer>,
}

#[cfg(feature = "websocket")]
struct SocketServer {
    shutdown: tokio::sync::watch::Sender<bool>,
    server: tokio::task::JoinHandle<()>,
    relay: tokio::task::JoinHandle<()>,
}

impl Background {
    #[cfg_attr(
        not(any(feature = "scheduler", feature = "websocket")),
        allow(unused_variables)
    )]
    async fn start(config: &AppConfig, state: &AppState) -> Self {
        Self {
            #[cfg(feature = "scheduler")]
            cron: start_cron(config, state).await,
            #[cfg(feature = "websocket")]
            socketio: Some(start_socketio(config, state)),
        }
    }

    async fn stop(&mut self) {
        #[cfg(feature = "scheduler")]
        if let Some(mut cron) = self.cron.take() {
            if let Err(e) = cron.shutdown().await {
                tracing::warn!(error = %e, "Cron scheduler did not stop cleanly");
            }
        }

        #[cfg(feature = "websocket")]
        if let Some(socketio) = self.socketio.take() {
            socketio.shutdown.send_replace(true);
            if let Err(e) = socketio.server.await {
                tracing::warn!(error = %e, "Socket.IO server task ended abnormally");
            }
            socketio.relay.abort();
        }
    }
}

#[cfg(feature = "scheduler")]
async fn start_cron(config: &AppConfig, state: &AppState) -> Option<background::CronScheduler> {
    let Some(schedule) = config.reconcile_cron.as_deref() else {
        tracing::info!("RECONCILE_CRON not set, reconciliation runs at startup only");
        return None;
    };

    let result = async {
        let cron = background::CronScheduler::new().await?;
        cron.add_reconcile_sweep(schedule, state.reconciler.clone())
            .await?;
        cron.start().await?;
        Ok::<_, tokio_cron_scheduler::JobSchedulerError>(cron)
    }
    .await;

    match result {
        Ok(cron) => Some(cron),
        Err(e) => {
            tracing::error!(schedule = %schedule, error = %e, "Failed to start reconciliation sweep");
            None
        }
    }
}

#[cfg(feature = "websocket")]
fn start_socketio(config: &AppConfig, state: &AppState) -> SocketServer {
    let (layer, io) = websocket::create_socketio_layer();
    let relay = websocket::spawn_status_relay(io, state.notifier.subscribe());

    let (shutdown, mut stop) = tokio::sync::watch::channel(false);
    let host = config.host.clone();
    let port = config.socketio_port;
    let server = tokio::spawn(async move {
        let signal = async move {
            let _ = stop.changed().await;
        };
        if let Err(e) = websocket::serve(host, port, layer, signal).await {
            tracing::error!(port, error = %e, "Socket.IO server failed");
        }
    });

    SocketServer {
        shutdown,
        server,
        relay,
    }
}
