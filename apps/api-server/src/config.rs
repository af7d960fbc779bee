//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

use postpilot_core::domain::SchedulerClock;
use postpilot_infra::{DatabaseConfig, DelayedSchedulerConfig};

/// Largest accepted upload body.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Port of the Socket.IO listener.
    pub socketio_port: u16,
    /// `None` runs with in-memory stores.
    pub database: Option<DatabaseConfig>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub clock: SchedulerClock,
    pub scheduler: DelayedSchedulerConfig,
    /// Cron expression for the periodic reconciliation sweep. Unset means
    /// reconciliation only runs at startup.
    pub reconcile_cron: Option<String>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .map(|url| {
                let mut db = DatabaseConfig::new(url);
                db.max_connections = parse_var("DB_MAX_CONNECTIONS").unwrap_or(10);
                db.min_connections = parse_var("DB_MIN_CONNECTIONS").unwrap_or(1);
                db.auto_migrate = flag_var("DB_AUTO_MIGRATE").unwrap_or(true);
                db
            });

        let clock = match env::var("SCHEDULER_TZ_OFFSET") {
            Ok(offset) => SchedulerClock::from_offset_str(&offset).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring SCHEDULER_TZ_OFFSET, using +05:30");
                SchedulerClock::default()
            }),
            Err(_) => SchedulerClock::default(),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            socketio_port: parse_var("SOCKETIO_PORT").unwrap_or(8081),
            database,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static/uploads")),
            max_upload_bytes: parse_var("UPLOAD_MAX_BYTES").unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            clock,
            scheduler: DelayedSchedulerConfig::from_env(),
            reconcile_cron: env::var("RECONCILE_CRON")
                .ok()
                .filter(|expr| !expr.trim().is_empty()),
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn flag_var(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v != "false" && v != "0")
}
