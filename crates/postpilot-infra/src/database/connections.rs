#[cfg(feature = "database")]
use std::time::Duration;

#[cfg(feature = "database")]
use sea_orm::{ConnectOptions, Database, DbConn, DbErr};

/// Configuration for the post and task database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Run pending migrations on startup.
    pub auto_migrate: bool,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            min_connections: 1,
            auto_migrate: true,
        }
    }

    /// SQLite allows a single writer; a wide pool only produces lock errors.
    pub fn is_sqlite(&self) -> bool {
        self.url.starts_with("sqlite:")
    }
}

/// Open the connection pool.
#[cfg(feature = "database")]
pub async fn connect(config: &DatabaseConfig) -> Result<DbConn, DbErr> {
    let max_connections = if config.is_sqlite() {
        1
    } else {
        config.max_connections
    };

    let opts = ConnectOptions::new(&config.url)
        .max_connections(max_connections)
        .min_connections(config.min_connections.min(max_connections))
        .connect_timeout(Duration::from_secs(10))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false)
        .to_owned();

    let conn = Database::connect(opts).await?;
    tracing::info!(pool = max_connections, "Database connected");
    Ok(conn)
}
