//! Resolving where to connect, and getting a live connection there.

use crate::{
    error::{ConfigError, ConnectError},
    retry::{RetryDisposition, RetryError, RetryPolicy},
};
use connectors::sql::{base::adapter::SqlAdapter, postgres::adapter::PgAdapter};
use planner::plan::DatabaseDefaults;
use std::{collections::HashMap, fmt};
use tokio_postgres::config::SslMode;
use tracing::info;

pub const ENV_HOST: &str = "DB_HOST";
pub const ENV_PORT: &str = "DB_PORT";
pub const ENV_USER: &str = "DB_USER";
pub const ENV_PASSWORD: &str = "DB_PASSWORD";
pub const ENV_PASSWORD_LEGACY: &str = "DB_PASS";
pub const ENV_NAME: &str = "DB_NAME";
pub const ENV_SSLMODE: &str = "DB_SSLMODE";

#[derive(Clone, PartialEq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
    pub ssl_mode: SslMode,
}

impl ConnectionConfig {
    /// Environment first, then the plan's literal defaults, then the
    /// built-in ones. Empty variables count as unset.
    pub fn resolve(
        env: &HashMap<String, String>,
        defaults: &DatabaseDefaults,
        fallback_database: &str,
    ) -> Result<Self, ConfigError> {
        let var = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

        let port = match var(ENV_PORT) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port.unwrap_or(5432),
        };

        let ssl_mode = match var(ENV_SSLMODE) {
            Some(raw) => parse_ssl_mode(&raw)?,
            None => SslMode::Prefer,
        };

        Ok(ConnectionConfig {
            host: var(ENV_HOST)
                .or_else(|| defaults.host.clone())
                .unwrap_or_else(|| "localhost".to_string()),
            port,
            user: var(ENV_USER)
                .or_else(|| defaults.user.clone())
                .unwrap_or_else(|| "postgres".to_string()),
            password: var(ENV_PASSWORD)
                .or_else(|| var(ENV_PASSWORD_LEGACY))
                .or_else(|| defaults.password.clone()),
            database: var(ENV_NAME)
                .or_else(|| defaults.name.clone())
                .unwrap_or_else(|| fallback_database.to_string()),
            ssl_mode,
        })
    }

    /// Same server and credentials, different database.
    pub fn with_database(&self, database: &str) -> Self {
        ConnectionConfig {
            database: database.to_string(),
            ..self.clone()
        }
    }

    pub fn to_pg_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(&self.database)
            .ssl_mode(self.ssl_mode);
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }
}

fn parse_ssl_mode(raw: &str) -> Result<SslMode, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "disable" => Ok(SslMode::Disable),
        "prefer" => Ok(SslMode::Prefer),
        "require" => Ok(SslMode::Require),
        _ => Err(ConfigError::InvalidSslMode(raw.to_string())),
    }
}

// Never prints the password.
impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .finish()
    }
}

async fn connect_once(config: &ConnectionConfig) -> Result<PgAdapter, ConnectError> {
    let adapter = PgAdapter::connect_with(config.to_pg_config()).await?;
    adapter.ping().await?;
    Ok(adapter)
}

/// Opens a connection and checks it with `SELECT 1`, retrying every failure
/// under `policy`.
pub async fn connect_with_retry(
    config: &ConnectionConfig,
    policy: &RetryPolicy,
) -> Result<PgAdapter, RetryError<ConnectError>> {
    let mut attempt = 0;
    let adapter = policy
        .run(
            || {
                attempt += 1;
                info!(
                    "Connecting to {config} (attempt {attempt}/{})",
                    policy.max_attempts
                );
                connect_once(config)
            },
            |_| RetryDisposition::Retry,
        )
        .await?;

    info!("Connected to {config}");
    Ok(adapter)
}

/// Creates the configured database through `admin_database` when it does not
/// exist yet. Returns whether it was created. No retry.
pub async fn ensure_database(
    config: &ConnectionConfig,
    admin_database: &str,
) -> Result<bool, ConnectError> {
    let admin = PgAdapter::connect_with(config.with_database(admin_database).to_pg_config()).await?;

    if admin.database_exists(&config.database).await? {
        info!("Database \"{}\" already exists", config.database);
        return Ok(false);
    }

    admin.create_database(&config.database).await?;
    info!("Created database \"{}\"", config.database);
    Ok(true)
}
