//! Configuration management for the Prody server
//!
//! Configuration is layered: `conf/application.yml`, then `PRODY_*`
//! environment variables, then command line flags.

use std::time::Duration;

use clap::Parser;
use config::{Config, Environment};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use prody_auth::model::{DEFAULT_ACCESS_TOKEN_TTL_SECONDS, DEFAULT_REFRESH_TOKEN_TTL_SECONDS};

use crate::startup::logging::LoggingConfig;

pub const DEFAULT_SERVER_PORT: u16 = 4000;

/// Command line arguments for the server
#[derive(Debug, Parser)]
#[command()]
struct Cli {
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,
    #[arg(long = "db-url", env = "DATABASE_URL")]
    database_url: Option<String>,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new() -> Self {
        let args = Cli::parse();
        let mut config_builder = Config::builder()
            .add_source(
                Environment::with_prefix("prody")
                    .separator(".")
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("conf/application.yml").required(false));

        if let Some(v) = args.port {
            config_builder = config_builder
                .set_override("server.port", i64::from(v))
                .expect("Failed to set server port override");
        }
        if let Some(v) = args.database_url {
            config_builder = config_builder
                .set_override("db.url", v)
                .expect("Failed to set database URL override");
        }

        let app_config = config_builder
            .build()
            .expect("Failed to build configuration - check conf/application.yml");

        Configuration { config: app_config }
    }

    // ========================================================================
    // Server
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string("server.address")
            .unwrap_or("0.0.0.0".to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int("server.port")
            .unwrap_or(DEFAULT_SERVER_PORT.into()) as u16
    }

    /// Frontend origin, used for CORS and password reset links
    pub fn frontend_url(&self) -> String {
        self.config
            .get_string("prody.frontend.url")
            .unwrap_or("http://localhost:3000".to_string())
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub fn token_secret_key(&self) -> String {
        self.config
            .get_string("prody.auth.token.secret.key")
            .unwrap_or_default()
    }

    pub fn access_token_ttl_seconds(&self) -> i64 {
        self.config
            .get_int("prody.auth.token.expire.seconds")
            .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECONDS)
    }

    pub fn refresh_token_ttl_seconds(&self) -> i64 {
        self.config
            .get_int("prody.auth.refresh.expire.seconds")
            .unwrap_or(DEFAULT_REFRESH_TOKEN_TTL_SECONDS)
    }

    pub fn google_client_id(&self) -> String {
        self.config
            .get_string("prody.google.client.id")
            .unwrap_or_default()
    }

    // ========================================================================
    // Mail
    // ========================================================================

    pub fn mail_api_url(&self) -> String {
        self.config
            .get_string("prody.mail.api.url")
            .unwrap_or("https://api.resend.com/emails".to_string())
    }

    pub fn mail_api_key(&self) -> String {
        self.config
            .get_string("prody.mail.api.key")
            .unwrap_or_default()
    }

    pub fn mail_from(&self) -> String {
        self.config
            .get_string("prody.mail.from")
            .unwrap_or("Prody <onboarding@resend.dev>".to_string())
    }

    // ========================================================================
    // Logging
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.config.get_string("prody.logs.path").ok(),
            self.config.get_bool("prody.logs.console").unwrap_or(true),
            self.config.get_bool("prody.logs.file").unwrap_or(true),
            self.config
                .get_string("prody.logs.level")
                .unwrap_or("info".to_string()),
        )
    }

    // ========================================================================
    // Database
    // ========================================================================

    pub fn database_url(&self) -> String {
        self.config.get_string("db.url").unwrap_or_default()
    }

    pub async fn database_connection(&self) -> anyhow::Result<DatabaseConnection> {
        let url = self.database_url();
        if url.is_empty() {
            anyhow::bail!("database URL is not configured (db.url / DATABASE_URL)");
        }

        let mut options = ConnectOptions::new(url);
        options
            .max_connections(
                self.config.get_int("db.pool.max.size").unwrap_or(20) as u32
            )
            .connect_timeout(Duration::from_secs(
                self.config.get_int("db.pool.connect.timeout").unwrap_or(10) as u64,
            ))
            .sqlx_logging(false);

        Ok(Database::connect(options).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty() -> Configuration {
        Configuration {
            config: Config::builder().build().unwrap(),
        }
    }

    #[test]
    fn test_defaults() {
        let configuration = empty();
        assert_eq!(configuration.server_address(), "0.0.0.0");
        assert_eq!(configuration.server_port(), DEFAULT_SERVER_PORT);
        assert_eq!(configuration.frontend_url(), "http://localhost:3000");
        assert_eq!(configuration.access_token_ttl_seconds(), 1800);
        assert_eq!(configuration.refresh_token_ttl_seconds(), 604_800);
        assert!(configuration.token_secret_key().is_empty());
    }

    #[test]
    fn test_overrides() {
        let configuration = Configuration {
            config: Config::builder()
                .set_override("server.port", 8080)
                .unwrap()
                .set_override("prody.auth.token.expire.seconds", 900)
                .unwrap()
                .build()
                .unwrap(),
        };
        assert_eq!(configuration.server_port(), 8080);
        assert_eq!(configuration.access_token_ttl_seconds(), 900);
    }
}
