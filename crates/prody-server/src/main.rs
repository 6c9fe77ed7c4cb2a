//! Main entry point for the Prody server.
//!
//! Wires configuration, logging, the database connection and the shared
//! application state, then starts the HTTP/WebSocket server.

use std::sync::Arc;

use prody_server::model::{AppState, Configuration};
use prody_server::startup;
use tracing::info;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let configuration = Configuration::new();

    let logging_config = configuration.logging_config();
    let _logging_guard = startup::init_logging(&logging_config)?;

    if configuration.token_secret_key().is_empty() {
        return Err("token secret key is not configured (prody.auth.token.secret.key)".into());
    }

    let db = configuration.database_connection().await?;
    info!("database connection established");

    let address = configuration.server_address();
    let port = configuration.server_port();
    let app_state = Arc::new(AppState::new(configuration, db));

    info!("Prody server listening on {}:{}", address, port);
    startup::http_server(app_state, address, port)?.await?;

    Ok(())
}
