//! HTTP server
//!
//! Wires the auth service, access gate, and routes into an actix-web
//! application.

pub mod handlers;
pub mod routes;
pub mod state;

pub use state::AppState;

use crate::auth::AuthService;
use crate::auth::middleware::AccessGate;
use crate::config::Config;
use crate::services::mailer::LogMailer;
use crate::storage::MemoryStore;
use crate::utils::error::{AppError, Result};
use actix_web::{App, HttpServer as ActixHttpServer, web};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;

/// HTTP server
pub struct HttpServer {
    config: Config,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the in-memory store and log mailer
    pub fn new(config: Config) -> Self {
        info!("Creating HTTP server");

        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(LogMailer);
        let auth = AuthService::new(&config, store, mailer);
        let state = AppState::new(config.clone(), auth);

        Self { config, state }
    }

    /// Start the HTTP server
    pub async fn start(self) -> Result<()> {
        let bind_addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        info!("Starting HTTP server on {}", bind_addr);

        let state = web::Data::new(self.state);

        let server = ActixHttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(TracingLogger::default())
                .wrap(AccessGate)
                .configure(routes::configure)
        })
        .bind(&bind_addr)
        .map_err(|e| AppError::config(format!("Failed to bind {}: {}", bind_addr, e)))?
        .run();

        info!("HTTP server listening on {}", bind_addr);

        server
            .await
            .map_err(|e| AppError::config(format!("Server error: {}", e)))?;

        info!("HTTP server stopped");
        Ok(())
    }
}

/// Run the server with automatic configuration loading
pub async fn run_server() -> Result<()> {
    let config_path =
        std::env::var("FLOCK_CONFIG").unwrap_or_else(|_| "config/flock.yaml".to_string());

    let config = match Config::from_file(&config_path).await {
        Ok(config) => {
            info!("Configuration file loaded: {}", config_path);
            config
        }
        Err(e) => {
            info!(
                "Configuration file not loaded ({}), falling back to environment",
                e
            );
            Config::from_env()?
        }
    };

    HttpServer::new(config).start().await
}
