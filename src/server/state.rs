//! Application state shared across HTTP handlers

use crate::auth::AuthService;
use crate::auth::middleware::LoginRateLimiter;
use crate::config::Config;
use std::sync::Arc;

/// HTTP server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (shared read-only)
    pub config: Arc<Config>,
    /// Authentication service
    pub auth: Arc<AuthService>,
    /// Sign-in brute-force limiter
    pub login_limiter: Arc<LoginRateLimiter>,
}

impl AppState {
    /// Create a new AppState with shared resources
    pub fn new(config: Config, auth: AuthService) -> Self {
        Self {
            config: Arc::new(config),
            auth: Arc::new(auth),
            login_limiter: Arc::new(LoginRateLimiter::default()),
        }
    }
}
