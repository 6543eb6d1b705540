//! Authentication configuration

use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret used to sign session tokens
    #[serde(default = "generate_session_secret")]
    pub session_secret: String,
    /// Session lifetime in seconds; fixed TTL, not renewed by use
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
    /// Reset token lifetime in seconds
    #[serde(default = "default_reset_token_ttl")]
    pub reset_token_ttl_secs: i64,
    /// Minimum password length
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: generate_session_secret(),
            session_ttl_secs: default_session_ttl(),
            reset_token_ttl_secs: default_reset_token_ttl(),
            min_password_len: default_min_password_len(),
        }
    }
}

impl AuthConfig {
    /// Validate authentication configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.session_secret.len() < 32 {
            return Err(
                "Session secret must be at least 32 characters long for security".to_string(),
            );
        }
        if self.session_secret == "change-me" || self.session_secret == "your-secret-key" {
            return Err(
                "Session secret must not use default values. Please generate a secure random secret."
                    .to_string(),
            );
        }
        if self.session_ttl_secs == 0 {
            return Err("Session TTL must be greater than zero".to_string());
        }
        if self.reset_token_ttl_secs <= 0 {
            return Err("Reset token TTL must be greater than zero".to_string());
        }
        if self.min_password_len < 8 {
            return Err("Minimum password length must be at least 8".to_string());
        }
        Ok(())
    }
}

/// 30 days
fn default_session_ttl() -> u64 {
    30 * 24 * 60 * 60
}

/// 1 hour
fn default_reset_token_ttl() -> i64 {
    3600
}

fn default_min_password_len() -> usize {
    8
}

/// Generate a random session secret when none is configured.
///
/// Sessions signed with a generated secret do not survive a restart, so
/// production deployments should always configure one.
fn generate_session_secret() -> String {
    warn!("No session secret configured, generating a random one; sessions will not survive restarts");
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
