//! Session token issuance and verification

use crate::config::AuthConfig;
use crate::models::{Account, Role};
use crate::utils::error::{AppError, Result};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};
use uuid::Uuid;

/// Token issuer string
const ISSUER: &str = "flock-rs";

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account ID)
    pub sub: Uuid,
    /// Account role
    pub role: Role,
    /// Linked directory entry (optional)
    pub member_id: Option<Uuid>,
    /// Issued at timestamp
    pub iat: u64,
    /// Expiration timestamp; fixed TTL from issuance, not renewed by use
    pub exp: u64,
    /// Issuer
    pub iss: String,
    /// Token ID
    pub jti: String,
}

/// Signs and verifies session tokens
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl_secs: u64,
}

impl std::fmt::Debug for SessionIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionIssuer")
            .field("algorithm", &self.algorithm)
            .field("ttl_secs", &self.ttl_secs)
            .field("encoding_key", &"[REDACTED]")
            .field("decoding_key", &"[REDACTED]")
            .finish()
    }
}

impl SessionIssuer {
    /// Create a new session issuer from configuration
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.session_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            ttl_secs: config.session_ttl_secs,
        }
    }

    /// Issue a session token for an account
    pub fn issue(&self, account: &Account) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AppError::crypto(format!("System time error: {}", e)))?
            .as_secs();

        let claims = SessionClaims {
            sub: account.id,
            role: account.role,
            member_id: account.member_id,
            iat: now,
            exp: now + self.ttl_secs,
            iss: ISSUER.to_string(),
            jti: Uuid::new_v4().to_string(),
        };

        let header = Header::new(self.algorithm);
        let token = encode(&header, &claims, &self.encoding_key).map_err(AppError::Jwt)?;

        debug!("Issued session for account: {}", account.id);
        Ok(token)
    }

    /// Verify a session token and return its claims
    pub fn verify(&self, token: &str) -> Result<SessionClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[ISSUER]);

        let token_data =
            decode::<SessionClaims>(token, &self.decoding_key, &validation).map_err(|e| {
                warn!("Session verification failed: {}", e);
                AppError::Jwt(e)
            })?;

        Ok(token_data.claims)
    }

    /// Extract a bearer token from an Authorization header value
    pub fn extract_bearer(header_value: &str) -> Option<&str> {
        header_value.strip_prefix("Bearer ")
    }

    /// Session lifetime in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}
