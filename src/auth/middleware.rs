//! Access gate middleware and sign-in brute-force protection

use crate::auth::gate::{self, GateDecision};
use crate::auth::session::{SessionClaims, SessionIssuer};
use crate::server::state::AppState;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::header;
use actix_web::{Error, HttpResponse, web};
use dashmap::DashMap;
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Session cookie name
pub const SESSION_COOKIE: &str = "flock_session";

/// Pull session claims out of a request, from the session cookie or a
/// bearer token. An invalid or expired token counts as no session.
pub fn extract_claims(req: &ServiceRequest, sessions: &SessionIssuer) -> Option<SessionClaims> {
    let token = req
        .request()
        .cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| {
            req.headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(SessionIssuer::extract_bearer)
                .map(|t| t.to_string())
        })?;

    sessions.verify(&token).ok()
}

/// Access gate middleware.
///
/// Runs the gate decision on every request outside the static-asset and API
/// prefixes; API handlers do their own auth.
pub struct AccessGate;

impl<S, B> Transform<S, ServiceRequest> for AccessGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AccessGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGateMiddleware { service }))
    }
}

/// Service implementation for the access gate
pub struct AccessGateMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AccessGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let path = req.path().to_string();

        if gate::is_static_asset(&path) || gate::is_api_route(&path) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) });
        }

        let claims = req
            .app_data::<web::Data<AppState>>()
            .and_then(|state| extract_claims(&req, state.auth.sessions()));

        match gate::decide(&path, claims.as_ref()) {
            GateDecision::Allow => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
            }
            GateDecision::RedirectToSignIn { callback_url } => {
                debug!("Redirecting unauthenticated request for {} to sign-in", path);
                let query: String = url::form_urlencoded::Serializer::new(String::new())
                    .append_pair("callbackUrl", &callback_url)
                    .finish();
                let location = format!("/auth/signin?{}", query);
                Box::pin(async move { Ok(redirect(req, &location)) })
            }
            GateDecision::RedirectHome => {
                debug!("Redirecting under-privileged request for {} home", path);
                Box::pin(async move { Ok(redirect(req, "/")) })
            }
        }
    }
}

/// Build a 307 redirect response for a gated request
fn redirect<B>(req: ServiceRequest, location: &str) -> ServiceResponse<EitherBody<B>> {
    let response = HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, location))
        .finish()
        .map_into_right_body();
    req.into_response(response)
}

/// Brute-force protection for the sign-in endpoint.
///
/// Tracks failed attempts per client in a time window and locks the client
/// out with exponential backoff after too many failures.
pub struct LoginRateLimiter {
    /// Client identifier -> attempt tracker
    attempts: DashMap<String, AttemptTracker>,
    /// Maximum failed attempts before lockout
    max_attempts: u32,
    /// Time window for counting failures (seconds)
    window_secs: u64,
    /// Base lockout duration (seconds); doubles per consecutive lockout
    base_lockout_secs: u64,
    /// Total blocked attempts, for monitoring
    blocked_count: AtomicU64,
}

/// Failed-attempt state for one client
struct AttemptTracker {
    failure_count: u32,
    window_start: Instant,
    lockout_until: Option<Instant>,
    lockout_count: u32,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        // 5 attempts per 5 minutes, 1 minute base lockout
        Self::new(5, 300, 60)
    }
}

impl LoginRateLimiter {
    /// Create a new limiter
    pub fn new(max_attempts: u32, window_secs: u64, base_lockout_secs: u64) -> Self {
        Self {
            attempts: DashMap::new(),
            max_attempts,
            window_secs,
            base_lockout_secs,
            blocked_count: AtomicU64::new(0),
        }
    }

    /// Check whether a client may attempt a sign-in.
    ///
    /// Returns Err with the seconds remaining when the client is locked out.
    pub fn check_allowed(&self, client_id: &str) -> Result<(), u64> {
        let now = Instant::now();
        let mut entry = self
            .attempts
            .entry(client_id.to_string())
            .or_insert_with(|| AttemptTracker {
                failure_count: 0,
                window_start: now,
                lockout_until: None,
                lockout_count: 0,
            });
        let tracker = entry.value_mut();

        if let Some(lockout_until) = tracker.lockout_until {
            if now < lockout_until {
                let remaining = lockout_until.duration_since(now).as_secs();
                self.blocked_count.fetch_add(1, Ordering::Relaxed);
                warn!(
                    "Sign-in blocked for {} - locked out for {} more seconds",
                    client_id, remaining
                );
                return Err(remaining);
            }
            // Lockout expired; keep the lockout count for backoff
            tracker.lockout_until = None;
            tracker.failure_count = 0;
            tracker.window_start = now;
        }

        if now.duration_since(tracker.window_start) > Duration::from_secs(self.window_secs) {
            tracker.failure_count = 0;
            tracker.window_start = now;
            tracker.lockout_count = tracker.lockout_count.saturating_sub(1);
        }

        Ok(())
    }

    /// Record a failed sign-in; returns the lockout duration when the client
    /// just got locked out
    pub fn record_failure(&self, client_id: &str) -> Option<u64> {
        let now = Instant::now();
        let mut entry = self
            .attempts
            .entry(client_id.to_string())
            .or_insert_with(|| AttemptTracker {
                failure_count: 0,
                window_start: now,
                lockout_until: None,
                lockout_count: 0,
            });
        let tracker = entry.value_mut();
        tracker.failure_count += 1;

        if tracker.failure_count >= self.max_attempts {
            let multiplier = 2u64.pow(tracker.lockout_count.min(6));
            let lockout_secs = self.base_lockout_secs * multiplier;
            tracker.lockout_until = Some(now + Duration::from_secs(lockout_secs));
            tracker.lockout_count += 1;
            tracker.failure_count = 0;

            warn!(
                "Client {} locked out for {} seconds after {} failed sign-ins",
                client_id, lockout_secs, self.max_attempts
            );
            return Some(lockout_secs);
        }

        None
    }

    /// Record a successful sign-in, resetting the failure count
    pub fn record_success(&self, client_id: &str) {
        if let Some(mut entry) = self.attempts.get_mut(client_id) {
            entry.failure_count = 0;
            entry.lockout_until = None;
            entry.lockout_count = entry.lockout_count.saturating_sub(1);
        }
    }

    /// Total blocked attempts so far
    pub fn blocked_attempts(&self) -> u64 {
        self.blocked_count.load(Ordering::Relaxed)
    }
}

/// Client identifier for sign-in rate limiting: peer IP plus the claimed
/// email, so one address cannot burn through many accounts unnoticed
pub fn signin_client_id(req: &actix_web::HttpRequest, email: &str) -> String {
    let ip = req
        .connection_info()
        .peer_addr()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!("{}:{}", ip, email)
}
