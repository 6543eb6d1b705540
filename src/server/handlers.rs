//! HTTP handlers for the authentication endpoints

use crate::auth::middleware::{SESSION_COOKIE, signin_client_id};
use crate::models::Account;
use crate::server::state::AppState;
use crate::utils::error::AppError;
use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{HttpRequest, HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

/// Sign-in request
#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    email: String,
    password: String,
}

/// Registration request; presence is validated by hand so missing fields get
/// a field-level message instead of a deserialization error
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Forgot-password request
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    email: Option<String>,
}

/// Reset-password request
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Verify-token query
#[derive(Debug, Deserialize)]
pub struct VerifyTokenQuery {
    #[serde(default)]
    token: Option<String>,
}

/// Account body in responses (no secrets)
#[derive(Debug, Serialize)]
pub struct AccountBody {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    #[serde(rename = "memberId")]
    member_id: Option<Uuid>,
}

impl From<Account> for AccountBody {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role.to_string(),
            member_id: account.member_id,
        }
    }
}

/// Sign-in response
#[derive(Debug, Serialize)]
pub struct SigninResponse {
    token: String,
    user: AccountBody,
}

/// Plain success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    success: bool,
}

/// Verify-token response
#[derive(Debug, Serialize)]
pub struct VerifyTokenResponse {
    valid: bool,
}

/// Sign-in endpoint
pub async fn signin(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Json<SigninRequest>,
) -> Result<HttpResponse, AppError> {
    let client_id = signin_client_id(&req, &body.email);

    if let Err(retry_after) = state.login_limiter.check_allowed(&client_id) {
        return Ok(HttpResponse::TooManyRequests().json(serde_json::json!({
            "error": format!(
                "Too many failed sign-in attempts. Retry after {} seconds.",
                retry_after
            )
        })));
    }

    match state.auth.authenticate(&body.email, &body.password).await {
        Ok((account, token)) => {
            state.login_limiter.record_success(&client_id);

            let cookie = Cookie::build(SESSION_COOKIE, token.clone())
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .max_age(CookieDuration::seconds(
                    state.auth.sessions().ttl_secs() as i64
                ))
                .finish();

            Ok(HttpResponse::Ok().cookie(cookie).json(SigninResponse {
                token,
                user: account.into(),
            }))
        }
        Err(AppError::AuthFailure) => {
            if let Some(lockout_secs) = state.login_limiter.record_failure(&client_id) {
                warn!("Sign-in lockout triggered for {}", client_id);
                return Ok(HttpResponse::TooManyRequests().json(serde_json::json!({
                    "error": format!(
                        "Too many failed sign-in attempts. Locked out for {} seconds.",
                        lockout_secs
                    )
                })));
            }
            Err(AppError::AuthFailure)
        }
        Err(e) => Err(e),
    }
}

/// Sign-out endpoint; sessions live client-side, so this only clears the
/// cookie
pub async fn signout() -> HttpResponse {
    let mut cookie = Cookie::build(SESSION_COOKIE, "").path("/").finish();
    cookie.make_removal();

    HttpResponse::Ok()
        .cookie(cookie)
        .json(SuccessResponse { success: true })
}

/// Registration endpoint
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let (name, email, password) = match (
        body.name.as_deref().map(str::trim),
        body.email.as_deref().map(str::trim),
        body.password.as_deref(),
    ) {
        (Some(name), Some(email), Some(password))
            if !name.is_empty() && !email.is_empty() && !password.is_empty() =>
        {
            (name, email, password)
        }
        _ => {
            return Err(AppError::validation(
                "Name, email, and password are required",
            ));
        }
    };

    let account = state.auth.register(name, email, password).await?;
    Ok(HttpResponse::Created().json(AccountBody::from(account)))
}

/// Forgot-password endpoint; responds with success whether or not the email
/// has an account
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let Some(email) = body.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) else {
        return Err(AppError::validation("Email is required"));
    };

    state.auth.request_reset(email).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
}

/// Reset-password endpoint
pub async fn reset_password(
    state: web::Data<AppState>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let (Some(token), Some(password)) = (body.token.as_deref(), body.password.as_deref()) else {
        return Err(AppError::validation("Token and password are required"));
    };

    state.auth.reset_password(token, password).await?;
    Ok(HttpResponse::Ok().json(SuccessResponse { success: true }))
}

/// Verify-token endpoint; read-only, never errors for a merely-invalid token
pub async fn verify_token(
    state: web::Data<AppState>,
    query: web::Query<VerifyTokenQuery>,
) -> Result<HttpResponse, AppError> {
    let Some(token) = query.token.as_deref().filter(|t| !t.is_empty()) else {
        return Err(AppError::validation("Token is required"));
    };

    let valid = state.auth.verify_reset_token(token).await?;
    Ok(HttpResponse::Ok().json(VerifyTokenResponse { valid }))
}

/// Health check endpoint
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": crate::NAME,
        "version": crate::VERSION,
    }))
}
