//! HTTP route configuration

use crate::server::handlers;
use actix_web::web;

/// Configure all routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .service(
            web::scope("/api/auth")
                .route("/signin", web::post().to(handlers::signin))
                .route("/signout", web::post().to(handlers::signout))
                .route("/register", web::post().to(handlers::register))
                .route("/forgot-password", web::post().to(handlers::forgot_password))
                .route("/reset-password", web::post().to(handlers::reset_password))
                .route("/verify-token", web::get().to(handlers::verify_token)),
        );
}
