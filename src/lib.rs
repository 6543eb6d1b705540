//! # flock-rs
//!
//! Authentication and access-control core of a church administration system:
//! credential storage, password reset, session issuance, and a role-based
//! access gate over an actix-web HTTP surface.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use flock_rs::config::Config;
//! use flock_rs::server::HttpServer;
//!
//! #[tokio::main]
//! async fn main() -> flock_rs::Result<()> {
//!     let config = Config::from_env()?;
//!     HttpServer::new(config).start().await
//! }
//! ```

#![warn(clippy::all)]

pub mod auth;
pub mod config;
pub mod models;
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;

// Re-export main types
pub use config::Config;
pub use utils::error::{AppError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
