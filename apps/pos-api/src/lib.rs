//! # Atlas POS API
//!
//! JSON over HTTP in front of the order settlement engine.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Till ──► TraceLayer ──► CorsLayer ──► DefaultBodyLimit ──► Router      │
//! │                                          │                              │
//! │            CurrentOperator (x-operator-id / x-operator-role headers)    │
//! │                                          │                              │
//! │                                          ▼                              │
//! │                     ┌──────────────────────────────────┐                │
//! │                     │  AppState                        │                │
//! │                     │  ├── db: Database (repositories) │                │
//! │                     │  └── checkout: Checkout          │                │
//! │                     └──────────────────────────────────┘                │
//! │                                          │                              │
//! │                                          ▼                              │
//! │      ApiResponse { success: true, data }  |  ApiError { code, message } │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod operator;
pub mod response;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Builds the application router with middleware and state applied.
///
/// Bodies over `state.body_limit` are answered with 413.
pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(DefaultBodyLimit::max(state.body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initializes the tracing subscriber.
///
/// ## Log Levels
/// - Default: `info,atlas=debug,sqlx=warn`
/// - Override with `RUST_LOG`, e.g. `RUST_LOG=atlas_db=trace`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,atlas=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}
