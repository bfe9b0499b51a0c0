//! # Atlas POS API Server
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. init_tracing()            RUST_LOG or info,atlas=debug,sqlx=warn    │
//! │  2. ApiConfig::load()         ATLAS_* environment variables             │
//! │  3. Database::new()           pool + embedded migrations                │
//! │  4. FsProofStore::new()       payment proof directory                   │
//! │  5. axum::serve()             until ctrl-c / SIGTERM                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{info, warn};

use atlas_api::{app, init_tracing, ApiConfig, AppState};
use atlas_db::{Database, DbConfig, FsProofStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting Atlas POS API server...");

    let config = ApiConfig::load()?;
    info!(
        port = config.http_port,
        db_path = %config.db_path.display(),
        proof_dir = %config.proof_dir.display(),
        body_limit = config.body_limit(),
        "Configuration loaded"
    );

    let db_config = DbConfig::new(&config.db_path).max_connections(config.db_max_connections);
    let db = Database::new(db_config)
        .await
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    info!("Database ready");

    let proofs = FsProofStore::new(&config.proof_dir, &config.proof_url_prefix).max_bytes(config.max_proof_bytes);
    let state = AppState::new(db.clone(), Arc::new(proofs)).with_body_limit(config.body_limit());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
