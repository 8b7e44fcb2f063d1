#![forbid(unsafe_code)]

use std::process::ExitCode;
use taskdeck_server::{build_router, AppState, ServerConfig};
use taskdeck_store::SqliteStore;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match serve().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            error!(error = %msg, "server exited with error");
            ExitCode::FAILURE
        }
    }
}

async fn serve() -> Result<(), String> {
    let config = ServerConfig::from_env();

    // Migrations run inside `open`, before the listener binds: a pod that
    // cannot migrate must fail its rollout instead of serving a stale schema.
    let store = SqliteStore::open(&config.db_path)
        .map_err(|e| format!("failed to open {}: {e}", config.db_path.display()))?;
    info!(db = %config.db_path.display(), "store ready");

    let app = build_router(AppState::new(store));
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .map_err(|e| format!("failed to bind {}: {e}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "taskdeck listening");
    axum::serve(listener, app)
        .await
        .map_err(|e| format!("server error: {e}"))
}
