use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use badgetrack_memory::MemoryStore;
use badgetrack_server::state::AppState;

/// `badgetrack health` — liveness probe for Docker HEALTHCHECK.
///
/// Calls `GET http://localhost:$BADGETRACK_PORT/health`.
/// Exits 0 if the server responds with HTTP 200, exits 1 otherwise.
fn run_health_check() -> ! {
    let port = std::env::var("BADGETRACK_PORT").unwrap_or_else(|_| "3000".to_string());
    let url = format!("http://localhost:{}/health", port);
    match ureq::get(&url).call() {
        Ok(resp) if resp.status() == 200 => std::process::exit(0),
        _ => std::process::exit(1),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Health-check subcommand — handled before tokio does any work so the
    // binary stays fast when used as a Docker HEALTHCHECK probe.
    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("health") {
        run_health_check();
    }

    // Structured JSON logging. Level controlled via RUST_LOG env var.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("badgetrack=info".parse()?),
        )
        .json()
        .init();

    let cfg = badgetrack_core::config::Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    // The in-memory store is the shipped backend; a durable KV service slots
    // in behind the same trait without touching the handlers.
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(store, cfg.clone()));

    let addr = format!("0.0.0.0:{}", cfg.port);
    let app = badgetrack_server::app::build_app(Arc::clone(&state));

    info!(port = cfg.port, "badgetrack listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
        })
        .await?;

    Ok(())
}
