// Operational Settings - Web Server
// REST API with Axum over the category and branch registries

use anyhow::{Context, Result};
use ops_settings::server::{router, AppState};
use ops_settings::{init_tracing, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.log_level);

    let state = AppState::from_config(&config).context("Failed to initialise registries")?;
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "server running");
    info!("API: http://{}/api/categories", config.bind_addr);

    axum::serve(listener, app)
        .await
        .context("Server stopped unexpectedly")?;

    Ok(())
}
