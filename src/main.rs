use context_router::{
    api::{build_router, AppState},
    config::Config,
    observability::init_tracing,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(&config.logging);

    let state = AppState::new(&config);
    let router = build_router(state, config.server.max_body_size);

    let address = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!("MCP server listening on {}", address);
    info!("API endpoint: http://{}/api/mcp", address);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
