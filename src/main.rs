use anyhow::Result;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use health_calculator_agent::agent::CalculatorAgentFactory;
use health_calculator_agent::config_manager::Config;
use health_calculator_agent::routes::create_router;
use health_calculator_agent::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("health_calculator_agent=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_process()?;
    let addr = config.system_config.socket_addr()?;
    let factory = CalculatorAgentFactory::from_config(&config)?;
    info!(
        model_id = %config.agent_config.model.model_id,
        memory_enabled = config.memory_config.is_enabled(),
        "Calculator agent configured"
    );

    let app = create_router(AppState::new(config, Arc::new(factory)));

    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
