//! Lambda entrypoint for the calculator agent.

use chrono::Utc;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use health_calculator_agent::agent::{CalculatorAgentFactory, InvocationResult};
use health_calculator_agent::config_manager::Config;
use health_calculator_agent::handlers::InvocationHandler;
use health_calculator_agent::lambda::split_event;

async fn handle(
    handler: Arc<InvocationHandler>,
    event: LambdaEvent<Value>,
) -> Result<InvocationResult, Error> {
    info!(request_id = %event.context.request_id, "Lambda invocation received");
    let (payload, context) = split_event(event.payload, Utc::now());
    Ok(handler.invoke(payload, Some(&context)).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("health_calculator_agent=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .init();

    let config = Config::from_process()?;
    let factory = CalculatorAgentFactory::from_config(&config)?;
    let handler = Arc::new(InvocationHandler::new(
        Arc::new(factory),
        config.memory_config.clone(),
    ));
    info!(
        model_id = %config.agent_config.model.model_id,
        memory_enabled = config.memory_config.is_enabled(),
        "Calculator agent configured for Lambda"
    );

    run(service_fn(move |event| handle(handler.clone(), event))).await
}
