use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info, instrument};

use crate::agent::{AgentFactory, Identity, InvocationRequest, InvocationResult, RuntimeContext};
use crate::config_manager::MemorySettings;
use crate::memory::MemoryConfig;

/// Normalizes one inbound request, runs it through a freshly built agent
/// and maps the outcome onto the result envelope.
///
/// Every call is independent: the agent and its memory configuration are
/// built per request and dropped afterwards.
pub struct InvocationHandler {
    factory: Arc<dyn AgentFactory>,
    memory: MemorySettings,
}

impl InvocationHandler {
    pub fn new(factory: Arc<dyn AgentFactory>, memory: MemorySettings) -> Self {
        Self { factory, memory }
    }

    /// Handle one request. Never fails: any error is reported inside the
    /// returned envelope with `status = "error"`.
    #[instrument(skip_all)]
    pub async fn invoke(
        &self,
        payload: Option<Value>,
        context: Option<&RuntimeContext>,
    ) -> InvocationResult {
        let payload_keys: Vec<String> = match &payload {
            Some(Value::Object(map)) => map.keys().cloned().collect(),
            _ => Vec::new(),
        };
        info!(payload_keys = ?payload_keys, "Calculator agent invoked");

        let identity = Identity::resolve(context);
        let timestamp = context.and_then(|ctx| ctx.timestamp.clone());

        let outcome = AssertUnwindSafe(self.process(payload, &identity))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(anyhow::anyhow!("agent panicked: {}", panic_message(&*panic))));

        match outcome {
            Ok(response) => {
                info!(
                    session_id = %identity.session_id,
                    actor_id = %identity.actor_id,
                    "Calculator agent completed successfully"
                );
                InvocationResult::success(response, &identity, timestamp)
            }
            Err(e) => {
                error!(
                    error = %format!("{:#}", e),
                    session_id = %identity.session_id,
                    actor_id = %identity.actor_id,
                    "Calculator agent error"
                );
                InvocationResult::error(format!("{:#}", e), &identity, timestamp)
            }
        }
    }

    async fn process(&self, payload: Option<Value>, identity: &Identity) -> anyhow::Result<String> {
        let request = InvocationRequest::from_payload(payload)?;
        let memory_config = self.memory_config(identity);
        let mut agent = self.factory.create_agent(memory_config)?;
        let prompt = request.augmented_prompt();

        info!(
            session_id = %identity.session_id,
            actor_id = %identity.actor_id,
            agent = %agent.name(),
            "Processing calculation request"
        );
        let response = agent.invoke(&prompt).await?;
        Ok(response.response_text())
    }

    fn memory_config(&self, identity: &Identity) -> Option<MemoryConfig> {
        self.memory
            .memory_id()
            .map(|memory_id| MemoryConfig::for_identity(memory_id, identity))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
