use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::stateless_llm_interface::StatelessLLMInterface;
use crate::agent::conversation::{Message, Role};
use crate::agent::output_types::{AgentMessage, AgentResponse, ContentBlock, Usage};
use crate::config_manager::ModelConfig;
use crate::error::AgentError;

/// Request body for Bedrock `invoke` on Anthropic models.
/// The model id travels in the URL path, not the body.
#[derive(Debug, Serialize)]
struct BedrockRequest<'a> {
    anthropic_version: &'static str,
    max_tokens: u32,
    messages: Vec<BedrockMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct BedrockMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct BedrockResponse {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<Usage>,
}

impl From<BedrockResponse> for AgentResponse {
    fn from(response: BedrockResponse) -> Self {
        AgentResponse {
            message: Some(AgentMessage {
                role: response.role.unwrap_or_else(|| "assistant".to_string()),
                content: response.content,
            }),
            stop_reason: response.stop_reason,
            usage: response.usage,
        }
    }
}

/// Claude on AWS Bedrock, authenticated with a Bedrock API key sent as a
/// Bearer token.
///
/// Does not derive `Debug` so the token cannot end up in logs.
pub struct BedrockLLM {
    client: Client,
    api_key: Option<SecretString>,
    endpoint: String,
    model_id: String,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

impl BedrockLLM {
    const API_VERSION: &'static str = "bedrock-2023-05-31";

    pub fn new(config: &ModelConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(300)).build()?;
        let endpoint = match &config.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://bedrock-runtime.{}.amazonaws.com", config.region),
        };
        if config.llm_api_key.is_none() {
            warn!("No Bedrock API key configured; model requests will be unauthenticated");
        }

        info!(
            "Initialized BedrockLLM: model={}, endpoint={}",
            config.model_id, endpoint
        );
        Ok(Self {
            client,
            api_key: config.llm_api_key.clone().map(SecretString::from),
            endpoint,
            model_id: config.model_id.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
        })
    }

    fn url(&self) -> String {
        format!("{}/model/{}/invoke", self.endpoint, self.model_id)
    }

    fn to_request<'a>(&self, messages: &'a [Message], system: Option<&'a str>) -> BedrockRequest<'a> {
        BedrockRequest {
            anthropic_version: Self::API_VERSION,
            max_tokens: self.max_tokens,
            messages: messages
                .iter()
                .map(|m| BedrockMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            system,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }
}

#[async_trait]
impl StatelessLLMInterface for BedrockLLM {
    async fn chat_completion(
        &self,
        messages: &[Message],
        system: Option<&str>,
    ) -> anyhow::Result<AgentResponse> {
        let url = self.url();
        let body = self.to_request(messages, system);
        debug!(url = %url, messages = messages.len(), "Bedrock invoke request");

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::Model(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %error_body, "Bedrock API error response");
            let error = match status.as_u16() {
                401 | 403 => AgentError::Authentication {
                    status: status.as_u16(),
                    body: error_body,
                },
                429 => AgentError::RateLimited(error_body),
                _ => AgentError::Model(format!("HTTP {}: {}", status, error_body)),
            };
            return Err(error.into());
        }

        let parsed: BedrockResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Deserialization(e.to_string()))?;
        Ok(parsed.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, State},
        http::{HeaderMap, StatusCode},
        routing::post,
        Json, Router,
    };
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn config(endpoint: Option<String>) -> ModelConfig {
        ModelConfig {
            model_id: "test-model".to_string(),
            endpoint,
            llm_api_key: Some("bedrock-test-key".to_string()),
            ..Default::default()
        }
    }

    #[derive(Clone, Default)]
    struct Captured {
        requests: Arc<Mutex<Vec<(String, Option<String>, Value)>>>,
    }

    async fn fake_invoke(
        State(captured): State<Captured>,
        Path(model_id): Path<String>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        captured
            .requests
            .lock()
            .unwrap()
            .push((model_id.clone(), auth, body));

        if model_id == "throttled-model" {
            return (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({"message": "Too many requests"})),
            );
        }
        (
            StatusCode::OK,
            Json(json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "Your BMI is 22.9."}],
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 12, "output_tokens": 7}
            })),
        )
    }

    async fn spawn_fake_bedrock() -> (String, Captured) {
        let captured = Captured::default();
        let app = Router::new()
            .route("/model/:model_id/invoke", post(fake_invoke))
            .with_state(captured.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{}", addr), captured)
    }

    #[test]
    fn default_endpoint_is_regional() {
        let llm = BedrockLLM::new(&ModelConfig::default()).unwrap();
        assert_eq!(
            llm.url(),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/us.anthropic.claude-3-7-sonnet-20250219-v1:0/invoke"
        );
    }

    #[test]
    fn request_body_carries_model_settings() {
        let llm = BedrockLLM::new(&config(None)).unwrap();
        let messages = vec![Message::user("Calculate my BMI")];
        let body = serde_json::to_value(llm.to_request(&messages, Some("be precise"))).unwrap();

        assert_eq!(body["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(body["max_tokens"], 2000);
        assert_eq!(body["system"], "be precise");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "Calculate my BMI");
        assert!(body.get("model").is_none());
    }

    #[tokio::test]
    async fn completion_round_trip() {
        let (endpoint, captured) = spawn_fake_bedrock().await;
        let llm = BedrockLLM::new(&config(Some(endpoint))).unwrap();

        let response = llm
            .chat_completion(&[Message::user("Calculate my BMI")], Some("system"))
            .await
            .unwrap();

        assert_eq!(response.first_text(), Some("Your BMI is 22.9."));
        assert_eq!(response.stop_reason.as_deref(), Some("end_turn"));
        assert_eq!(response.usage.unwrap().output_tokens, 7);

        let requests = captured.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (model_id, auth, body) = &requests[0];
        assert_eq!(model_id, "test-model");
        assert_eq!(auth.as_deref(), Some("Bearer bedrock-test-key"));
        assert_eq!(body["messages"][0]["content"], "Calculate my BMI");
    }

    #[tokio::test]
    async fn throttling_maps_to_rate_limited() {
        let (endpoint, _captured) = spawn_fake_bedrock().await;
        let llm = BedrockLLM::new(&ModelConfig {
            model_id: "throttled-model".to_string(),
            endpoint: Some(endpoint),
            ..Default::default()
        })
        .unwrap();

        let err = llm
            .chat_completion(&[Message::user("hi")], None)
            .await
            .unwrap_err();
        match err.downcast_ref::<AgentError>() {
            Some(AgentError::RateLimited(body)) => assert!(body.contains("Too many requests")),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
