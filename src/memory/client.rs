use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::agent::conversation::{Message, Role};
use crate::config_manager::MemorySettings;
use crate::error::AgentError;

/// A fact returned by semantic retrieval
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub namespace: String,
    pub content: String,
    pub score: Option<f64>,
}

/// Interface to the managed memory service
#[async_trait]
pub trait MemoryClient: Send + Sync {
    /// Search one namespace for records relevant to `query`
    async fn retrieve_memory_records(
        &self,
        memory_id: &str,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> anyhow::Result<Vec<MemoryRecord>>;

    /// Conversation turns stored for a session, oldest first
    async fn list_events(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        max_results: usize,
    ) -> anyhow::Result<Vec<Message>>;

    /// Store conversation turns for a session
    async fn create_event(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        messages: &[Message],
    ) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveRequest<'a> {
    namespace: &'a str,
    search_criteria: SearchCriteria<'a>,
    max_results: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchCriteria<'a> {
    search_query: &'a str,
    top_k: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetrieveResponse {
    #[serde(default)]
    memory_record_summaries: Vec<MemoryRecordSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemoryRecordSummary {
    content: TextContent,
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TextContent {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListEventsRequest {
    include_payloads: bool,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct ListEventsResponse {
    #[serde(default)]
    events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    #[serde(default)]
    event_timestamp: Option<f64>,
    #[serde(default)]
    payload: Vec<PayloadItem>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateEventRequest<'a> {
    actor_id: &'a str,
    session_id: &'a str,
    event_timestamp: f64,
    payload: Vec<PayloadItem>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PayloadItem {
    #[serde(default)]
    conversational: Option<Conversational>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Conversational {
    content: TextContent,
    role: String,
}

impl PayloadItem {
    fn from_message(message: &Message) -> Self {
        let role = match message.role {
            Role::User => "USER",
            Role::Assistant => "ASSISTANT",
        };
        Self {
            conversational: Some(Conversational {
                content: TextContent {
                    text: message.content.clone(),
                },
                role: role.to_string(),
            }),
        }
    }

    fn into_message(self) -> Option<Message> {
        let conversational = self.conversational?;
        let role = match conversational.role.as_str() {
            "USER" => Role::User,
            "ASSISTANT" => Role::Assistant,
            _ => return None,
        };
        Some(Message {
            role,
            content: conversational.content.text,
        })
    }
}

/// HTTP client for the AgentCore memory data plane.
///
/// Requests carry an optional Bearer token and are not SigV4-signed, so
/// the regional AWS endpoint will reject them. Point `endpoint` at a
/// signing proxy or a compatible memory service instead.
pub struct AgentCoreMemoryClient {
    client: Client,
    endpoint: Url,
    api_key: Option<SecretString>,
}

impl AgentCoreMemoryClient {
    pub fn new(settings: &MemorySettings) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let endpoint = Url::parse(&settings.endpoint())
            .map_err(|e| AgentError::Construction(format!("invalid memory endpoint: {}", e)))?;
        info!("Initialized AgentCoreMemoryClient: endpoint={}", endpoint);
        Ok(Self {
            client,
            endpoint,
            api_key: settings.api_key.clone().map(SecretString::from),
        })
    }

    fn url(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| AgentError::Memory(format!("endpoint cannot be a base: {}", self.endpoint)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn post<B, R>(&self, url: Url, body: &B) -> anyhow::Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!(url = %url, "Memory service request");
        let mut request = self.client.post(url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AgentError::Memory(format!("HTTP request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Memory service error response");
            return Err(AgentError::Memory(format!("HTTP {}: {}", status, body)).into());
        }
        let parsed = response
            .json()
            .await
            .map_err(|e| AgentError::Memory(format!("invalid response: {}", e)))?;
        Ok(parsed)
    }
}

#[async_trait]
impl MemoryClient for AgentCoreMemoryClient {
    async fn retrieve_memory_records(
        &self,
        memory_id: &str,
        namespace: &str,
        query: &str,
        top_k: usize,
    ) -> anyhow::Result<Vec<MemoryRecord>> {
        let url = self.url(&["memories", memory_id, "retrieve"])?;
        let body = RetrieveRequest {
            namespace,
            search_criteria: SearchCriteria {
                search_query: query,
                top_k,
            },
            max_results: top_k,
        };
        let response: RetrieveResponse = self.post(url, &body).await?;
        Ok(response
            .memory_record_summaries
            .into_iter()
            .map(|summary| MemoryRecord {
                namespace: namespace.to_string(),
                content: summary.content.text,
                score: summary.score,
            })
            .collect())
    }

    async fn list_events(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        max_results: usize,
    ) -> anyhow::Result<Vec<Message>> {
        let url = self.url(&["memories", memory_id, "actor", actor_id, "sessions", session_id])?;
        let body = ListEventsRequest {
            include_payloads: true,
            max_results,
        };
        let response: ListEventsResponse = self.post(url, &body).await?;
        Ok(events_to_messages(response.events))
    }

    async fn create_event(
        &self,
        memory_id: &str,
        actor_id: &str,
        session_id: &str,
        messages: &[Message],
    ) -> anyhow::Result<()> {
        let url = self.url(&["memories", memory_id, "events"])?;
        let body = CreateEventRequest {
            actor_id,
            session_id,
            event_timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
            payload: messages.iter().map(PayloadItem::from_message).collect(),
        };
        let _: serde_json::Value = self.post(url, &body).await?;
        Ok(())
    }
}

fn events_to_messages(mut events: Vec<Event>) -> Vec<Message> {
    events.sort_by(|a, b| {
        let a = a.event_timestamp.unwrap_or(0.0);
        let b = b.event_timestamp.unwrap_or(0.0);
        a.total_cmp(&b)
    });
    events
        .into_iter()
        .flat_map(|event| event.payload)
        .filter_map(PayloadItem::into_message)
        .collect()
}
