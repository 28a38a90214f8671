use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashMap;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::agent::{Identity, InvocationResult, RuntimeContext, SESSION_ID_HEADER};
use crate::state::{AppState, PingResponse};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/invocations", post(invocations))
        .route("/ping", get(ping))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn invocations(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<InvocationResult>) {
    let context = runtime_context(&headers);
    let _guard = state.begin_invocation();

    let payload = if body.iter().all(u8::is_ascii_whitespace) {
        None
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!(error = %e, "Rejecting malformed invocation body");
                let identity = Identity::resolve(Some(&context));
                let result = InvocationResult::error(
                    format!("invalid JSON body: {}", e),
                    &identity,
                    context.timestamp.clone(),
                );
                return (StatusCode::BAD_REQUEST, Json(result));
            }
        }
    };

    let result = state.handler.invoke(payload, Some(&context)).await;
    (StatusCode::OK, Json(result))
}

async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(state.ping())
}

/// Build the runtime context the host passes along with a request
fn runtime_context(headers: &HeaderMap) -> RuntimeContext {
    let session_id = headers
        .get(SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let header_map: HashMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    debug!(headers = header_map.len(), "Received invocation");

    RuntimeContext {
        session_id,
        headers: Some(header_map),
        timestamp: Some(Value::String(Utc::now().to_rfc3339())),
    }
}
