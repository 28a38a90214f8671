//! Mapping from a Lambda invocation event to the handler's inputs.
//!
//! The event is the request payload itself. Two optional top-level keys
//! carry the runtime context instead of request data: `session_id` and
//! `headers` (string values only). They are removed before the payload is
//! handed to the handler.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::agent::{RuntimeContext, SESSION_ID_HEADER};

const SESSION_ID_KEY: &str = "session_id";
const HEADERS_KEY: &str = "headers";

/// Split a raw Lambda event into the request payload and its runtime
/// context. `received_at` becomes the context timestamp.
pub fn split_event(event: Value, received_at: DateTime<Utc>) -> (Option<Value>, RuntimeContext) {
    let mut context = RuntimeContext {
        timestamp: Some(Value::String(received_at.to_rfc3339())),
        ..Default::default()
    };

    let mut map = match event {
        Value::Null => return (None, context),
        Value::Object(map) => map,
        // Left for the handler to reject
        other => return (Some(other), context),
    };

    if let Some(Value::Object(headers)) = map.remove(HEADERS_KEY) {
        context.headers = Some(string_headers(headers));
    }
    context.session_id = match map.remove(SESSION_ID_KEY) {
        Some(Value::String(session_id)) => Some(session_id),
        _ => context.header(SESSION_ID_HEADER).map(str::to_string),
    };

    (Some(Value::Object(map)), context)
}

fn string_headers(headers: Map<String, Value>) -> HashMap<String, String> {
    headers
        .into_iter()
        .filter_map(|(name, value)| match value {
            Value::String(value) => Some((name, value)),
            _ => None,
        })
        .collect()
}
