use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::agent::AgentFactory;
use crate::config_manager::Config;
use crate::handlers::InvocationHandler;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub handler: Arc<InvocationHandler>,
    pub active_invocations: Arc<DashMap<Uuid, DateTime<Utc>>>,
    last_status_change: Arc<AtomicI64>,
}

/// Health reported by `GET /ping`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PingStatus {
    Healthy,
    HealthyBusy,
}

#[derive(Debug, Clone, Serialize)]
pub struct PingResponse {
    pub status: PingStatus,
    pub time_of_last_update: i64,
}

impl AppState {
    pub fn new(config: Config, factory: Arc<dyn AgentFactory>) -> Self {
        let handler = InvocationHandler::new(factory, config.memory_config.clone());
        Self {
            config: Arc::new(config),
            handler: Arc::new(handler),
            active_invocations: Arc::new(DashMap::new()),
            last_status_change: Arc::new(AtomicI64::new(Utc::now().timestamp())),
        }
    }

    /// Mark an invocation as in flight. The returned guard clears it on drop,
    /// so a cancelled request never leaves the service looking busy.
    pub fn begin_invocation(&self) -> InvocationGuard {
        let id = Uuid::new_v4();
        if self.active_invocations.is_empty() {
            self.touch();
        }
        self.active_invocations.insert(id, Utc::now());
        InvocationGuard {
            id,
            state: self.clone(),
        }
    }

    fn end_invocation(&self, id: &Uuid) {
        self.active_invocations.remove(id);
        if self.active_invocations.is_empty() {
            self.touch();
        }
    }

    fn touch(&self) {
        self.last_status_change
            .store(Utc::now().timestamp(), Ordering::SeqCst);
    }

    pub fn ping(&self) -> PingResponse {
        let status = if self.active_invocations.is_empty() {
            PingStatus::Healthy
        } else {
            PingStatus::HealthyBusy
        };
        PingResponse {
            status,
            time_of_last_update: self.last_status_change.load(Ordering::SeqCst),
        }
    }
}

pub struct InvocationGuard {
    id: Uuid,
    state: AppState,
}

impl InvocationGuard {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for InvocationGuard {
    fn drop(&mut self) {
        self.state.end_invocation(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::stateless_llm::stateless_llm_interface::tests::FakeLLM;
    use crate::agent::CalculatorAgentFactory;
    use crate::config_manager::AgentConfig;

    fn state() -> AppState {
        let factory =
            CalculatorAgentFactory::new(AgentConfig::default(), Arc::new(FakeLLM::default()));
        AppState::new(Config::default(), Arc::new(factory))
    }

    #[test]
    fn ping_reports_busy_while_invocation_in_flight() {
        let state = state();
        assert_eq!(state.ping().status, PingStatus::Healthy);

        let first = state.begin_invocation();
        let second = state.begin_invocation();
        assert_ne!(first.id(), second.id());
        assert_eq!(state.ping().status, PingStatus::HealthyBusy);

        drop(first);
        assert_eq!(state.ping().status, PingStatus::HealthyBusy);
        drop(second);
        assert_eq!(state.ping().status, PingStatus::Healthy);
        assert!(state.ping().time_of_last_update > 0);
    }

    #[test]
    fn ping_serializes_status_names() {
        let value = serde_json::to_value(state().ping()).unwrap();
        assert_eq!(value["status"], "Healthy");
        assert!(value["time_of_last_update"].is_i64());
    }
}
