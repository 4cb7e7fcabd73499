//! Application State
//!
//! Shared state across all handlers.

use metrics_exporter_prometheus::PrometheusHandle;
use parking_lot::RwLock;
use std::sync::Arc;

use voice_coach_config::Settings;
use voice_coach_core::RecordSink;
use voice_coach_llm::{AgentGateway, GatewayFactory};
use voice_coach_persistence::InMemoryRecordStore;
use voice_coach_text_processing::Extractor;

use crate::session::Registry;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Settings>>,
    /// Live sessions and the record sink
    pub registry: Arc<Registry>,
    /// `None` when credentials are missing; connections are then refused
    pub gateway: Option<Arc<AgentGateway>>,
    pub extractor: Extractor,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state with the in-memory record store
    pub fn new(config: Settings) -> Self {
        Self::with_record_sink(config, Arc::new(InMemoryRecordStore::new()))
    }

    /// Create application state with a custom record sink (e.g., ScyllaDB)
    pub fn with_record_sink(config: Settings, records: Arc<dyn RecordSink>) -> Self {
        let registry = Registry::new(config.session.max_sessions, records)
            .with_bridge_capacity(config.bridge.input_capacity, config.bridge.output_capacity);

        let gateway = match GatewayFactory::create(&config.gateway) {
            Ok(gateway) => {
                tracing::info!(
                    agent = %gateway.agent_name(),
                    synthesis = gateway.has_synthesizer(),
                    "Agent gateway ready"
                );
                Some(Arc::new(gateway))
            },
            Err(e) => {
                tracing::warn!(error = %e, "Agent gateway unavailable, conversations will be refused");
                None
            },
        };

        Self {
            config: Arc::new(RwLock::new(config)),
            registry: Arc::new(registry),
            gateway,
            extractor: Extractor::new(),
            metrics: None,
        }
    }

    /// Replace the gateway (tests, alternative agents)
    pub fn with_gateway(mut self, gateway: Option<Arc<AgentGateway>>) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }
}
