//! Mock API state management.
//!
//! Holds the canned response and the recorded traffic of every endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::services::{ServiceDefinition, ServiceDefinitions};

/// Identifies one mock endpoint: service kind, service name and HTTP method.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    pub kind: String,
    pub service: String,
    pub method: String,
}

impl EndpointKey {
    /// Kind and method compare case-insensitively; the service name is exact.
    pub fn new(kind: &str, service: &str, method: &str) -> Self {
        Self {
            kind: kind.to_ascii_uppercase(),
            service: service.to_string(),
            method: method.to_ascii_uppercase(),
        }
    }
}

/// The answer replayed by an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CannedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// One request received by an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub headers: Vec<(String, String)>,
    pub body: String,
}

#[derive(Debug, Default)]
struct EndpointState {
    response: Option<CannedResponse>,
    recorded: Vec<RecordedRequest>,
}

/// Shared state for the mock API.
///
/// Wrapped in `Arc<RwLock<_>>` by the router so handlers can share it.
#[derive(Debug, Default)]
pub struct MockApiState {
    services: Option<ServiceDefinitions>,
    endpoints: HashMap<EndpointKey, EndpointState>,
}

impl MockApiState {
    /// State that accepts any service name.
    pub fn new() -> Self {
        Self::default()
    }

    /// State limited to the given services.
    pub fn with_services(services: ServiceDefinitions) -> Self {
        Self {
            services: Some(services),
            endpoints: HashMap::new(),
        }
    }

    /// Create state wrapped in Arc<RwLock> for sharing.
    pub fn shared(self) -> Arc<RwLock<Self>> {
        Arc::new(RwLock::new(self))
    }

    /// Whether `service` of `kind` may be used.
    pub fn knows_service(&self, kind: &str, service: &str) -> bool {
        match &self.services {
            Some(defined) => defined.contains(kind, service),
            None => true,
        }
    }

    /// Defined services, or the services seen so far when none are defined.
    pub fn services(&self) -> Vec<ServiceDefinition> {
        match &self.services {
            Some(defined) => defined.services.clone(),
            None => {
                let mut seen: Vec<ServiceDefinition> = self
                    .endpoints
                    .keys()
                    .map(|key| ServiceDefinition {
                        name: key.service.clone(),
                        kind: key.kind.clone(),
                    })
                    .collect();
                seen.sort();
                seen.dedup();
                seen
            }
        }
    }

    /// Forget the response and recordings of `key`.
    pub fn init(&mut self, key: EndpointKey) {
        self.endpoints.insert(key, EndpointState::default());
    }

    /// Replace the response replayed by `key`.
    pub fn set_response(&mut self, key: EndpointKey, response: CannedResponse) {
        self.endpoints.entry(key).or_default().response = Some(response);
    }

    /// Record `request` against `key` and return the response to replay.
    pub fn record(&mut self, key: EndpointKey, request: RecordedRequest) -> Option<CannedResponse> {
        let endpoint = self.endpoints.entry(key).or_default();
        endpoint.recorded.push(request);
        endpoint.response.clone()
    }

    /// The `index`-th recorded request of `key`, or the latest one.
    pub fn recorded(&self, key: &EndpointKey, index: Option<usize>) -> Option<&RecordedRequest> {
        let recorded = &self.endpoints.get(key)?.recorded;
        match index {
            Some(i) => recorded.get(i),
            None => recorded.last(),
        }
    }

    /// Number of requests recorded against `key`.
    pub fn recorded_count(&self, key: &EndpointKey) -> usize {
        self.endpoints.get(key).map_or(0, |e| e.recorded.len())
    }
}
