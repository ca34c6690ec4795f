//! Built-in mock API web application.
//!
//! An axum router that speaks the control plane [`HttpApiMock`](crate::HttpApiMock)
//! expects. Each endpoint is keyed by service kind (`REST`/`SOAP`), service
//! name and HTTP method:
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /services` | health check, lists services |
//! | `POST /services/{kind}/{service}/operations/{method}/init` | forget response and recordings |
//! | `POST /services/{kind}/{service}/operations/{method}/responses` | register the canned response |
//! | `GET /services/{kind}/{service}/operations/{method}/recorded-requests` | last recorded body |
//! | `GET /services/{kind}/{service}/operations/{method}/recorded-request-headers` | last recorded headers |
//! | `ANY /services/{kind}/{service}/endpoint[/..]` | the mocked endpoint |
//!
//! The registered response's headers come from the control request's own
//! headers plus any `name:value` pairs in a `headers` query parameter; a
//! `status` query parameter sets its status.

mod handlers;
mod report;
mod services;
mod state;

use std::sync::Arc;

use axum::{
    routing::{any, get, post},
    Router,
};
use tokio::sync::RwLock;

pub use handlers::{canonical_header_name, parse_folded_headers, STATUS_PARAMETER};
pub use services::{ServiceDefinition, ServiceDefinitions};
pub use state::{CannedResponse, EndpointKey, MockApiState, RecordedRequest};

/// Handle to a mock API: its router plus the state behind it.
#[derive(Debug, Clone)]
pub struct MockApi {
    state: Arc<RwLock<MockApiState>>,
}

impl MockApi {
    /// Mock API accepting any service name.
    pub fn new() -> Self {
        Self::with_state(MockApiState::new())
    }

    /// Mock API limited to `services`.
    pub fn with_services(services: ServiceDefinitions) -> Self {
        Self::with_state(MockApiState::with_services(services))
    }

    pub fn with_state(state: MockApiState) -> Self {
        Self {
            state: state.shared(),
        }
    }

    /// Shared state, for inspection from tests.
    pub fn state(&self) -> Arc<RwLock<MockApiState>> {
        self.state.clone()
    }

    /// Router with every mock API route, relative to the mount point.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }
}

impl Default for MockApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Create the axum router with all routes.
pub fn router(state: Arc<RwLock<MockApiState>>) -> Router {
    Router::new()
        .route("/services", get(handlers::list_services))
        .route(
            "/services/:kind/:service/operations/:method/init",
            post(handlers::init),
        )
        .route(
            "/services/:kind/:service/operations/:method/responses",
            post(handlers::add_response),
        )
        .route(
            "/services/:kind/:service/operations/:method/recorded-requests",
            get(handlers::recorded_requests),
        )
        .route(
            "/services/:kind/:service/operations/:method/recorded-request-headers",
            get(handlers::recorded_headers),
        )
        .route("/services/:kind/:service/endpoint", any(handlers::endpoint))
        .route(
            "/services/:kind/:service/endpoint/*rest",
            any(handlers::endpoint),
        )
        .with_state(state)
}
