//! ApiMock trait for driving a mock API over its control plane.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{RecordedHeaders, RecordedRequests, Response};

/// Client for a running mock API.
///
/// Every operation except [`is_alive`](ApiMock::is_alive) propagates
/// transport failures unmodified; nothing is retried.
///
/// # Example
///
/// ```ignore
/// use http_test_conductor::{ApiMock, HttpApiMock, Response, ConfigurableHttpEntity};
///
/// let mock = HttpApiMock::new(http_test_conductor::HttpClient::new()?);
/// mock.init("http://localhost:8888/mock/services/REST/local-mock/operations/POST/init").await?;
/// mock.add_custom_response(
///     "http://localhost:8888/mock/services/REST/local-mock/operations/POST/responses",
///     &Response::new().body(r#"{"name":"Test"}"#),
/// ).await?;
/// ```
#[async_trait]
pub trait ApiMock: Debug + Send + Sync {
    /// Whether a mock API answers on `port`. Never fails.
    async fn is_alive(&self, port: u16) -> bool;

    /// Initialize (reset) the mock endpoint behind `uri`.
    async fn init(&self, uri: &str) -> Result<()>;

    /// Register `response` as the canned answer of the endpoint behind `uri`.
    async fn add_custom_response(&self, uri: &str, response: &Response) -> Result<()>;

    /// Fetch what the endpoint behind `uri` recorded as request bodies.
    async fn get_recorded_requests(&self, uri: &str) -> Result<RecordedRequests>;

    /// Fetch what the endpoint behind `uri` recorded as request headers.
    async fn get_recorded_headers(&self, uri: &str) -> Result<RecordedHeaders>;
}
