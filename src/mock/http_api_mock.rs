//! API mock client speaking the mock API's HTTP control plane.

use async_trait::async_trait;

use crate::client::HttpClient;
use crate::error::Result;
use crate::models::{RecordedHeaders, RecordedRequests, Response};
use crate::request::RestRequest;
use crate::traits::{ApiMock, ConfigurableHttpEntity};

const PROTOCOL: &str = "http";
const HOST: &str = "127.0.0.1";
const DEFAULT_CONTEXT_PATH: &str = "/mock";
const HEALTH_CHECK_SUFFIX: &str = "/services";

/// Drives a mock API through plain REST calls.
///
/// - `init`: bare POST
/// - `add_custom_response`: POST with the response's body, headers and
///   parameters (headers folded into a `headers` parameter on request)
/// - `get_recorded_*`: GET, keeping body, URL and flattened headers
#[derive(Debug, Clone)]
pub struct HttpApiMock {
    client: HttpClient,
    context_path: String,
}

impl HttpApiMock {
    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            context_path: DEFAULT_CONTEXT_PATH.to_string(),
        }
    }

    /// Mount point of the mock API, used for the health check.
    #[must_use]
    pub fn with_context_path(mut self, context_path: &str) -> Self {
        self.context_path = context_path.trim_end_matches('/').to_string();
        self
    }

    /// `http://127.0.0.1:{port}`
    pub fn base_url(port: u16) -> String {
        format!("{PROTOCOL}://{HOST}:{port}")
    }

    fn health_check_url(&self, port: u16) -> String {
        format!(
            "{}{}{HEALTH_CHECK_SUFFIX}",
            Self::base_url(port),
            self.context_path
        )
    }

    fn request(&self, uri: &str, method: &str) -> RestRequest {
        RestRequest::to(uri, method).with_client(self.client.clone())
    }
}

#[async_trait]
impl ApiMock for HttpApiMock {
    async fn is_alive(&self, port: u16) -> bool {
        tracing::info!(port, "checking if mock API is alive");
        match self.request(&self.health_check_url(port), "get").send().await {
            Ok(_) => {
                tracing::info!(port, "mock API found running");
                true
            }
            Err(e) => {
                tracing::info!(port, error = %e, "mock API not available");
                false
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn init(&self, uri: &str) -> Result<()> {
        tracing::info!(uri, "initializing");
        let response = self.request(uri, "post").send().await?;
        tracing::info!(status = response.status(), body = response.body(), "initialized");
        Ok(())
    }

    #[tracing::instrument(skip(self, response))]
    async fn add_custom_response(&self, uri: &str, response: &Response) -> Result<()> {
        let entity = response.entity();
        tracing::info!(
            uri,
            content = entity.content().unwrap_or(""),
            headers_as_parameters = entity.headers_as_parameters(),
            "adding custom response"
        );

        let mut request = self
            .request(uri, "post")
            .set_headers(entity.headers().clone())
            .set_parameters(entity.parameters().clone())
            .headers_as_parameters(entity.headers_as_parameters());
        if let Some(content) = entity.content() {
            request = request.body(content);
        }

        let result = request.send().await?;
        if result.is_success() {
            tracing::info!(status = result.status(), body = result.body(), "custom response added");
        } else {
            tracing::warn!(
                status = result.status(),
                status_text = result.status_text(),
                body = result.body(),
                "mock API did not accept custom response"
            );
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn get_recorded_requests(&self, uri: &str) -> Result<RecordedRequests> {
        let response = self.request(uri, "get").send().await?;
        let recorded = RecordedRequests::from_response(uri, response);
        tracing::info!(content = %recorded.content, "fetched recorded requests");
        Ok(recorded)
    }

    #[tracing::instrument(skip(self))]
    async fn get_recorded_headers(&self, uri: &str) -> Result<RecordedHeaders> {
        let response = self.request(uri, "get").send().await?;
        let recorded = RecordedHeaders::from_response(uri, response);
        tracing::info!(content = %recorded.content, "fetched recorded headers");
        Ok(recorded)
    }
}
