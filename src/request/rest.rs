//! REST request builder.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use reqwest::Method;

use crate::client::{HttpClient, HttpResponse, Outbound};
use crate::entity::HttpEntity;
use crate::error::{ConductorError, Result};
use crate::traits::{ConfigurableHttpEntity, SendRequest};

/// Content type used for a body sent without an explicit `Content-Type`.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain; charset=UTF-8";

/// HTTP methods the REST builder can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    /// Whether a configured body goes out with this method.
    pub fn allows_body(self) -> bool {
        !matches!(self, HttpMethod::Get | HttpMethod::Head)
    }

    fn as_reqwest(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = ConductorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(HttpMethod::Get),
            "post" => Ok(HttpMethod::Post),
            "put" => Ok(HttpMethod::Put),
            "patch" => Ok(HttpMethod::Patch),
            "delete" => Ok(HttpMethod::Delete),
            "head" => Ok(HttpMethod::Head),
            "options" => Ok(HttpMethod::Options),
            _ => Err(ConductorError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// A REST call against any endpoint, mock API or system under test.
///
/// The method name is only checked when the request is sent.
///
/// # Example
///
/// ```no_run
/// use http_test_conductor::{ConfigurableHttpEntity, RestRequest};
///
/// # async fn example() -> http_test_conductor::Result<()> {
/// let response = RestRequest::to("http://localhost:8888/mock/services", "get")
///     .send()
///     .await?;
/// assert_eq!(response.status(), 200);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RestRequest {
    entity: HttpEntity,
    client: Option<HttpClient>,
}

impl RestRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request for `url` with `method`, the two fields every call needs.
    pub fn to(url: impl Into<String>, method: impl Into<String>) -> Self {
        Self::new().endpoint_url(url).method(method)
    }

    /// Send through `client` instead of a fresh one.
    #[must_use]
    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Send the request.
    ///
    /// # Errors
    ///
    /// Returns [`ConductorError::UnsupportedMethod`] for a method name outside
    /// GET, POST, PUT, PATCH, DELETE, HEAD and OPTIONS,
    /// [`ConductorError::MissingField`] when method or URL is unset, and any
    /// transport error unmodified.
    pub async fn send(&self) -> Result<HttpResponse> {
        let method: HttpMethod = self
            .entity
            .method()
            .ok_or(ConductorError::MissingField("HTTP method"))?
            .parse()?;
        let url = self
            .entity
            .endpoint()
            .ok_or(ConductorError::MissingField("endpoint URL"))?;

        let (mut headers, parameters) = self.entity.wire_parts();
        let body = match self.entity.content() {
            Some(content) if method.allows_body() => {
                if !headers.keys().any(|k| k.eq_ignore_ascii_case("content-type")) {
                    headers.insert("Content-Type".to_string(), DEFAULT_CONTENT_TYPE.to_string());
                }
                Some(content.as_bytes().to_vec())
            }
            _ => None,
        };

        let client = match &self.client {
            Some(client) => client.clone(),
            None => HttpClient::new()?,
        };

        client
            .execute(Outbound {
                method: method.as_reqwest(),
                url,
                headers: &headers,
                parameters: &parameters,
                body,
            })
            .await
    }
}

impl ConfigurableHttpEntity for RestRequest {
    fn entity(&self) -> &HttpEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut HttpEntity {
        &mut self.entity
    }
}

#[async_trait]
impl SendRequest for RestRequest {
    type Output = HttpResponse;

    async fn send_request(&self) -> Result<HttpResponse> {
        self.send().await
    }
}
