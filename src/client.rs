//! HTTP transport.
//!
//! Thin wrapper over `reqwest` used by every request builder and by the
//! mock API client. It sends exactly what it is given and treats any HTTP
//! status as a response; only transport failures are errors.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use url::Url;

use crate::error::{ConductorError, Result};
use crate::xml::XmlDocument;

const USER_AGENT: &str = concat!("http-test-conductor/", env!("CARGO_PKG_VERSION"));

/// Low-level HTTP client.
///
/// This struct is cheaply cloneable; clones share the underlying
/// connection pool.
#[derive(Clone)]
pub struct HttpClient {
    http: Client,
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

/// Everything needed to put one request on the wire.
#[derive(Debug)]
pub(crate) struct Outbound<'a> {
    pub method: Method,
    pub url: &'a str,
    pub headers: &'a BTreeMap<String, String>,
    pub parameters: &'a BTreeMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl HttpClient {
    /// Create a client with the crate's user agent and reqwest's defaults.
    pub fn new() -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ConductorError::HttpError)?;
        Ok(Self { http })
    }

    /// Wrap an already configured reqwest client.
    pub fn from_reqwest(http: Client) -> Self {
        Self { http }
    }

    /// Send a request and collect the whole response.
    #[tracing::instrument(skip(self, outbound), fields(method = %outbound.method, url = outbound.url))]
    pub(crate) async fn execute(&self, outbound: Outbound<'_>) -> Result<HttpResponse> {
        let mut url = Url::parse(outbound.url)?;
        if !outbound.parameters.is_empty() {
            url.query_pairs_mut().extend_pairs(outbound.parameters.iter());
        }

        let mut request = self.http.request(outbound.method, url);
        for (name, value) in outbound.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = outbound.body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(ConductorError::HttpError)?;
        let response = HttpResponse::read(response).await?;
        tracing::debug!(status = response.status(), "response received");
        Ok(response)
    }
}

/// A complete HTTP response: status, headers and body text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl HttpResponse {
    async fn read(response: reqwest::Response) -> Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(ConductorError::HttpError)?;
        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Build a response by hand, mostly useful in tests.
    pub fn new(status: u16, headers: &[(&str, &str)], body: impl Into<String>) -> Result<Self> {
        let status = StatusCode::from_u16(status)
            .map_err(|e| ConductorError::ConfigInvalid(format!("status {status}: {e}")))?;
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ConductorError::ConfigInvalid(format!("header {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ConductorError::ConfigInvalid(format!("header value {value}: {e}")))?;
            map.append(name, value);
        }
        Ok(Self {
            status,
            headers: map,
            body: body.into(),
        })
    }

    /// Numeric status code.
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Canonical reason phrase (`OK`, `Not Found`, ...), empty if unknown.
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Every header as `name -> value`, repeated headers joined with `, `.
    pub fn flat_headers(&self) -> BTreeMap<String, String> {
        let mut flat: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in &self.headers {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            flat.entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        flat
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    /// Parse the body as XML.
    pub fn document(&self) -> Result<XmlDocument> {
        XmlDocument::parse(&self.body)
    }
}
