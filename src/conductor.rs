//! Per-suite harness context.
//!
//! [`HttpTestConductor`] owns everything a test suite shares: the
//! configuration, the mock API client, the server it started (if any) and
//! an XPath helper with the suite's namespaces.

use crate::client::HttpClient;
use crate::config::Config;
use crate::error::Result;
use crate::mock::{create_api_mock, HttpApiMock};
use crate::models::{RecordedHeaders, RecordedRequests, Response};
use crate::server::{create_server, MockServer, WebApp};
use crate::traits::ApiMock;
use crate::xml::{XPathHelper, XmlDocument, XmlNode};

/// Harness for one test suite.
///
/// ```no_run
/// use http_test_conductor::{ConfigurableHttpEntity, HttpTestConductor, Response, RestRequest};
///
/// # async fn suite() -> http_test_conductor::Result<()> {
/// let conductor = HttpTestConductor::start().await?;
/// let control = conductor.url("/services/REST/local-mock/operations/POST");
///
/// conductor.init_api_mock(&format!("{control}/init")).await?;
/// conductor
///     .add_custom_response_to_api_mock(
///         &format!("{control}/responses"),
///         &Response::new().body(r#"{"name":"Test"}"#),
///     )
///     .await?;
///
/// let response = RestRequest::to(conductor.url("/services/REST/local-mock/endpoint"), "POST")
///     .body(r#"{"request":"true"}"#)
///     .send()
///     .await?;
/// assert_eq!(response.body(), r#"{"name":"Test"}"#);
///
/// conductor.tear_down().await
/// # }
/// ```
pub struct HttpTestConductor {
    config: Config,
    port: u16,
    client: HttpClient,
    api_mock: Box<dyn ApiMock>,
    server: Option<Box<dyn MockServer>>,
    xpath: XPathHelper,
}

impl HttpTestConductor {
    /// Start with configuration from [`Config::from_env`].
    pub async fn start() -> Result<Self> {
        Self::start_with(Config::from_env()?).await
    }

    /// Start with `config`.
    ///
    /// A mock API already answering on a fixed port is reused; otherwise a
    /// server is created and started.
    ///
    /// # Errors
    ///
    /// Fails on an unsupported server type or API mock, unreadable service
    /// definitions, or a port that cannot be bound.
    #[tracing::instrument(skip(config), fields(port = config.server_port))]
    pub async fn start_with(config: Config) -> Result<Self> {
        let server_type = config.server_type()?;
        let kind = config.api_mock_kind()?;
        let client = HttpClient::new()?;
        let api_mock = create_api_mock(kind, client.clone(), &config.context_path);

        if config.server_port != 0 && api_mock.is_alive(config.server_port).await {
            tracing::info!(port = config.server_port, "reusing running mock API");
            return Ok(Self {
                port: config.server_port,
                config,
                client,
                api_mock,
                server: None,
                xpath: XPathHelper::new(),
            });
        }

        let mut server = create_server(server_type, config.server_port);
        server.add_web_app(WebApp::from_config(&config)?)?;
        server.tear_up().await?;
        let port = server
            .local_addr()
            .map_or(config.server_port, |addr| addr.port());
        tracing::info!(port, %server_type, api_mock = %kind, "conductor started");

        Ok(Self {
            config,
            port,
            client,
            api_mock,
            server: Some(server),
            xpath: XPathHelper::new(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Port the mock API answers on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Whether this conductor started the server (rather than reusing one).
    pub fn owns_server(&self) -> bool {
        self.server.is_some()
    }

    /// `http://127.0.0.1:{port}{context_path}`
    pub fn base_url(&self) -> String {
        let context = match self.config.context_path.as_str() {
            "/" => "",
            path => path,
        };
        format!("{}{context}", HttpApiMock::base_url(self.port))
    }

    /// `path` below [`base_url`](Self::base_url).
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url())
        } else {
            format!("{}/{path}", self.base_url())
        }
    }

    /// Client shared with the API mock, for building requests under test.
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn api_mock(&self) -> &dyn ApiMock {
        self.api_mock.as_ref()
    }

    pub fn xpath(&self) -> &XPathHelper {
        &self.xpath
    }

    /// Register a namespace for the `fetch_*_with_xpath` helpers.
    pub fn add_namespace(&mut self, prefix: impl Into<String>, uri: impl Into<String>) -> &mut Self {
        self.xpath.add_namespace(prefix, uri);
        self
    }

    pub async fn init_api_mock(&self, uri: &str) -> Result<&Self> {
        self.api_mock.init(uri).await?;
        Ok(self)
    }

    pub async fn add_custom_response_to_api_mock(
        &self,
        uri: &str,
        response: &Response,
    ) -> Result<&Self> {
        self.api_mock.add_custom_response(uri, response).await?;
        Ok(self)
    }

    pub async fn get_recorded_requests_from_api_mock(&self, uri: &str) -> Result<RecordedRequests> {
        self.api_mock.get_recorded_requests(uri).await
    }

    pub async fn get_recorded_headers_from_api_mock(&self, uri: &str) -> Result<RecordedHeaders> {
        self.api_mock.get_recorded_headers(uri).await
    }

    pub fn parse_document(&self, xml: &str) -> Result<XmlDocument> {
        XmlDocument::parse(xml)
    }

    pub fn fetch_string_with_xpath(&self, document: &XmlDocument, expression: &str) -> Result<String> {
        self.xpath.fetch_string(document, expression)
    }

    pub fn fetch_boolean_with_xpath(&self, document: &XmlDocument, expression: &str) -> Result<bool> {
        self.xpath.fetch_boolean(document, expression)
    }

    pub fn fetch_number_with_xpath(&self, document: &XmlDocument, expression: &str) -> Result<f64> {
        self.xpath.fetch_number(document, expression)
    }

    pub fn fetch_node_with_xpath<'d>(
        &self,
        document: &'d XmlDocument,
        expression: &str,
    ) -> Result<Option<XmlNode<'d>>> {
        self.xpath.fetch_node(document, expression)
    }

    pub fn fetch_node_list_with_xpath<'d>(
        &self,
        document: &'d XmlDocument,
        expression: &str,
    ) -> Result<Vec<XmlNode<'d>>> {
        self.xpath.fetch_node_list(document, expression)
    }

    /// Stop the server this conductor started. A reused server keeps running.
    pub async fn tear_down(mut self) -> Result<()> {
        if let Some(server) = self.server.as_mut() {
            server.tear_down().await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for HttpTestConductor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTestConductor")
            .field("port", &self.port)
            .field("context_path", &self.config.context_path)
            .field("owns_server", &self.owns_server())
            .field("api_mock", &self.api_mock)
            .finish()
    }
}
