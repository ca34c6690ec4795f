//! HTTP test conductor.
//!
//! A harness for HTTP integration tests: it starts an embedded server
//! hosting a mock API, drives that mock API over its control plane
//! (initialize an endpoint, register the canned response it replays,
//! fetch what it recorded), sends REST and SOAP requests at the code under
//! test, and evaluates XPath assertions against XML payloads.
//!
//! # Quick Start
//!
//! ```no_run
//! use http_test_conductor::{ConfigurableHttpEntity, HttpTestConductor, Response, RestRequest};
//!
//! #[tokio::main]
//! async fn main() -> http_test_conductor::Result<()> {
//!     let conductor = HttpTestConductor::start().await?;
//!     let control = conductor.url("/services/REST/local-mock/operations/POST");
//!
//!     conductor.init_api_mock(&format!("{control}/init")).await?;
//!     conductor
//!         .add_custom_response_to_api_mock(
//!             &format!("{control}/responses"),
//!             &Response::new()
//!                 .body(r#"{"name":"Test"}"#)
//!                 .add_header("Content-Type", "application/json"),
//!         )
//!         .await?;
//!
//!     let response = RestRequest::to(conductor.url("/services/REST/local-mock/endpoint"), "POST")
//!         .add_header("Custom-Request-Header", "jUnit request")
//!         .body(r#"{"request":"true"}"#)
//!         .send()
//!         .await?;
//!     assert_eq!(response.status(), 200);
//!
//!     let headers = conductor
//!         .get_recorded_headers_from_api_mock(&format!("{control}/recorded-request-headers"))
//!         .await?;
//!     let value = conductor.fetch_string_with_xpath(
//!         &headers.document()?,
//!         "//name[text() = 'Custom-Request-Header']/../value/text()",
//!     )?;
//!     assert_eq!(value, "jUnit request");
//!
//!     conductor.tear_down().await
//! }
//! ```
//!
//! # Architecture
//!
//! - [`ConfigurableHttpEntity`] - builder surface shared by [`RestRequest`],
//!   [`SoapRequest`] and [`Response`]
//! - [`ApiMock`] - control-plane client, implemented by [`HttpApiMock`]
//! - [`server::MockServer`] - server lifecycle, implemented by
//!   [`server::EmbeddedServer`] hosting the [`mock_api`] web app
//! - [`XPathHelper`] - namespace-aware XPath 1.0 over [`XmlDocument`]
//!
//! # Configuration
//!
//! Defaults ship with the crate; a TOML file with a `[conductor]` table
//! overrides them. The file is named by `HTTP_TEST_CONDUCTOR_CONFIG`, or
//! `conductor.toml` in the working directory is used when present.

pub mod cli;
mod client;
mod conductor;
mod config;
mod entity;
mod error;
pub mod logging;
mod mock;
pub mod mock_api;
mod models;
mod output;
mod request;
pub mod server;
mod traits;
mod xml;

// Re-export core types
pub use client::{HttpClient, HttpResponse};
pub use conductor::HttpTestConductor;
pub use config::{Config, CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE};
pub use entity::{fold_headers, HttpEntity, HEADERS_PARAMETER};
pub use error::{ConductorError, Result};
pub use output::PrettyPrint;

// Re-export traits
pub use traits::{ApiMock, ConfigurableHttpEntity, SendRequest};

// Re-export mock API clients
pub use mock::{create_api_mock, ApiMockKind, HttpApiMock};

// Re-export models and requests
pub use models::{RecordedHeaders, RecordedRequests, Response};
pub use request::{HttpMethod, RestRequest, SoapMessage, SoapRequest, SoapVersion, DEFAULT_CONTENT_TYPE};

// Re-export XML helpers
pub use xml::{NamespaceContext, XPathHelper, XmlDocument, XmlNode};
