//! Canned responses registered with a mock API.

use crate::entity::HttpEntity;
use crate::traits::ConfigurableHttpEntity;

/// The answer a mock endpoint should replay.
///
/// Only body, headers, parameters and the headers-as-parameters flag are
/// meaningful; the control-plane URL is passed separately to
/// [`ApiMock::add_custom_response`](crate::ApiMock::add_custom_response).
///
/// # Example
///
/// ```
/// use http_test_conductor::{ConfigurableHttpEntity, Response};
///
/// let response = Response::new()
///     .add_parameter("headers", "Custom-Header:jUnit")
///     .add_header("Content-Type", "application/json")
///     .body(r#"{"name":"Test"}"#);
///
/// assert_eq!(response.entity().content(), Some(r#"{"name":"Test"}"#));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    entity: HttpEntity,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConfigurableHttpEntity for Response {
    fn entity(&self) -> &HttpEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut HttpEntity {
        &mut self.entity
    }
}
