//! Builder surface shared by requests and registered responses.

use crate::entity::HttpEntity;

/// Chainable setters over an [`HttpEntity`].
///
/// Implementors only expose their entity; every setter consumes and
/// returns `Self` so calls chain without casts.
///
/// # Example
///
/// ```
/// use http_test_conductor::{ConfigurableHttpEntity, RestRequest};
///
/// let request = RestRequest::new()
///     .endpoint_url("http://localhost:8888/mock/services/REST/local-mock/endpoint")
///     .method("post")
///     .body(r#"{"request":"true"}"#)
///     .add_header("Custom-Request-Header", "jUnit request");
///
/// assert_eq!(request.entity().method(), Some("post"));
/// ```
pub trait ConfigurableHttpEntity: Sized {
    /// The accumulated request fields.
    fn entity(&self) -> &HttpEntity;

    /// Mutable access for the default setters.
    fn entity_mut(&mut self) -> &mut HttpEntity;

    /// Set the body content.
    fn body(mut self, content: impl Into<String>) -> Self {
        self.entity_mut().content = Some(content.into());
        self
    }

    /// Add a header, replacing any previous value for the same name.
    fn add_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entity_mut().headers.insert(name.into(), value.into());
        self
    }

    /// Replace all headers.
    fn set_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entity_mut().headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Set the endpoint URL.
    fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.entity_mut().url = Some(url.into());
        self
    }

    /// Set the HTTP method name (`get`, `post`, ...).
    fn method(mut self, method: impl Into<String>) -> Self {
        self.entity_mut().method = Some(method.into());
        self
    }

    /// Add a parameter, replacing any previous value for the same name.
    fn add_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entity_mut()
            .parameters
            .insert(name.into(), value.into());
        self
    }

    /// Replace all parameters.
    fn set_parameters<I, K, V>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.entity_mut().parameters = parameters
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Send headers as a single `headers` parameter instead of HTTP headers.
    fn headers_as_parameters(mut self, enabled: bool) -> Self {
        self.entity_mut().headers_as_parameters = enabled;
        self
    }
}
