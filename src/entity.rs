//! Fields shared by every outbound request and by registered responses.

use std::collections::BTreeMap;
use std::fmt;

/// Name of the parameter headers are folded into.
pub const HEADERS_PARAMETER: &str = "headers";

/// Method, URL, body, headers and parameters of an HTTP exchange.
///
/// Built up through the [`ConfigurableHttpEntity`] builder methods and
/// read back when the request is sent.
///
/// [`ConfigurableHttpEntity`]: crate::ConfigurableHttpEntity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpEntity {
    pub(crate) content: Option<String>,
    pub(crate) headers: BTreeMap<String, String>,
    pub(crate) url: Option<String>,
    pub(crate) method: Option<String>,
    pub(crate) parameters: BTreeMap<String, String>,
    pub(crate) headers_as_parameters: bool,
}

impl HttpEntity {
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    pub fn parameters(&self) -> &BTreeMap<String, String> {
        &self.parameters
    }

    /// Whether headers are sent as a single `headers` parameter.
    pub fn headers_as_parameters(&self) -> bool {
        self.headers_as_parameters
    }

    /// Headers and parameters as they go on the wire.
    ///
    /// With headers-as-parameters set, the headers are joined into one
    /// `name:value,name:value` parameter named `headers` (appended to an
    /// existing `headers` parameter) and no HTTP headers are returned.
    pub fn wire_parts(&self) -> (BTreeMap<String, String>, BTreeMap<String, String>) {
        if !self.headers_as_parameters {
            return (self.headers.clone(), self.parameters.clone());
        }

        let mut parameters = self.parameters.clone();
        let folded = fold_headers(&self.headers);
        if !folded.is_empty() {
            tracing::debug!(headers = %folded, "headers as parameter");
            parameters
                .entry(HEADERS_PARAMETER.to_string())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&folded);
                })
                .or_insert(folded);
        }
        (BTreeMap::new(), parameters)
    }
}

/// `name:value` pairs joined by commas.
pub fn fold_headers(headers: &BTreeMap<String, String>) -> String {
    headers
        .iter()
        .map(|(name, value)| format!("{name}:{value}"))
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for HttpEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Endpoint: {}", self.endpoint().unwrap_or(""))?;
        writeln!(f, "Method: {}", self.method().unwrap_or(""))?;
        writeln!(f, "Content: {}", self.content().unwrap_or(""))?;
        writeln!(f, "Headers: {:?}", self.headers)?;
        writeln!(f, "Parameters: {:?}", self.parameters)?;
        write!(f, "Headers as parameters: {}", self.headers_as_parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity_with_headers() -> HttpEntity {
        let mut entity = HttpEntity::default();
        entity
            .headers
            .insert("Content-Type".to_string(), "application/json".to_string());
        entity
            .headers
            .insert("X-Trace".to_string(), "abc".to_string());
        entity
    }

    #[test]
    fn test_wire_parts_passthrough() {
        let entity = entity_with_headers();
        let (headers, parameters) = entity.wire_parts();
        assert_eq!(headers.len(), 2);
        assert!(parameters.is_empty());
    }

    #[test]
    fn test_headers_folded_into_single_parameter() {
        let mut entity = entity_with_headers();
        entity.headers_as_parameters = true;

        let (headers, parameters) = entity.wire_parts();
        assert!(headers.is_empty());
        assert_eq!(parameters.len(), 1);
        assert_eq!(
            parameters[HEADERS_PARAMETER],
            "Content-Type:application/json,X-Trace:abc"
        );
    }

    #[test]
    fn test_fold_appends_to_existing_headers_parameter() {
        let mut entity = entity_with_headers();
        entity.headers_as_parameters = true;
        entity
            .parameters
            .insert(HEADERS_PARAMETER.to_string(), "Custom-Header:jUnit".to_string());

        let (_, parameters) = entity.wire_parts();
        assert_eq!(
            parameters[HEADERS_PARAMETER],
            "Custom-Header:jUnit,Content-Type:application/json,X-Trace:abc"
        );
    }

    #[test]
    fn test_fold_without_headers_adds_nothing() {
        let entity = HttpEntity {
            headers_as_parameters: true,
            ..Default::default()
        };
        let (_, parameters) = entity.wire_parts();
        assert!(parameters.is_empty());
    }

    #[test]
    fn test_display_lists_fields() {
        let mut entity = entity_with_headers();
        entity.url = Some("http://localhost/x".to_string());
        let shown = entity.to_string();
        assert!(shown.contains("Endpoint: http://localhost/x"));
        assert!(shown.contains("Headers as parameters: false"));
    }
}
