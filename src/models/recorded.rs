//! Snapshots of what a mock API recorded.
//!
//! Both types are copied out of a control-plane response and never change
//! afterwards. Their content is the mock API's XML report.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::client::HttpResponse;
use crate::error::Result;
use crate::xml::XmlDocument;

/// Request bodies recorded by a mock endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedRequests {
    /// Control-plane URL the snapshot was fetched from.
    pub endpoint_url: String,
    /// Flattened headers of the control-plane response.
    pub headers: BTreeMap<String, String>,
    /// The XML report.
    pub content: String,
}

/// Request headers recorded by a mock endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordedHeaders {
    /// Control-plane URL the snapshot was fetched from.
    pub endpoint_url: String,
    /// Flattened headers of the control-plane response.
    pub headers: BTreeMap<String, String>,
    /// The XML report.
    pub content: String,
}

impl RecordedRequests {
    pub(crate) fn from_response(endpoint_url: &str, response: HttpResponse) -> Self {
        Self {
            endpoint_url: endpoint_url.to_string(),
            headers: response.flat_headers(),
            content: response.into_body(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Parse the report for XPath assertions.
    pub fn document(&self) -> Result<XmlDocument> {
        XmlDocument::parse(&self.content)
    }
}

impl RecordedHeaders {
    pub(crate) fn from_response(endpoint_url: &str, response: HttpResponse) -> Self {
        Self {
            endpoint_url: endpoint_url.to_string(),
            headers: response.flat_headers(),
            content: response.into_body(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Parse the report for XPath assertions.
    pub fn document(&self) -> Result<XmlDocument> {
        XmlDocument::parse(&self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_copies_response() {
        let response = HttpResponse::new(
            200,
            &[("Content-Type", "text/xml; charset=UTF-8")],
            "<recorded-requests>{\"request\":\"true\"}</recorded-requests>",
        )
        .unwrap();

        let recorded = RecordedRequests::from_response("http://localhost/rec", response);
        assert_eq!(recorded.endpoint_url, "http://localhost/rec");
        assert_eq!(recorded.headers["content-type"], "text/xml; charset=UTF-8");
        assert!(recorded.document().is_ok());
    }
}
