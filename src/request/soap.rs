//! SOAP request builder.
//!
//! Builds a SOAP envelope around an XML body and posts it. SOAP 1.1 is
//! used unless the configured `Content-Type` header selects SOAP 1.2
//! (`application/soap+xml` or `application/soap+fastinfoset`).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use reqwest::Method;

use crate::client::{HttpClient, HttpResponse, Outbound};
use crate::entity::HttpEntity;
use crate::error::{ConductorError, Result};
use crate::traits::{ConfigurableHttpEntity, SendRequest};
use crate::xml::{XPathHelper, XmlDocument};

const ROOT_CONTENT_ID: &str = "<rootpart@http-test-conductor>";

static BOUNDARY_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// SOAP protocol version, chosen from the `Content-Type` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoapVersion {
    V1_1,
    V1_2,
}

impl SoapVersion {
    fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type.map(|ct| ct.trim().to_ascii_lowercase()) {
            Some(ct)
                if ct.starts_with("application/soap+xml")
                    || ct.starts_with("application/soap+fastinfoset") =>
            {
                SoapVersion::V1_2
            }
            _ => SoapVersion::V1_1,
        }
    }

    pub fn envelope_namespace(self) -> &'static str {
        match self {
            SoapVersion::V1_1 => "http://schemas.xmlsoap.org/soap/envelope/",
            SoapVersion::V1_2 => "http://www.w3.org/2003/05/soap-envelope",
        }
    }

    pub fn envelope_prefix(self) -> &'static str {
        match self {
            SoapVersion::V1_1 => "SOAP-ENV",
            SoapVersion::V1_2 => "env",
        }
    }

    fn default_content_type(self) -> &'static str {
        match self {
            SoapVersion::V1_1 => "text/xml; charset=utf-8",
            SoapVersion::V1_2 => "application/soap+xml; charset=utf-8",
        }
    }

    fn mime_type(self) -> &'static str {
        match self {
            SoapVersion::V1_1 => "text/xml",
            SoapVersion::V1_2 => "application/soap+xml",
        }
    }
}

/// A SOAP call.
///
/// Namespaces are declared on the envelope, SOAP headers become header
/// elements with text content, attachments travel as `multipart/related`
/// parts and the body must be a well-formed XML document.
///
/// # Example
///
/// ```no_run
/// use http_test_conductor::{ConfigurableHttpEntity, SoapRequest};
///
/// # async fn example() -> http_test_conductor::Result<()> {
/// let reply = SoapRequest::to("http://localhost:8888/mock/services/SOAP/quotes/endpoint")
///     .add_namespace("q", "urn:example:quotes")
///     .add_soap_header("Trace", "abc-123")
///     .body(r#"<q:getQuote xmlns:q="urn:example:quotes"><q:symbol>ACME</q:symbol></q:getQuote>"#)
///     .send()
///     .await?;
/// assert!(!reply.is_fault()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SoapRequest {
    entity: HttpEntity,
    namespaces: BTreeMap<String, String>,
    soap_headers: BTreeMap<String, String>,
    attachments: Vec<(String, String)>,
    client: Option<HttpClient>,
}

impl SoapRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request for `url`.
    pub fn to(url: impl Into<String>) -> Self {
        Self::new().endpoint_url(url)
    }

    /// Send through `client` instead of a fresh one.
    #[must_use]
    pub fn with_client(mut self, client: HttpClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Declare `prefix` for `uri` on the envelope.
    #[must_use]
    pub fn add_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }

    /// Replace every declared namespace.
    #[must_use]
    pub fn set_namespaces<I, K, V>(mut self, namespaces: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.namespaces = namespaces
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Add a SOAP header element `name` with text `value`.
    #[must_use]
    pub fn add_soap_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.soap_headers.insert(name.into(), value.into());
        self
    }

    /// Replace every SOAP header element.
    #[must_use]
    pub fn set_soap_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.soap_headers = headers
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Attach `content` as a MIME part of type `content_type`.
    #[must_use]
    pub fn add_attachment(
        mut self,
        content_type: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        self.attachments.push((content_type.into(), content.into()));
        self
    }

    /// Replace every attachment; keys are content types.
    #[must_use]
    pub fn set_attachments<I, K, V>(mut self, attachments: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.attachments = attachments
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Protocol version selected by the current headers.
    pub fn version(&self) -> SoapVersion {
        SoapVersion::from_content_type(content_type_of(self.entity.headers()))
    }

    /// Serialize the envelope without sending it.
    ///
    /// # Errors
    ///
    /// Fails if the body is not well-formed XML.
    pub fn envelope(&self) -> Result<String> {
        let version = self.version();
        let prefix = version.envelope_prefix();
        let mut writer = Writer::new(Vec::new());

        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let mut envelope = BytesStart::new(format!("{prefix}:Envelope"));
        envelope.push_attribute((format!("xmlns:{prefix}").as_str(), version.envelope_namespace()));
        for (ns_prefix, uri) in &self.namespaces {
            envelope.push_attribute((format!("xmlns:{ns_prefix}").as_str(), uri.as_str()));
        }
        write(&mut writer, Event::Start(envelope))?;

        let header = format!("{prefix}:Header");
        if self.soap_headers.is_empty() {
            write(&mut writer, Event::Empty(BytesStart::new(header.as_str())))?;
        } else {
            write(&mut writer, Event::Start(BytesStart::new(header.as_str())))?;
            for (name, value) in &self.soap_headers {
                write(&mut writer, Event::Start(BytesStart::new(name.as_str())))?;
                write(&mut writer, Event::Text(BytesText::new(value)))?;
                write(&mut writer, Event::End(BytesEnd::new(name.as_str())))?;
            }
            write(&mut writer, Event::End(BytesEnd::new(header.as_str())))?;
        }

        let body = format!("{prefix}:Body");
        match self.entity.content().map(|c| c.trim_start_matches('\u{feff}')) {
            Some(content) if !content.trim().is_empty() => {
                write(&mut writer, Event::Start(BytesStart::new(body.as_str())))?;
                embed_document(&mut writer, content)?;
                write(&mut writer, Event::End(BytesEnd::new(body.as_str())))?;
            }
            _ => write(&mut writer, Event::Empty(BytesStart::new(body.as_str())))?,
        }

        write(&mut writer, Event::End(BytesEnd::new(format!("{prefix}:Envelope"))))?;

        String::from_utf8(writer.into_inner()).map_err(|e| ConductorError::Xml(e.to_string()))
    }

    /// Send the envelope with POST and return the raw reply.
    ///
    /// # Errors
    ///
    /// Fails if the URL is unset, the body is not well-formed XML or the
    /// transport fails. Any HTTP status, SOAP faults included, is a reply.
    pub async fn send(&self) -> Result<SoapMessage> {
        let url = self
            .entity
            .endpoint()
            .ok_or(ConductorError::MissingField("endpoint URL"))?;
        let version = self.version();
        let envelope = self.envelope()?;

        // Content-Type stays a transport header even when the rest travel as a parameter.
        let root_content_type = content_type_of(self.entity.headers())
            .map_or_else(|| version.default_content_type().to_string(), str::to_string);
        let (mut headers, parameters) = self.entity.wire_parts();
        take_content_type(&mut headers);

        let body = if self.attachments.is_empty() {
            headers.insert("Content-Type".to_string(), root_content_type);
            envelope.into_bytes()
        } else {
            let boundary = next_boundary();
            headers.insert(
                "Content-Type".to_string(),
                format!(
                    "multipart/related; type=\"{}\"; boundary=\"{boundary}\"; start=\"{ROOT_CONTENT_ID}\"",
                    version.mime_type()
                ),
            );
            multipart_related(&boundary, &root_content_type, &envelope, &self.attachments)
        };

        tracing::debug!(url, ?version, attachments = self.attachments.len(), "sending SOAP request");

        let client = match &self.client {
            Some(client) => client.clone(),
            None => HttpClient::new()?,
        };
        let response = client
            .execute(Outbound {
                method: Method::POST,
                url,
                headers: &headers,
                parameters: &parameters,
                body: Some(body),
            })
            .await?;

        Ok(SoapMessage { response })
    }
}

impl ConfigurableHttpEntity for SoapRequest {
    fn entity(&self) -> &HttpEntity {
        &self.entity
    }

    fn entity_mut(&mut self) -> &mut HttpEntity {
        &mut self.entity
    }
}

#[async_trait]
impl SendRequest for SoapRequest {
    type Output = SoapMessage;

    async fn send_request(&self) -> Result<SoapMessage> {
        self.send().await
    }
}

/// The reply to a [`SoapRequest`].
#[derive(Debug, Clone)]
pub struct SoapMessage {
    response: HttpResponse,
}

impl SoapMessage {
    pub fn status(&self) -> u16 {
        self.response.status()
    }

    /// The underlying HTTP response.
    pub fn http(&self) -> &HttpResponse {
        &self.response
    }

    /// Raw reply text.
    pub fn envelope(&self) -> &str {
        self.response.body()
    }

    /// Parse the reply for XPath assertions.
    pub fn document(&self) -> Result<XmlDocument> {
        self.response.document()
    }

    /// Whether the reply body holds a SOAP `Fault`, for either version.
    pub fn is_fault(&self) -> Result<bool> {
        let document = self.document()?;
        XPathHelper::new().fetch_boolean(
            &document,
            "/*[local-name()='Envelope']/*[local-name()='Body']/*[local-name()='Fault']",
        )
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ConductorError::Xml(e.to_string()))
}

/// Copy `content` into `writer`, dropping its XML declaration and doctype.
fn embed_document(writer: &mut Writer<Vec<u8>>, content: &str) -> Result<()> {
    XmlDocument::parse(content)?;

    let mut reader = Reader::from_str(content);
    loop {
        match reader
            .read_event()
            .map_err(|e| ConductorError::Xml(e.to_string()))?
        {
            Event::Eof => return Ok(()),
            Event::Decl(_) | Event::DocType(_) => {}
            event => write(writer, event)?,
        }
    }
}

fn content_type_of(headers: &BTreeMap<String, String>) -> Option<&str> {
    headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
        .map(|(_, value)| value.as_str())
}

fn take_content_type(headers: &mut BTreeMap<String, String>) -> Option<String> {
    let key = headers
        .keys()
        .find(|name| name.eq_ignore_ascii_case("content-type"))
        .cloned()?;
    headers.remove(&key)
}

fn next_boundary() -> String {
    let n = BOUNDARY_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("----=_Part_{}_{n}", std::process::id())
}

fn multipart_related(
    boundary: &str,
    root_content_type: &str,
    envelope: &str,
    attachments: &[(String, String)],
) -> Vec<u8> {
    let mut body = String::new();
    body.push_str(&format!(
        "--{boundary}\r\nContent-Type: {root_content_type}\r\nContent-ID: {ROOT_CONTENT_ID}\r\n\r\n{envelope}\r\n"
    ));
    for (index, (content_type, content)) in attachments.iter().enumerate() {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Type: {content_type}\r\nContent-ID: <attachment-{}@http-test-conductor>\r\n\r\n{content}\r\n",
            index + 1
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));
    body.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE: &str =
        r#"<?xml version="1.0"?><q:getQuote xmlns:q="urn:example:quotes"><q:symbol>ACME</q:symbol></q:getQuote>"#;

    fn xpath() -> XPathHelper {
        XPathHelper::new()
            .with_namespace("s11", SoapVersion::V1_1.envelope_namespace())
            .with_namespace("s12", SoapVersion::V1_2.envelope_namespace())
            .with_namespace("q", "urn:example:quotes")
    }

    #[test]
    fn test_soap11_envelope_embeds_body() {
        let request = SoapRequest::to("http://localhost/ws")
            .add_namespace("q", "urn:example:quotes")
            .body(QUOTE);

        let envelope = request.envelope().unwrap();
        assert!(envelope.contains(r#"xmlns:SOAP-ENV="http://schemas.xmlsoap.org/soap/envelope/""#));
        assert!(envelope.contains(r#"xmlns:q="urn:example:quotes""#));
        assert_eq!(envelope.matches("<?xml").count(), 1);

        let doc = XmlDocument::parse(&envelope).unwrap();
        assert_eq!(
            xpath()
                .fetch_string(&doc, "/s11:Envelope/s11:Body/q:getQuote/q:symbol")
                .unwrap(),
            "ACME"
        );
    }

    #[test]
    fn test_soap_headers_become_elements() {
        let request = SoapRequest::to("http://localhost/ws")
            .add_soap_header("Trace", "a<b")
            .add_soap_header("User", "tester")
            .body(QUOTE);

        let doc = XmlDocument::parse(&request.envelope().unwrap()).unwrap();
        let xpath = xpath();
        assert_eq!(xpath.fetch_string(&doc, "/s11:Envelope/s11:Header/Trace").unwrap(), "a<b");
        assert_eq!(xpath.fetch_number(&doc, "count(/s11:Envelope/s11:Header/*)").unwrap(), 2.0);
    }

    #[test]
    fn test_content_type_selects_soap12() {
        let request = SoapRequest::to("http://localhost/ws")
            .add_header("Content-Type", "application/soap+xml; charset=utf-8")
            .body(QUOTE);

        assert_eq!(request.version(), SoapVersion::V1_2);
        let doc = XmlDocument::parse(&request.envelope().unwrap()).unwrap();
        assert!(xpath().fetch_boolean(&doc, "/s12:Envelope/s12:Body/q:getQuote").unwrap());
    }

    #[test]
    fn test_empty_body_gives_empty_body_element() {
        let envelope = SoapRequest::to("http://localhost/ws").envelope().unwrap();
        let doc = XmlDocument::parse(&envelope).unwrap();
        assert_eq!(xpath().fetch_number(&doc, "count(/s11:Envelope/s11:Body/*)").unwrap(), 0.0);
    }

    #[test]
    fn test_malformed_body_rejected() {
        let request = SoapRequest::to("http://localhost/ws").body("<open><close>");
        assert!(matches!(request.envelope(), Err(ConductorError::Xml(_))));
    }

    #[test]
    fn test_multipart_layout() {
        let attachments = vec![("text/plain".to_string(), "hello".to_string())];
        let body = multipart_related("B", "text/xml", "<e/>", &attachments);
        let body = String::from_utf8(body).unwrap();

        assert!(body.starts_with("--B\r\nContent-Type: text/xml\r\n"));
        assert!(body.contains("Content-Type: text/plain\r\nContent-ID: <attachment-1@http-test-conductor>\r\n\r\nhello\r\n"));
        assert!(body.ends_with("--B--\r\n"));
    }

    #[test]
    fn test_fault_detection() {
        let message = SoapMessage {
            response: HttpResponse::new(
                500,
                &[],
                r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope"><env:Body><env:Fault/></env:Body></env:Envelope>"#,
            )
            .unwrap(),
        };
        assert!(message.is_fault().unwrap());
    }
}
