//! XML reports served by the mock API.

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::escape::partial_escape;
use quick_xml::Writer;

use super::services::ServiceDefinition;
use super::state::RecordedRequest;
use crate::error::{ConductorError, Result};

/// `<recorded-requests>{body}</recorded-requests>`, empty when nothing was recorded.
pub fn recorded_requests(request: Option<&RecordedRequest>) -> Result<String> {
    let mut writer = document_writer()?;
    match request {
        Some(request) => text_element(&mut writer, "recorded-requests", &request.body)?,
        None => write(&mut writer, Event::Empty(BytesStart::new("recorded-requests")))?,
    }
    finish(writer)
}

/// One `<header><name/><value/></header>` per recorded header.
pub fn recorded_headers(request: Option<&RecordedRequest>) -> Result<String> {
    let mut writer = document_writer()?;
    let headers = request.map(|r| r.headers.as_slice()).unwrap_or_default();
    if headers.is_empty() {
        write(&mut writer, Event::Empty(BytesStart::new("recorded-request-headers")))?;
        return finish(writer);
    }

    write(&mut writer, Event::Start(BytesStart::new("recorded-request-headers")))?;
    for (name, value) in headers {
        write(&mut writer, Event::Start(BytesStart::new("header")))?;
        text_element(&mut writer, "name", name)?;
        text_element(&mut writer, "value", value)?;
        write(&mut writer, Event::End(BytesEnd::new("header")))?;
    }
    write(&mut writer, Event::End(BytesEnd::new("recorded-request-headers")))?;
    finish(writer)
}

/// `<services><service type=".." name=".."/>...</services>`
pub fn services(services: &[ServiceDefinition]) -> Result<String> {
    let mut writer = document_writer()?;
    write(&mut writer, Event::Start(BytesStart::new("services")))?;
    for service in services {
        let mut element = BytesStart::new("service");
        element.push_attribute(("type", service.kind.as_str()));
        element.push_attribute(("name", service.name.as_str()));
        write(&mut writer, Event::Empty(element))?;
    }
    write(&mut writer, Event::End(BytesEnd::new("services")))?;
    finish(writer)
}

fn document_writer() -> Result<Writer<Vec<u8>>> {
    let mut writer = Writer::new(Vec::new());
    write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    Ok(writer)
}

/// Text that XPath reads back as a single text node: markup goes into
/// CDATA sections, anything else is written without entities.
fn text_element(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    if text.contains(['<', '>', '&']) {
        for section in cdata_sections(text) {
            write(writer, Event::CData(BytesCData::new(section)))?;
        }
    } else {
        write(writer, Event::Text(BytesText::from_escaped(partial_escape(text))))?;
    }
    write(writer, Event::End(BytesEnd::new(name)))
}

/// Split before every `>` of a `]]>` so no section closes early.
fn cdata_sections(text: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut rest = text;
    while let Some(at) = rest.find("]]>") {
        sections.push(&rest[..at + 2]);
        rest = &rest[at + 2..];
    }
    sections.push(rest);
    sections
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ConductorError::Xml(e.to_string()))
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(|e| ConductorError::Xml(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{XPathHelper, XmlDocument};

    fn recorded() -> RecordedRequest {
        RecordedRequest {
            headers: vec![
                ("Content-Type".to_string(), "text/plain; charset=UTF-8".to_string()),
                ("Custom-Request-Header".to_string(), "jUnit request".to_string()),
            ],
            body: "{\"request\":\"true\"} <tag> & more".to_string(),
        }
    }

    #[test]
    fn test_recorded_requests_escapes_body() {
        let xml = recorded_requests(Some(&recorded())).unwrap();
        let doc = XmlDocument::parse(&xml).unwrap();
        assert_eq!(
            XPathHelper::new()
                .fetch_string(&doc, "//recorded-requests/text()")
                .unwrap(),
            "{\"request\":\"true\"} <tag> & more"
        );
    }

    #[test]
    fn test_recorded_requests_body_is_one_text_node() {
        let mut request = recorded();
        request.body = r#"{"request":"true"}"#.to_string();
        let xml = recorded_requests(Some(&request)).unwrap();
        assert!(!xml.contains("&quot;"));

        let doc = XmlDocument::parse(&xml).unwrap();
        let xpath = XPathHelper::new();
        assert_eq!(
            xpath.fetch_string(&doc, "/recorded-requests/text()").unwrap(),
            r#"{"request":"true"}"#
        );
        assert_eq!(xpath.fetch_number(&doc, "count(/recorded-requests/text())").unwrap(), 1.0);
    }

    #[test]
    fn test_cdata_terminator_in_body() {
        let mut request = recorded();
        request.body = "<a><![CDATA[x]]></a>".to_string();
        let xml = recorded_requests(Some(&request)).unwrap();
        let doc = XmlDocument::parse(&xml).unwrap();
        assert_eq!(
            XPathHelper::new().fetch_string(&doc, "string(/recorded-requests)").unwrap(),
            "<a><![CDATA[x]]></a>"
        );
    }

    #[test]
    fn test_recorded_headers_keep_quotes() {
        let mut request = recorded();
        request.headers = vec![(
            "Content-Type".to_string(),
            r#"multipart/related; type="text/xml""#.to_string(),
        )];
        let xml = recorded_headers(Some(&request)).unwrap();
        let doc = XmlDocument::parse(&xml).unwrap();
        assert_eq!(
            XPathHelper::new()
                .fetch_string(&doc, "//name[text() = 'Content-Type']/../value/text()")
                .unwrap(),
            r#"multipart/related; type="text/xml""#
        );
    }

    #[test]
    fn test_recorded_headers_report() {
        let xml = recorded_headers(Some(&recorded())).unwrap();
        let doc = XmlDocument::parse(&xml).unwrap();
        let xpath = XPathHelper::new();

        assert_eq!(
            xpath
                .fetch_string(&doc, "//name[text() = 'Content-Type']/../value/text()")
                .unwrap(),
            "text/plain; charset=UTF-8"
        );
        assert_eq!(xpath.fetch_number(&doc, "count(//header)").unwrap(), 2.0);
    }

    #[test]
    fn test_empty_reports_are_well_formed() {
        for xml in [recorded_requests(None).unwrap(), recorded_headers(None).unwrap()] {
            let doc = XmlDocument::parse(&xml).unwrap();
            assert_eq!(
                XPathHelper::new().fetch_string(&doc, "normalize-space(/*)").unwrap(),
                ""
            );
        }
    }
}
