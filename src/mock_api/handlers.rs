//! HTTP request handlers for the mock API.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::report;
use super::state::{CannedResponse, EndpointKey, MockApiState, RecordedRequest};
use crate::entity::HEADERS_PARAMETER;
use crate::error::Result;

/// Query parameter carrying the status of a registered response.
pub const STATUS_PARAMETER: &str = "status";

/// Headers of a control request that describe the transport, not the response.
const TRANSPORT_HEADERS: [&str; 8] = [
    "host",
    "content-length",
    "user-agent",
    "accept",
    "accept-encoding",
    "connection",
    "transfer-encoding",
    "expect",
];

type SharedState = Arc<RwLock<MockApiState>>;

/// Path of a control-plane operation.
#[derive(Debug, Deserialize)]
pub struct OperationPath {
    kind: String,
    service: String,
    method: String,
}

impl OperationPath {
    fn key(&self) -> EndpointKey {
        EndpointKey::new(&self.kind, &decode(&self.service), &self.method)
    }
}

/// Path of a mocked endpoint; any trailing segments are ignored.
#[derive(Debug, Deserialize)]
pub struct EndpointPath {
    kind: String,
    service: String,
}

/// Query parameters for recorded traffic.
#[derive(Debug, Default, Deserialize)]
pub struct RecordedQuery {
    pub index: Option<usize>,
}

/// GET /services
pub async fn list_services(State(state): State<SharedState>) -> Response {
    let state = state.read().await;
    xml_response(report::services(&state.services()))
}

/// POST /services/{kind}/{service}/operations/{method}/init
pub async fn init(State(state): State<SharedState>, Path(path): Path<OperationPath>) -> Response {
    let key = path.key();
    let mut state = state.write().await;
    if !state.knows_service(&key.kind, &key.service) {
        return unknown_service(&key);
    }

    tracing::info!(kind = %key.kind, service = %key.service, method = %key.method, "endpoint initialized");
    let message = format!("Initialized {} {} {}", key.kind, key.service, key.method);
    state.init(key);
    (StatusCode::OK, message).into_response()
}

/// POST /services/{kind}/{service}/operations/{method}/responses
pub async fn add_response(
    State(state): State<SharedState>,
    Path(path): Path<OperationPath>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let key = path.key();
    let canned = match canned_response(&params, &headers, &body) {
        Ok(canned) => canned,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let mut state = state.write().await;
    if !state.knows_service(&key.kind, &key.service) {
        return unknown_service(&key);
    }

    tracing::info!(
        kind = %key.kind,
        service = %key.service,
        method = %key.method,
        status = canned.status,
        headers = canned.headers.len(),
        "response registered"
    );
    state.set_response(key, canned);
    (StatusCode::OK, "Response added").into_response()
}

/// ANY /services/{kind}/{service}/endpoint
pub async fn endpoint(
    State(state): State<SharedState>,
    Path(path): Path<EndpointPath>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let key = EndpointKey::new(&path.kind, &decode(&path.service), method.as_str());
    let mut state = state.write().await;
    if !state.knows_service(&key.kind, &key.service) {
        return unknown_service(&key);
    }

    let recorded = RecordedRequest {
        headers: headers
            .iter()
            .map(|(name, value)| {
                (
                    canonical_header_name(name.as_str()),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect(),
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    tracing::debug!(kind = %key.kind, service = %key.service, method = %key.method, "request recorded");
    match state.record(key, recorded) {
        Some(canned) => replay(canned),
        None => StatusCode::OK.into_response(),
    }
}

/// GET /services/{kind}/{service}/operations/{method}/recorded-requests
pub async fn recorded_requests(
    State(state): State<SharedState>,
    Path(path): Path<OperationPath>,
    Query(query): Query<RecordedQuery>,
) -> Response {
    let key = path.key();
    let state = state.read().await;
    if !state.knows_service(&key.kind, &key.service) {
        return unknown_service(&key);
    }
    xml_response(report::recorded_requests(state.recorded(&key, query.index)))
}

/// GET /services/{kind}/{service}/operations/{method}/recorded-request-headers
pub async fn recorded_headers(
    State(state): State<SharedState>,
    Path(path): Path<OperationPath>,
    Query(query): Query<RecordedQuery>,
) -> Response {
    let key = path.key();
    let state = state.read().await;
    if !state.knows_service(&key.kind, &key.service) {
        return unknown_service(&key);
    }
    xml_response(report::recorded_headers(state.recorded(&key, query.index)))
}

/// `custom-request-header` -> `Custom-Request-Header`
pub fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Parse `name:value,name:value`.
pub fn parse_folded_headers(folded: &str) -> std::result::Result<Vec<(String, String)>, String> {
    folded
        .split(',')
        .filter(|pair| !pair.trim().is_empty())
        .map(|pair| {
            pair.split_once(':')
                .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
                .ok_or_else(|| format!("header '{pair}' is not in name:value form"))
        })
        .collect()
}

fn canned_response(
    params: &HashMap<String, String>,
    headers: &HeaderMap,
    body: &Bytes,
) -> std::result::Result<CannedResponse, String> {
    let status = match params.get(STATUS_PARAMETER) {
        Some(raw) => raw
            .trim()
            .parse::<u16>()
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
            .ok_or_else(|| format!("invalid status '{raw}'"))?
            .as_u16(),
        None => StatusCode::OK.as_u16(),
    };

    let mut response_headers: Vec<(String, String)> = headers
        .iter()
        .filter(|(name, _)| !TRANSPORT_HEADERS.contains(&name.as_str()))
        .map(|(name, value)| {
            (
                canonical_header_name(name.as_str()),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    if let Some(folded) = params.get(HEADERS_PARAMETER) {
        for (name, value) in parse_folded_headers(folded)? {
            response_headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
            response_headers.push((name, value));
        }
    }

    for (name, value) in &response_headers {
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| format!("header '{name}': {e}"))?;
        HeaderValue::from_str(value).map_err(|e| format!("header '{name}' value: {e}"))?;
    }

    Ok(CannedResponse {
        status,
        headers: response_headers,
        body: String::from_utf8_lossy(body).into_owned(),
    })
}

fn replay(canned: CannedResponse) -> Response {
    let status = StatusCode::from_u16(canned.status).unwrap_or(StatusCode::OK);
    let mut response = (status, canned.body).into_response();
    for (name, value) in canned.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

fn xml_response(xml: Result<String>) -> Response {
    match xml {
        Ok(xml) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/xml; charset=UTF-8")],
            xml,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to render report");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

fn unknown_service(key: &EndpointKey) -> Response {
    (
        StatusCode::NOT_FOUND,
        format!("No {} service named '{}'", key.kind, key.service),
    )
        .into_response()
}

fn decode(segment: &str) -> String {
    urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_header_name() {
        assert_eq!(canonical_header_name("custom-request-header"), "Custom-Request-Header");
        assert_eq!(canonical_header_name("CONTENT-TYPE"), "Content-Type");
        assert_eq!(canonical_header_name("x--y"), "X--Y");
    }

    #[test]
    fn test_parse_folded_headers() {
        let parsed = parse_folded_headers("Custom-Header:jUnit, Content-Type: application/json").unwrap();
        assert_eq!(
            parsed,
            vec![
                ("Custom-Header".to_string(), "jUnit".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ]
        );
        assert!(parse_folded_headers("").unwrap().is_empty());
        assert!(parse_folded_headers("novalue").is_err());
    }

    #[test]
    fn test_canned_response_merges_raw_and_folded_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        headers.insert("user-agent", HeaderValue::from_static("agent"));
        let params = HashMap::from([
            (HEADERS_PARAMETER.to_string(), "Content-Type:application/json,X-A:1".to_string()),
            (STATUS_PARAMETER.to_string(), "201".to_string()),
        ]);

        let canned = canned_response(&params, &headers, &Bytes::from_static(b"{}")).unwrap();
        assert_eq!(canned.status, 201);
        assert_eq!(
            canned.headers,
            vec![
                ("Content-Type".to_string(), "application/json".to_string()),
                ("X-A".to_string(), "1".to_string()),
            ]
        );
        assert_eq!(canned.body, "{}");
    }

    #[test]
    fn test_canned_response_rejects_bad_status() {
        let params = HashMap::from([(STATUS_PARAMETER.to_string(), "abc".to_string())]);
        assert!(canned_response(&params, &HeaderMap::new(), &Bytes::new()).is_err());
    }
}
