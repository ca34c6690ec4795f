//! Control-plane tests for HttpApiMock.
//!
//! Uses wiremock to stand in for a mock API and checks what the client sends.

use http_test_conductor::{ApiMock, ConfigurableHttpEntity, HttpApiMock, HttpClient, Response};
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_mock() -> HttpApiMock {
    HttpApiMock::new(HttpClient::new().unwrap())
}

const CONTROL: &str = "/mock/services/REST/local-mock/operations/POST";

#[tokio::test]
async fn test_init_posts_to_uri() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{CONTROL}/init")))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&mock_server)
        .await;

    api_mock()
        .init(&format!("{}{CONTROL}/init", mock_server.uri()))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_custom_response_sends_body_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{CONTROL}/responses")))
        .and(header("Content-Type", "application/json"))
        .and(query_param("status", "201"))
        .and(body_string(r#"{"name":"Test"}"#))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = Response::new()
        .body(r#"{"name":"Test"}"#)
        .add_header("Content-Type", "application/json")
        .add_parameter("status", "201");

    api_mock()
        .add_custom_response(&format!("{}{CONTROL}/responses", mock_server.uri()), &response)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_headers_as_parameters_folds_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("{CONTROL}/responses")))
        .and(query_param("headers", "Content-Type:application/json,Custom-Header:jUnit"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let response = Response::new()
        .body(r#"{"name":"Test"}"#)
        .add_header("Custom-Header", "jUnit")
        .add_header("Content-Type", "application/json")
        .headers_as_parameters(true);

    api_mock()
        .add_custom_response(&format!("{}{CONTROL}/responses", mock_server.uri()), &response)
        .await
        .unwrap();

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert!(received[0].headers.get("custom-header").is_none());
}

#[tokio::test]
async fn test_rejected_custom_response_is_not_an_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let result = api_mock()
        .add_custom_response(
            &format!("{}{CONTROL}/responses", mock_server.uri()),
            &Response::new().body("x"),
        )
        .await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_recorded_headers_copied_from_response() {
    let mock_server = MockServer::start().await;
    let xml = "<recorded-request-headers><header><name>A</name><value>1</value></header></recorded-request-headers>";

    Mock::given(method("GET"))
        .and(path(format!("{CONTROL}/recorded-request-headers")))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(xml, "text/xml"),
        )
        .mount(&mock_server)
        .await;

    let uri = format!("{}{CONTROL}/recorded-request-headers", mock_server.uri());
    let recorded = api_mock().get_recorded_headers(&uri).await.unwrap();

    assert_eq!(recorded.endpoint_url, uri);
    assert_eq!(recorded.content(), xml);
    assert_eq!(recorded.headers.get("content-type").map(String::as_str), Some("text/xml"));
}

#[tokio::test]
async fn test_recorded_requests_copied_from_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{CONTROL}/recorded-requests")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<recorded-requests>{\"request\":\"true\"}</recorded-requests>"),
        )
        .mount(&mock_server)
        .await;

    let uri = format!("{}{CONTROL}/recorded-requests", mock_server.uri());
    let recorded = api_mock().get_recorded_requests(&uri).await.unwrap();
    assert!(recorded.content().contains(r#"{"request":"true"}"#));
}

#[tokio::test]
async fn test_is_alive_when_health_check_answers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/mock/services"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<services/>"))
        .mount(&mock_server)
        .await;

    assert!(api_mock().is_alive(mock_server.address().port()).await);
}

#[tokio::test]
async fn test_is_alive_false_on_free_port() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    assert!(!api_mock().is_alive(port).await);
}

#[tokio::test]
async fn test_transport_failure_propagates() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let result = api_mock()
        .init(&format!("http://127.0.0.1:{port}{CONTROL}/init"))
        .await;
    assert!(matches!(result, Err(http_test_conductor::ConductorError::HttpError(_))));
}
