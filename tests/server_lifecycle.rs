//! Server lifecycle tests through the public factory.

use http_test_conductor::server::{create_server, ServerState, ServerType, WebApp};
use http_test_conductor::{ConductorError, Config, HttpTestConductor};

fn services_file(name: &str, contents: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("conductor-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("services.toml"), contents).unwrap();
    dir
}

#[tokio::test]
async fn test_server_serves_configured_services() {
    let dir = services_file(
        "defined",
        "[[service]]\nname = \"quotes\"\ntype = \"SOAP\"\n\n[[service]]\nname = \"local-mock\"\ntype = \"REST\"\n",
    );
    let config = Config::from_toml_str(&format!(
        "[conductor]\nweb_app_file = \"services.toml\"\nextra_resources = {:?}\ncontext_path = \"/api/\"\nserver_port = 0\n",
        dir.display().to_string()
    ))
    .unwrap();

    let mut server = create_server(config.server_type().unwrap(), config.server_port);
    server.add_web_app(WebApp::from_config(&config).unwrap()).unwrap();
    server.tear_up().await.unwrap();
    let addr = server.local_addr().unwrap();

    let services = reqwest::get(format!("http://{addr}/api/services"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(services.contains(r#"name="quotes""#));
    assert!(services.contains(r#"name="local-mock""#));

    let unknown = reqwest::Client::new()
        .post(format!("http://{addr}/api/services/REST/unknown/endpoint"))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 404);

    let known = reqwest::Client::new()
        .post(format!("http://{addr}/api/services/REST/local-mock/endpoint"))
        .send()
        .await
        .unwrap();
    assert_eq!(known.status(), 200);

    server.tear_down().await.unwrap();
    assert_eq!(server.state(), ServerState::Stopped);
    assert!(reqwest::get(format!("http://{addr}/api/services")).await.is_err());

    std::fs::remove_dir_all(dir).ok();
}

#[tokio::test]
async fn test_fixed_port_busy_fails_to_start() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut server = create_server(ServerType::Embedded, port);
    let result = server.tear_up().await;
    assert!(matches!(result, Err(ConductorError::Io(_))));
    assert_eq!(server.state(), ServerState::NotStarted);
}

#[tokio::test]
async fn test_conductor_rejects_missing_service_definitions() {
    let config = Config::from_toml_str(
        "[conductor]\nweb_app_file = \"/nonexistent/services.toml\"\nserver_port = 0\n",
    )
    .unwrap();

    let result = HttpTestConductor::start_with(config).await;
    assert!(matches!(result, Err(ConductorError::ConfigNotFound(_))));
}
