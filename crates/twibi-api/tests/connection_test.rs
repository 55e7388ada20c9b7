#![allow(clippy::unwrap_used)]
// Integration tests for `Connection` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use twibi_api::{Connection, Error, ErrorKind, ModuleId, SetCommand};

// ── Helpers ─────────────────────────────────────────────────────────

fn password() -> secrecy::SecretString {
    "secret".to_string().into()
}

fn connection_for(server: &MockServer, http: reqwest::Client) -> Connection {
    let base_url = Url::parse(&format!("{}/goform/", server.uri())).unwrap();
    Connection::with_client(http, base_url, password())
}

async fn setup() -> (MockServer, Connection) {
    let server = MockServer::start().await;
    let conn = connection_for(&server, reqwest::Client::new());
    (server, conn)
}

async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/goform/set"))
        .and(body_partial_json(json!({ "login": {} })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errcode": "0" })))
        .mount(server)
        .await;
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_sends_md5_digest() {
    let (server, conn) = setup().await;

    Mock::given(method("POST"))
        .and(path("/goform/set"))
        .and(body_partial_json(json!({
            "login": { "pwd": "5ebe2294ecd0e0f08eab7690d2a6ee69" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errcode": "0" })))
        .expect(1)
        .mount(&server)
        .await;

    conn.login().await.unwrap();
    assert!(conn.is_authenticated());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["login"]["timestamp"].is_i64());
}

#[tokio::test]
async fn test_login_rejected_credentials() {
    let (server, conn) = setup().await;

    Mock::given(method("POST"))
        .and(path("/goform/set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errcode": "1" })))
        .mount(&server)
        .await;

    let result = conn.login().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!conn.is_authenticated());
}

#[tokio::test]
async fn test_login_malformed_json_is_api_error() {
    let (server, conn) = setup().await;

    Mock::given(method("POST"))
        .and(path("/goform/set"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = conn.login().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Api);
    assert!(!conn.is_authenticated());
}

#[tokio::test]
async fn test_concurrent_callers_share_one_login() {
    let (server, conn) = setup().await;

    Mock::given(method("POST"))
        .and(path("/goform/set"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "errcode": "0" }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let conn = Arc::new(conn);
    let attempts = (0..8).map(|_| {
        let conn = Arc::clone(&conn);
        async move { conn.ensure_authenticated().await }
    });
    let results = futures_util::future::join_all(attempts).await;

    assert!(results.iter().all(Result::is_ok));
    assert!(conn.is_authenticated());
}

// ── Data fetch ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_data_joins_modules_with_commas() {
    let (server, conn) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path("/goform/get"))
        .and(query_param("module_id", "node_info,online_list,wan_statistic"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "node_info": [{ "sn": "SWSI29157827Q", "Uptime": "1200" }],
            "online_list": [],
            "wan_statistic": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data = conn.get_data(&ModuleId::CORE).await.unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data["node_info"][0]["sn"], "SWSI29157827Q");

    let requests = server.received_requests().await.unwrap();
    let get = requests.iter().find(|r| r.method.as_str() == "GET").unwrap();
    assert_eq!(
        get.url.query(),
        Some("module_id=node_info,online_list,wan_statistic")
    );
}

#[tokio::test]
async fn test_html_body_expires_session_and_relogs() {
    let (server, conn) = setup().await;

    Mock::given(method("POST"))
        .and(path("/goform/set"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errcode": "0" })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/goform/get"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<!DOCTYPE html><html><title>Login</title></html>"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/goform/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "wifi": {} })))
        .mount(&server)
        .await;

    let err = conn.get_data(&[ModuleId::Wifi]).await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired));
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(!conn.is_authenticated());

    let data = conn.get_data(&[ModuleId::Wifi]).await.unwrap();
    assert!(data.contains_key("wifi"));
    assert!(conn.is_authenticated());
}

#[tokio::test]
async fn test_empty_body_is_api_error_and_keeps_session() {
    let (server, conn) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path("/goform/get"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = conn.get_data(&[ModuleId::NodeInfo]).await.unwrap_err();
    assert!(matches!(err, Error::EmptyResponse));
    assert_eq!(err.kind(), ErrorKind::Api);
    assert!(conn.is_authenticated());
}

#[tokio::test]
async fn test_transport_timeout_resets_session() {
    let server = MockServer::start().await;
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    let conn = connection_for(&server, http);
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path("/goform/get"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    conn.ensure_authenticated().await.unwrap();
    let err = conn.get_data(&[ModuleId::NodeInfo]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(!conn.is_authenticated());
}

#[tokio::test]
async fn test_abandoned_request_resets_session() {
    let (server, conn) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path("/goform/get"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    conn.ensure_authenticated().await.unwrap();
    let abandoned =
        tokio::time::timeout(Duration::from_millis(100), conn.get_data(&ModuleId::CORE)).await;
    assert!(abandoned.is_err());
    assert!(!conn.is_authenticated());
}

#[tokio::test]
async fn test_unreachable_router_is_connection_error() {
    let base_url = Url::parse("http://127.0.0.1:1/goform/").unwrap();
    let conn = Connection::with_client(reqwest::Client::new(), base_url, password());

    let err = conn.get_data(&ModuleId::CORE).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(!conn.is_authenticated());
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_send_command_posts_payload() {
    let (server, conn) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("POST"))
        .and(path("/goform/set"))
        .and(body_partial_json(json!({
            "led": { "led_en": "1", "sn": "SWSI29157827Q" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errcode": "0" })))
        .expect(1)
        .mount(&server)
        .await;

    let response = conn
        .send_command(&SetCommand::led("SWSI29157827Q", true, 1))
        .await
        .unwrap();
    assert_eq!(response["errcode"], "0");
}

#[tokio::test]
async fn test_send_command_empty_body() {
    let (server, conn) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("POST"))
        .and(path("/goform/set"))
        .and(|req: &Request| {
            serde_json::from_slice::<serde_json::Value>(&req.body)
                .is_ok_and(|v| v.get("sys_reboot").is_some())
        })
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let err = conn
        .send_command(&SetCommand::reboot(1))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyResponse));
}
