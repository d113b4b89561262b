#![allow(clippy::unwrap_used)]
// Session lifecycle, auth and transport classification tests using wiremock.

use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bravia_api::{
    AuthStrategy, BraviaClient, Credentials, Error, RestRequest, Service, SessionState,
    TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

const DEVICE_COOKIE: &str =
    "auth=4a2b9c; Path=/sony/; expires=Thu, 27-Oct-2026 21:06:04 GMT+00:00; max-age=1209600";

async fn setup() -> (MockServer, BraviaClient) {
    setup_with(TransportConfig::default()).await
}

async fn setup_with(transport: TransportConfig) -> (MockServer, BraviaClient) {
    let server = MockServer::start().await;
    let client = BraviaClient::with_base_url(Url::parse(&server.uri()).unwrap(), transport);
    (server, client)
}

fn system_info_body() -> serde_json::Value {
    json!({
        "result": [{
            "product": "TV",
            "model": "KD-55X85J",
            "macAddr": "AA:BB:CC:DD:EE:FF",
            "name": "BRAVIA"
        }],
        "id": 1
    })
}

async fn mount_system_info(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .and(body_partial_json(json!({ "method": "getSystemInformation" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_info_body()))
        .mount(server)
        .await;
}

async fn mount_register(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/sony/accessControl"))
        .and(body_partial_json(json!({ "method": "actRegister" })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", DEVICE_COOKIE)
                .set_body_json(json!({ "result": [], "id": 1 })),
        )
        .mount(server)
        .await;
}

// ── Connect with pre-shared key ─────────────────────────────────────

#[tokio::test]
async fn test_connect_psk() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .and(header("X-Auth-PSK", "sony"))
        .and(body_partial_json(json!({ "method": "getSystemInformation", "params": [], "id": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_info_body()))
        .expect(1)
        .mount(&server)
        .await;

    client.connect(Credentials::psk("sony")).await.unwrap();

    assert_eq!(client.state(), SessionState::Connected);
    assert_eq!(client.auth_strategy(), AuthStrategy::PreSharedKey);
    assert_eq!(client.mac(), Some("AA:BB:CC:DD:EE:FF"));
    assert!(client.has_transport());
}

#[tokio::test]
async fn test_connect_psk_prefix_in_pin() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .and(header("X-Auth-PSK", "0000abcd"))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_info_body()))
        .expect(1)
        .mount(&server)
        .await;

    client
        .connect(Credentials::from_pin("psk:0000abcd", "ignored", "ignored"))
        .await
        .unwrap();

    assert_eq!(client.auth_strategy(), AuthStrategy::PreSharedKey);
}

#[tokio::test]
async fn test_connect_psk_clears_pin_state() {
    let (server, mut client) = setup().await;
    mount_register(&server).await;
    mount_system_info(&server).await;

    client
        .connect(Credentials::from_pin("1234", "client", "nick"))
        .await
        .unwrap();
    let system_url = server.uri().parse::<Url>().unwrap().join("/sony/system").unwrap();
    assert!(client.cookie_jar().cookie_header(&system_url).is_some());

    client.connect(Credentials::psk("sony")).await.unwrap();

    assert_eq!(client.auth_strategy(), AuthStrategy::PreSharedKey);
    assert_eq!(client.cookie_jar().cookie_header(&system_url), None);

    let requests = server.received_requests().await.unwrap();
    let last = requests.last().unwrap();
    assert!(last.headers.get("authorization").is_none());
    assert!(last.headers.get("cookie").is_none());
    assert_eq!(last.headers.get("x-auth-psk").unwrap(), "sony");
}

// ── Connect with PIN ────────────────────────────────────────────────

#[tokio::test]
async fn test_connect_pin_registers_and_records_mac() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sony/accessControl"))
        .and(header("Authorization", "Basic OjEyMzQ="))
        .and(body_partial_json(json!({
            "method": "actRegister",
            "params": [
                { "clientid": "client", "nickname": "nick", "level": "private" },
                [{ "value": "yes", "function": "WOL" }]
            ],
            "id": 1,
            "version": "1.0"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Set-Cookie", DEVICE_COOKIE)
                .set_body_json(json!({ "result": [], "id": 1 })),
        )
        .expect(1)
        .mount(&server)
        .await;

    // The normalized auth cookie must ride along on the probe.
    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .and(header("Cookie", "auth=4a2b9c"))
        .and(body_partial_json(json!({ "method": "getSystemInformation" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(system_info_body()))
        .expect(1)
        .mount(&server)
        .await;

    client
        .connect(Credentials::from_pin("1234", "client", "nick"))
        .await
        .unwrap();

    assert_eq!(client.state(), SessionState::Connected);
    assert_eq!(client.auth_strategy(), AuthStrategy::Pin);
    assert_eq!(client.mac(), Some("AA:BB:CC:DD:EE:FF"));
}

#[tokio::test]
async fn test_connect_keeps_known_mac() {
    let server = MockServer::start().await;
    let mut client =
        BraviaClient::with_base_url(Url::parse(&server.uri()).unwrap(), TransportConfig::default())
            .with_mac("11:22:33:44:55:66");
    mount_system_info(&server).await;

    client.connect(Credentials::psk("sony")).await.unwrap();

    assert_eq!(client.mac(), Some("11:22:33:44:55:66"));
}

#[tokio::test]
async fn test_connect_empty_probe_is_not_supported() {
    let (server, mut client) = setup().await;
    mount_register(&server).await;

    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [{}], "id": 1 })))
        .mount(&server)
        .await;

    let result = client
        .connect(Credentials::from_pin("1234", "client", "nick"))
        .await;

    assert!(
        matches!(result, Err(Error::NotSupported)),
        "expected NotSupported, got: {result:?}"
    );
    assert_eq!(client.state(), SessionState::Disconnected);
    assert_eq!(client.auth_strategy(), AuthStrategy::None);
}

#[tokio::test]
async fn test_connect_accepts_non_object_probe_answer() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .and(body_partial_json(json!({ "method": "getSystemInformation" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": ["KD-55X85J"], "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    client.connect(Credentials::psk("sony")).await.unwrap();

    assert_eq!(client.state(), SessionState::Connected);
    assert_eq!(client.mac(), None);
}

#[tokio::test]
async fn test_connect_wrong_pin() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sony/accessControl"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "error": [401, "Unauthorized"] })))
        .mount(&server)
        .await;

    let result = client
        .connect(Credentials::from_pin("9999", "client", "nick"))
        .await;

    assert!(
        matches!(result, Err(Error::Authentication { status: 401 })),
        "expected Authentication error, got: {result:?}"
    );
    assert_eq!(client.state(), SessionState::Disconnected);
}

// ── Pairing ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_pair_swallows_auth_error() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sony/accessControl"))
        .and(header("Authorization", "Basic OjAwMDA="))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    client.pair("client", "nick").await.unwrap();
}

#[tokio::test]
async fn test_pair_propagates_other_errors() {
    let (_server, mut client) = setup().await;

    // Nothing mounted: wiremock answers 404.
    let result = client.pair("client", "nick").await;

    assert!(
        matches!(result, Err(Error::NotFound { .. })),
        "expected NotFound, got: {result:?}"
    );
}

// ── Disconnect / reconnect ──────────────────────────────────────────

#[tokio::test]
async fn test_disconnect_then_reconnect() {
    let (server, mut client) = setup().await;
    mount_system_info(&server).await;

    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .and(body_partial_json(json!({ "method": "getRemoteControllerInfo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                { "bundled": true, "type": "IR_REMOTE_BUNDLE_TYPE_AEP_N" },
                [{ "name": "Home", "value": "AAAAAQAAAAEAAABgAw==" }]
            ],
            "id": 1
        })))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/sony/ircc"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    client.connect(Credentials::psk("sony")).await.unwrap();
    assert!(client.send_command("Home").await.unwrap());
    assert_eq!(client.cached_command_count(), 1);

    client.disconnect();
    assert_eq!(client.state(), SessionState::Disconnected);
    assert_eq!(client.auth_strategy(), AuthStrategy::None);
    assert_eq!(client.cached_command_count(), 0);
    assert!(!client.has_transport());

    // Idempotent.
    client.disconnect();

    client.connect(Credentials::psk("sony")).await.unwrap();
    assert_eq!(client.state(), SessionState::Connected);
    assert_eq!(client.cached_command_count(), 0);
    assert!(client.send_command("Home").await.unwrap());
}

#[tokio::test]
async fn test_scoped_session_disconnects_on_early_return() {
    async fn use_session(client: &mut BraviaClient) -> Result<bool, Error> {
        let mut session = client.scoped();
        session.connect(Credentials::psk("sony")).await?;
        session.get_power_status().await?;
        Ok(true)
    }

    let (server, mut client) = setup().await;
    mount_system_info(&server).await;

    Mock::given(method("POST"))
        .and(path("/sony/system"))
        .and(body_partial_json(json!({ "method": "getPowerStatus" })))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let result = use_session(&mut client).await;

    assert!(matches!(result, Err(Error::Authentication { status: 403 })));
    assert_eq!(client.state(), SessionState::Disconnected);
    assert_eq!(client.auth_strategy(), AuthStrategy::None);
    assert!(!client.has_transport());
}

// ── Transport classification ────────────────────────────────────────

#[tokio::test]
async fn test_status_mapping() {
    for (status, body) in [(404_u16, "missing"), (401, "{}"), (403, "denied")] {
        let (server, mut client) = setup().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;

        let result = client
            .send_rest_req(&RestRequest::new(Service::System, "getPowerStatus"))
            .await;

        match (status, result) {
            (404, Err(Error::NotFound { url })) => assert!(url.ends_with("/sony/system")),
            (401 | 403, Err(Error::Authentication { status: got })) => assert_eq!(got, status),
            (_, other) => panic!("HTTP {status}: unexpected outcome {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_other_status_is_empty_response() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let request = RestRequest::new(Service::System, "requestReboot");
    assert_eq!(client.send_rest_req(&request).await.unwrap(), json!({}));
    assert!(!client.send_rest_quick(&request).await.unwrap());
    assert!(!client.send_ircc_req("AAAAAQAAAAEAAAAuAw==").await.unwrap());
}

#[tokio::test]
async fn test_turned_off_payload() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sony/avContent"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": [40005, "not power-on"], "id": 1 })),
        )
        .mount(&server)
        .await;

    let result = client.get_playing_info().await;

    assert!(
        matches!(result, Err(Error::TurnedOff)),
        "expected TurnedOff, got: {result:?}"
    );
}

#[tokio::test]
async fn test_invalid_json_body() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = client.get_power_status().await;

    match result {
        Err(Error::Deserialization { body, .. }) => assert!(body.contains("not json")),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_timeout() {
    let (server, mut client) =
        setup_with(TransportConfig::default().with_timeout(Duration::from_millis(200))).await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(2))
                .set_body_json(json!({ "result": [] })),
        )
        .mount(&server)
        .await;

    let result = client
        .send_rest_req(&RestRequest::new(Service::System, "getWolMode"))
        .await;

    match result {
        Err(err @ Error::Timeout { .. }) => {
            assert_eq!(err.to_string(), "Request timed out after 200ms");
        }
        other => panic!("expected Timeout, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_connection_refused() {
    // Port 1 (tcpmux) is closed on any sane test host.
    let mut client = BraviaClient::new("127.0.0.1:1").unwrap();

    let result = client
        .send_rest_req(&RestRequest::new(Service::System, "getPowerStatus"))
        .await;

    assert!(
        matches!(result, Err(Error::Connection(_))),
        "expected Connection error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_send_rest_quick() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "setActiveApp" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [], "id": 1 })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "setPlayContent" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": [7, "Illegal State"], "id": 1 })),
        )
        .mount(&server)
        .await;

    assert!(client.set_active_app("com.sony.dtv.netflix").await.unwrap());
    assert!(!client.set_play_content("extInput:hdmi?port=1").await.unwrap());
}

#[tokio::test]
async fn test_common_headers_are_sent() {
    let (server, mut client) = setup().await;

    Mock::given(method("POST"))
        .and(header("Cache-Control", "no-cache"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [{ "status": "active" }] })))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.get_power_status().await.unwrap(), "active");
}
