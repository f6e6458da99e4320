//! Integration tests for datasource polling with mock HTTP servers.

use std::time::Duration;

use gridboard::dashboard::Dashboard;
use gridboard::datasource::DatasourceEvent;
use gridboard::plugin::{PluginRegistry, SettingsMap};
use serde_json::{json, Value};
use wiremock::matchers::{body_string, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(value: Value) -> SettingsMap {
    value.as_object().cloned().unwrap_or_default()
}

async fn next_update(
    events: &mut gridboard::dashboard::DashboardEvents,
) -> (String, Value) {
    loop {
        match tokio::time::timeout(Duration::from_secs(5), events.next_datasource_event())
            .await
            .expect("timed out waiting for a datasource event")
            .expect("event channel closed")
        {
            DatasourceEvent::Update { name, payload } => return (name, payload),
            DatasourceEvent::Error { .. } => continue,
        }
    }
}

#[tokio::test]
async fn test_json_datasource_delivers_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/metrics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"temp": 21.5})))
        .mount(&server)
        .await;

    let (mut dashboard, mut events) = Dashboard::new(PluginRegistry::with_builtins());
    dashboard
        .add_datasource(
            "api",
            "JSON",
            settings(json!({
                "url": format!("{}/metrics", server.uri()),
                "refresh": 3600,
                "use_proxy": false,
            })),
        )
        .await
        .unwrap();

    let (name, payload) = next_update(&mut events).await;
    assert_eq!(name, "api");
    assert_eq!(payload, json!({"temp": 21.5}));
    dashboard.clear();
}

#[tokio::test]
async fn test_json_datasource_sends_configured_method_and_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(header("x-api-key", "secret"))
        .and(body_string("{\"q\":1}"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"rows": 3})))
        .mount(&server)
        .await;

    let (mut dashboard, mut events) = Dashboard::new(PluginRegistry::with_builtins());
    dashboard
        .add_datasource(
            "api",
            "JSON",
            settings(json!({
                "url": format!("{}/query", server.uri()),
                "method": "POST",
                "body": "{\"q\":1}",
                "headers": [{"name": "x-api-key", "value": "secret"}],
                "refresh": 3600,
                "use_proxy": false,
            })),
        )
        .await
        .unwrap();

    let (_, payload) = next_update(&mut events).await;
    assert_eq!(payload, json!({"rows": 3}));
    dashboard.clear();
}

#[tokio::test]
async fn test_json_datasource_falls_back_to_plain_get() {
    // The configured POST fails; the plain-GET fallback stage succeeds.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let (mut dashboard, mut events) = Dashboard::new(PluginRegistry::with_builtins());
    dashboard
        .add_datasource(
            "api",
            "JSON",
            settings(json!({
                "url": format!("{}/data", server.uri()),
                "method": "POST",
                "refresh": 3600,
                "use_proxy": false,
            })),
        )
        .await
        .unwrap();

    let (_, payload) = next_update(&mut events).await;
    assert_eq!(payload, json!({"ok": true}));
    dashboard.clear();
}

#[tokio::test]
async fn test_json_datasource_relays_through_proxy() {
    // Both direct stages fail; the relay proxy stage serves the data.
    let server = MockServer::start().await;
    let target_url = "http://127.0.0.1:9/unreachable";
    Mock::given(method("GET"))
        .and(path_regex("^/fetch/.+"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"via": "proxy"})))
        .mount(&server)
        .await;

    let (mut dashboard, mut events) = Dashboard::new(PluginRegistry::with_builtins());
    dashboard
        .add_datasource(
            "api",
            "JSON",
            settings(json!({
                "url": target_url,
                "use_proxy": true,
                "proxy_url": server.uri(),
                "refresh": 3600,
            })),
        )
        .await
        .unwrap();

    let (_, payload) = next_update(&mut events).await;
    assert_eq!(payload, json!({"via": "proxy"}));
    dashboard.clear();
}

#[tokio::test]
async fn test_settings_change_polls_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"from": "a"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"from": "b"})))
        .mount(&server)
        .await;

    let (mut dashboard, mut events) = Dashboard::new(PluginRegistry::with_builtins());
    dashboard
        .add_datasource(
            "api",
            "JSON",
            settings(json!({
                "url": format!("{}/a", server.uri()),
                "refresh": 3600,
                "use_proxy": false,
            })),
        )
        .await
        .unwrap();
    let (_, payload) = next_update(&mut events).await;
    assert_eq!(payload, json!({"from": "a"}));

    dashboard
        .update_datasource_settings(
            "api",
            settings(json!({
                "url": format!("{}/b", server.uri()),
                "refresh": 3600,
                "use_proxy": false,
            })),
        )
        .await
        .unwrap();

    let (_, payload) = next_update(&mut events).await;
    assert_eq!(payload, json!({"from": "b"}));
    dashboard.clear();
}

#[tokio::test]
async fn test_deleted_datasource_emits_nothing_more() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"n": 1})))
        .mount(&server)
        .await;

    let (mut dashboard, mut events) = Dashboard::new(PluginRegistry::with_builtins());
    dashboard
        .add_datasource(
            "api",
            "JSON",
            settings(json!({
                "url": format!("{}/fast", server.uri()),
                "refresh": 0.1,
                "use_proxy": false,
            })),
        )
        .await
        .unwrap();
    let _ = next_update(&mut events).await;

    dashboard.delete_datasource("api").unwrap();

    // Drain anything sent before the dispose, then verify silence
    while events.try_next_datasource_event().is_some() {}
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(events.try_next_datasource_event().is_none());
}

#[tokio::test]
async fn test_playback_datasource_replays_dataset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recording.json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"step": 1}, {"step": 2}])),
        )
        .mount(&server)
        .await;

    let (mut dashboard, mut events) = Dashboard::new(PluginRegistry::with_builtins());
    dashboard
        .add_datasource(
            "replay",
            "playback",
            settings(json!({
                "datafile": format!("{}/recording.json", server.uri()),
                "refresh": 0.05,
                "loop": false,
            })),
        )
        .await
        .unwrap();

    let (_, first) = next_update(&mut events).await;
    let (_, second) = next_update(&mut events).await;
    assert_eq!(first, json!({"step": 1}));
    assert_eq!(second, json!({"step": 2}));
    dashboard.clear();
}

#[tokio::test]
async fn test_clock_datasource_payload_shape() {
    let (mut dashboard, mut events) = Dashboard::new(PluginRegistry::with_builtins());
    dashboard
        .add_datasource("time", "clock", settings(json!({"refresh": 3600})))
        .await
        .unwrap();

    let (name, payload) = next_update(&mut events).await;
    assert_eq!(name, "time");
    for field in [
        "numeric_value",
        "full_string_value",
        "date_string_value",
        "time_string_value",
    ] {
        assert!(payload.get(field).is_some(), "missing {field}");
    }
    dashboard.clear();
}
