use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::plugin::{PluginError, PluginRegistry, SettingsMap};

use super::*;

fn settings(pairs: &[(&str, serde_json::Value)]) -> SettingsMap {
    let mut map = SettingsMap::new();
    for (name, value) in pairs {
        map.insert((*name).to_string(), value.clone());
    }
    map
}

fn sender(name: &str) -> (UpdateSender, mpsc::UnboundedReceiver<DatasourceEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        UpdateSender::new(name.to_string(), tx, CancellationToken::new()),
        rx,
    )
}

#[tokio::test]
async fn test_update_sender_delivers_named_events() {
    let (sender, mut rx) = sender("feed");

    sender.send(json!({"v": 1}));
    sender.send_error("boom");

    match rx.recv().await.unwrap() {
        DatasourceEvent::Update { name, payload } => {
            assert_eq!(name, "feed");
            assert_eq!(payload, json!({"v": 1}));
        }
        other => panic!("unexpected event: {other:?}"),
    }
    match rx.recv().await.unwrap() {
        DatasourceEvent::Error { name, message } => {
            assert_eq!(name, "feed");
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn test_update_sender_drops_events_after_cancel() {
    let (sender, mut rx) = sender("feed");

    sender.cancellation().cancel();
    sender.send(json!(1));
    sender.send_error("late");

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_clock_update_now_emits_time_payload() {
    let (sender, mut rx) = sender("clock");
    let mut source = clock::ClockSource::new(&settings(&[]), sender);

    source.update_now().await;

    match rx.recv().await.unwrap() {
        DatasourceEvent::Update { payload, .. } => {
            assert!(payload.get("numeric_value").unwrap().is_i64());
            assert!(payload.get("full_string_value").unwrap().is_string());
            assert!(payload.get("date_string_value").unwrap().is_string());
            assert!(payload.get("time_string_value").unwrap().is_string());
        }
        other => panic!("unexpected event: {other:?}"),
    }
    source.on_dispose();
}

#[tokio::test(start_paused = true)]
async fn test_clock_timer_ticks_on_refresh_interval() {
    let (sender, mut rx) = sender("clock");
    let mut source = clock::ClockSource::new(&settings(&[("refresh", json!(2))]), sender);

    tokio::time::advance(std::time::Duration::from_secs(5)).await;

    // At least two interval ticks landed in five virtual seconds
    assert!(matches!(
        rx.recv().await.unwrap(),
        DatasourceEvent::Update { .. }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        DatasourceEvent::Update { .. }
    ));
    source.on_dispose();
}

#[tokio::test(start_paused = true)]
async fn test_disposed_clock_never_ticks_again() {
    let (sender, mut rx) = sender("clock");
    let mut source = clock::ClockSource::new(&settings(&[("refresh", json!(1))]), sender);

    source.on_dispose();
    tokio::time::advance(std::time::Duration::from_secs(10)).await;
    tokio::task::yield_now().await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_settings_change_reschedules_and_updates_immediately() {
    let (sender, mut rx) = sender("clock");
    let mut source = clock::ClockSource::new(&settings(&[("refresh", json!(60))]), sender);

    source
        .on_settings_changed(settings(&[("refresh", json!(1))]))
        .await;

    // The settings change produces an immediate update
    assert!(matches!(
        rx.recv().await.unwrap(),
        DatasourceEvent::Update { .. }
    ));

    // And the new one-second cadence is in effect
    tokio::time::advance(std::time::Duration::from_secs(3)).await;
    assert!(matches!(
        rx.recv().await.unwrap(),
        DatasourceEvent::Update { .. }
    ));
    source.on_dispose();
}

#[tokio::test]
async fn test_json_plugin_rejects_non_string_url() {
    let registry = PluginRegistry::with_builtins();
    let (sender, _rx) = sender("feed");

    let result = registry.create_datasource("JSON", settings(&[("url", json!(42))]), sender);
    assert!(matches!(result, Err(PluginError::Construction { .. })));
}

#[tokio::test]
async fn test_model_set_type_constructs_and_updates() {
    let registry = PluginRegistry::with_builtins();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut model = DatasourceModel::new("time", tx);

    model
        .set_type(&registry, "clock", settings(&[]))
        .await
        .unwrap();

    assert_eq!(model.type_name(), "clock");
    assert!(model.is_instantiated());
    // Construction triggers an immediate update
    assert!(matches!(
        rx.recv().await.unwrap(),
        DatasourceEvent::Update { name, .. } if name == "time"
    ));
    model.dispose();
}

#[tokio::test]
async fn test_model_set_type_unknown_type_fails() {
    let registry = PluginRegistry::with_builtins();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut model = DatasourceModel::new("x", tx);

    let result = model.set_type(&registry, "no-such-type", settings(&[])).await;
    assert!(result.is_err());
    assert!(!model.is_instantiated());
}

#[tokio::test(start_paused = true)]
async fn test_model_type_change_disposes_previous_instance() {
    let registry = PluginRegistry::with_builtins();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut model = DatasourceModel::new("feed", tx);

    model
        .set_type(&registry, "clock", settings(&[("refresh", json!(1))]))
        .await
        .unwrap();
    while rx.try_recv().is_ok() {}

    // Replace with a slow clock; the old one-second timer must be gone
    model
        .set_type(&registry, "clock", settings(&[("refresh", json!(3600))]))
        .await
        .unwrap();
    // Drain the immediate update from construction
    let _ = rx.recv().await.unwrap();

    tokio::time::advance(std::time::Duration::from_secs(10)).await;
    tokio::task::yield_now().await;
    assert!(rx.try_recv().is_err());
    model.dispose();
}

#[tokio::test]
async fn test_model_bookkeeping_records_updates_and_errors() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut model = DatasourceModel::new("feed", tx);

    assert!(model.last_updated().is_none());
    assert!(model.last_error().is_none());

    model.record_error("connection refused".to_string());
    assert_eq!(model.last_error(), Some("connection refused"));

    // A successful update clears the error
    model.record_update();
    assert!(model.last_updated().is_some());
    assert!(model.last_error().is_none());
}

#[tokio::test]
async fn test_write_to_clock_is_unsupported() {
    let registry = PluginRegistry::with_builtins();
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut model = DatasourceModel::new("time", tx);

    model
        .set_type(&registry, "clock", settings(&[]))
        .await
        .unwrap();

    assert!(!model.supports_write());
    assert!(matches!(
        model.write_now(json!(1)).await,
        Err(DatasourceError::WriteUnsupported)
    ));
    model.dispose();
}

#[tokio::test]
async fn test_write_without_instance_fails() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut model = DatasourceModel::new("empty", tx);

    assert!(matches!(
        model.write_now(json!(1)).await,
        Err(DatasourceError::NotInstantiated)
    ));
}
