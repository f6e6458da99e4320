//! Integration tests for the update pipeline: datasource payloads flowing
//! through calculated settings into widgets.

mod common;

use common::{probe_widget_plugin, push_datasource_plugin, ProbeLog, PushHandle};
use gridboard::dashboard::Dashboard;
use gridboard::pane::PaneModel;
use gridboard::plugin::{PluginRegistry, SettingsMap};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

fn settings(value: Value) -> SettingsMap {
    value.as_object().cloned().unwrap_or_default()
}

async fn setup(
    widget_settings: Value,
) -> (Dashboard, gridboard::dashboard::DashboardEvents, PushHandle, ProbeLog) {
    let log: ProbeLog = Arc::new(Mutex::new(Vec::new()));
    let handle = PushHandle::default();

    let mut registry = PluginRegistry::new();
    registry
        .register_datasource(push_datasource_plugin(handle.clone()))
        .unwrap();
    registry
        .register_widget(probe_widget_plugin(Arc::clone(&log)))
        .unwrap();

    let (mut dashboard, events) = Dashboard::new(registry);
    dashboard
        .add_datasource("sensor", "push", SettingsMap::new())
        .await
        .unwrap();

    let mut pane = PaneModel::new();
    let mut widget = dashboard.new_widget();
    widget
        .set_type(
            dashboard.registry(),
            "probe",
            settings(widget_settings),
            dashboard.datasource_data(),
        )
        .unwrap();
    pane.add_widget(widget);
    dashboard.add_pane(pane);

    (dashboard, events, handle, log)
}

async fn pump(dashboard: &mut Dashboard, events: &mut gridboard::dashboard::DashboardEvents) {
    while let Some(event) = events.try_next_datasource_event() {
        dashboard.process_datasource_event(event);
    }
}

#[tokio::test]
async fn test_payload_flows_through_expression_into_widget() {
    let (mut dashboard, mut events, handle, log) =
        setup(json!({"value": "resources[\"sensor\"].celsius * 1.8 + 32"})).await;

    handle.push(json!({"celsius": 100}));
    pump(&mut dashboard, &mut events).await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[("value".to_string(), json!(212))]
    );
}

#[tokio::test]
async fn test_each_update_reevaluates() {
    let (mut dashboard, mut events, handle, log) =
        setup(json!({"value": "resources[\"sensor\"].n"})).await;

    handle.push(json!({"n": 1}));
    handle.push(json!({"n": 2}));
    handle.push(json!({"n": 3}));
    pump(&mut dashboard, &mut events).await;

    let values: Vec<Value> = log.lock().unwrap().iter().map(|(_, v)| v.clone()).collect();
    assert_eq!(values, vec![json!(1), json!(2), json!(3)]);
}

#[tokio::test]
async fn test_updates_from_unreferenced_datasource_do_not_reach_widget() {
    let log: ProbeLog = Arc::new(Mutex::new(Vec::new()));
    let handle_a = PushHandle::default();
    let handle_b = PushHandle::default();

    let mut registry = PluginRegistry::new();
    registry
        .register_datasource(push_datasource_plugin(handle_a.clone()))
        .unwrap();
    // Second push-style plugin under a different type name
    let mut other = push_datasource_plugin(handle_b.clone());
    other.type_name = "push2".to_string();
    registry.register_datasource(other).unwrap();
    registry
        .register_widget(probe_widget_plugin(Arc::clone(&log)))
        .unwrap();

    let (mut dashboard, mut events) = Dashboard::new(registry);
    dashboard
        .add_datasource("watched", "push", SettingsMap::new())
        .await
        .unwrap();
    dashboard
        .add_datasource("ignored", "push2", SettingsMap::new())
        .await
        .unwrap();

    let mut pane = PaneModel::new();
    let mut widget = dashboard.new_widget();
    widget
        .set_type(
            dashboard.registry(),
            "probe",
            settings(json!({"value": "resources[\"watched\"].v"})),
            dashboard.datasource_data(),
        )
        .unwrap();
    pane.add_widget(widget);
    dashboard.add_pane(pane);

    handle_b.push(json!({"v": 99}));
    handle_a.push(json!({"v": 1}));
    pump(&mut dashboard, &mut events).await;

    // Only the watched datasource produced a widget update, and the
    // ignored one's payload is still cached for other consumers
    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[("value".to_string(), json!(1))]
    );
    assert_eq!(
        dashboard.datasource_data().get("ignored"),
        Some(&json!({"v": 99}))
    );
}

#[tokio::test]
async fn test_expression_combining_two_datasources() {
    let log: ProbeLog = Arc::new(Mutex::new(Vec::new()));
    let handle_a = PushHandle::default();
    let handle_b = PushHandle::default();

    let mut registry = PluginRegistry::new();
    registry
        .register_datasource(push_datasource_plugin(handle_a.clone()))
        .unwrap();
    let mut other = push_datasource_plugin(handle_b.clone());
    other.type_name = "push2".to_string();
    registry.register_datasource(other).unwrap();
    registry
        .register_widget(probe_widget_plugin(Arc::clone(&log)))
        .unwrap();

    let (mut dashboard, mut events) = Dashboard::new(registry);
    dashboard
        .add_datasource("a", "push", SettingsMap::new())
        .await
        .unwrap();
    dashboard
        .add_datasource("b", "push2", SettingsMap::new())
        .await
        .unwrap();

    let mut pane = PaneModel::new();
    let mut widget = dashboard.new_widget();
    widget
        .set_type(
            dashboard.registry(),
            "probe",
            settings(json!({"value": "resources[\"a\"].v + resources[\"b\"].v"})),
            dashboard.datasource_data(),
        )
        .unwrap();
    pane.add_widget(widget);
    dashboard.add_pane(pane);

    handle_a.push(json!({"v": 10}));
    pump(&mut dashboard, &mut events).await;
    // Evaluation fails while b has no payload; nothing reaches the widget
    assert!(log.lock().unwrap().is_empty());

    handle_b.push(json!({"v": 5}));
    pump(&mut dashboard, &mut events).await;
    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[("value".to_string(), json!(15))]
    );
}

#[tokio::test]
async fn test_multi_statement_script_with_explicit_return() {
    let (mut dashboard, mut events, handle, log) = setup(json!({
        "value": "var c = resources[\"sensor\"].celsius; var f = c * 1.8 + 32; return f > 90 ? \"hot\" : \"ok\";"
    }))
    .await;

    handle.push(json!({"celsius": 35}));
    pump(&mut dashboard, &mut events).await;

    assert_eq!(
        log.lock().unwrap().as_slice(),
        &[("value".to_string(), json!("hot"))]
    );
}
