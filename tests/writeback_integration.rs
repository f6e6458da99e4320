//! Integration tests for widget write-back: interaction events travelling
//! from a widget through the dashboard into a datasource.

mod common;

use common::{push_datasource_plugin, PushHandle};
use gridboard::dashboard::Dashboard;
use gridboard::pane::PaneModel;
use gridboard::plugin::{PluginRegistry, SettingsMap};
use serde_json::{json, Value};

fn settings(value: Value) -> SettingsMap {
    value.as_object().cloned().unwrap_or_default()
}

async fn setup_toggle(
    toggle_settings: Value,
) -> (Dashboard, gridboard::dashboard::DashboardEvents, PushHandle) {
    let handle = PushHandle::default();
    let mut registry = PluginRegistry::with_builtins();
    registry
        .register_datasource(push_datasource_plugin(handle.clone()))
        .unwrap();

    let (mut dashboard, events) = Dashboard::new(registry);
    dashboard
        .add_datasource("relay", "push", SettingsMap::new())
        .await
        .unwrap();

    let mut pane = PaneModel::new();
    let mut widget = dashboard.new_widget();
    widget
        .set_type(
            dashboard.registry(),
            "toggle_switch",
            settings(toggle_settings),
            dashboard.datasource_data(),
        )
        .unwrap();
    pane.add_widget(widget);
    dashboard.add_pane(pane);

    (dashboard, events, handle)
}

#[tokio::test]
async fn test_toggle_click_writes_to_datasource() {
    let (mut dashboard, mut events, handle) = setup_toggle(json!({
        "value": "resources[\"relay\"].state",
        "on_value": "ON",
        "off_value": "OFF",
    }))
    .await;

    // Click the switch on
    dashboard
        .panes_mut()
        .next()
        .unwrap()
        .handle_widget_input(0, json!(true));

    let event = events.try_next_widget_event().expect("no widget event");
    dashboard.process_widget_event(event).await;

    assert_eq!(handle.writes.lock().unwrap().as_slice(), &[json!("ON")]);

    // And off again
    dashboard
        .panes_mut()
        .next()
        .unwrap()
        .handle_widget_input(0, json!(false));
    let event = events.try_next_widget_event().unwrap();
    dashboard.process_widget_event(event).await;

    assert_eq!(
        handle.writes.lock().unwrap().as_slice(),
        &[json!("ON"), json!("OFF")]
    );
}

#[tokio::test]
async fn test_toggle_uses_default_on_off_values() {
    let (mut dashboard, mut events, handle) =
        setup_toggle(json!({"value": "resources[\"relay\"].state"})).await;

    dashboard
        .panes_mut()
        .next()
        .unwrap()
        .handle_widget_input(0, json!(true));
    let event = events.try_next_widget_event().unwrap();
    dashboard.process_widget_event(event).await;

    assert_eq!(handle.writes.lock().unwrap().as_slice(), &[json!("1")]);
}

#[tokio::test]
async fn test_write_to_missing_datasource_is_swallowed() {
    let (mut dashboard, mut events, handle) = setup_toggle(json!({
        "value": "resources[\"nonexistent\"].state",
    }))
    .await;

    dashboard
        .panes_mut()
        .next()
        .unwrap()
        .handle_widget_input(0, json!(true));
    let event = events.try_next_widget_event().unwrap();
    // The event names a datasource the dashboard does not have; processing
    // logs and drops it
    dashboard.process_widget_event(event).await;

    assert!(handle.writes.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_disposed_widget_cannot_write() {
    let (mut dashboard, mut events, _handle) = setup_toggle(json!({
        "value": "resources[\"relay\"].state",
    }))
    .await;

    let pane = dashboard.panes_mut().next().unwrap();
    pane.remove_widget(0);
    assert!(events.try_next_widget_event().is_none());
}
