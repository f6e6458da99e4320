use serde_json::{json, Map, Value};
use tokio::sync::mpsc;

use crate::plugin::{f64_setting, PluginRegistry, SettingDef, SettingKind, SettingsMap, WidgetPlugin};
use crate::widget::{EventSink, WidgetInstance, WidgetModel};

use super::*;

/// Test widget with a height taken straight from its settings.
struct FixedHeightWidget {
    height: u32,
}

impl WidgetInstance for FixedHeightWidget {
    fn on_settings_changed(&mut self, settings: &SettingsMap) {
        self.height = f64_setting(settings, "blocks").unwrap_or(1.0) as u32;
    }

    fn on_calculated_value_changed(&mut self, _setting_name: &str, _value: Value) {}

    fn height_blocks(&self) -> u32 {
        self.height
    }
}

fn registry() -> PluginRegistry {
    let mut registry = PluginRegistry::new();
    registry
        .register_widget(WidgetPlugin::new(
            "fixed",
            vec![SettingDef::new("blocks", SettingKind::Number).default_value(json!(1))],
            Box::new(|settings, _sink| {
                Ok(Box::new(FixedHeightWidget {
                    height: f64_setting(&settings, "blocks").unwrap_or(1.0) as u32,
                }) as Box<dyn WidgetInstance>)
            }),
        ))
        .unwrap();
    registry
}

fn widget(registry: &PluginRegistry, blocks: u32) -> WidgetModel {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut model = WidgetModel::new(EventSink::new(tx));
    model
        .set_type(
            registry,
            "fixed",
            json!({"blocks": blocks}).as_object().cloned().unwrap(),
            &Map::new(),
        )
        .unwrap();
    model
}

#[test]
fn test_empty_pane_has_minimum_height() {
    let pane = PaneModel::new();
    assert_eq!(pane.calculated_height(), 4);
}

#[test]
fn test_height_grows_with_widget_blocks() {
    let registry = registry();
    let mut pane = PaneModel::new();
    pane.add_widget(widget(&registry, 1));
    pane.add_widget(widget(&registry, 1));
    pane.add_widget(widget(&registry, 2));

    // Four blocks: ((4 * 6 + 3) * 10 + 20) / 30 rounded up is 10
    assert_eq!(pane.calculated_height(), 10);
}

#[test]
fn test_single_block_pane_stays_at_minimum() {
    let registry = registry();
    let mut pane = PaneModel::new();
    pane.add_widget(widget(&registry, 1));

    // One block computes to 4 rows, right at the floor
    assert_eq!(pane.calculated_height(), 4);
}

#[test]
fn test_move_widget_up_and_down() {
    let registry = registry();
    let mut pane = PaneModel::new();
    pane.add_widget(widget(&registry, 1));
    pane.add_widget(widget(&registry, 2));
    pane.add_widget(widget(&registry, 3));

    assert!(!pane.widget_can_move_up(0));
    assert!(pane.widget_can_move_up(2));
    assert!(pane.widget_can_move_down(0));
    assert!(!pane.widget_can_move_down(2));

    pane.move_widget_up(2);
    let heights: Vec<u32> = pane.widgets().iter().map(WidgetModel::height_blocks).collect();
    assert_eq!(heights, vec![1, 3, 2]);

    pane.move_widget_down(0);
    let heights: Vec<u32> = pane.widgets().iter().map(WidgetModel::height_blocks).collect();
    assert_eq!(heights, vec![3, 1, 2]);

    // Boundary moves do nothing
    pane.move_widget_up(0);
    pane.move_widget_down(2);
    let heights: Vec<u32> = pane.widgets().iter().map(WidgetModel::height_blocks).collect();
    assert_eq!(heights, vec![3, 1, 2]);
}

#[test]
fn test_remove_widget() {
    let registry = registry();
    let mut pane = PaneModel::new();
    pane.add_widget(widget(&registry, 1));
    pane.add_widget(widget(&registry, 2));

    pane.remove_widget(0);
    assert_eq!(pane.widgets().len(), 1);
    assert_eq!(pane.widgets()[0].height_blocks(), 2);

    // Out of range is a no-op
    pane.remove_widget(5);
    assert_eq!(pane.widgets().len(), 1);
}

#[test]
fn test_position_map_exact_match() {
    let mut map = PositionMap::default();
    map.set_for_columns(3, 7);
    map.set_for_columns(2, 4);

    assert_eq!(map.for_columns(3), 7);
    assert_eq!(map.for_columns(2), 4);
}

#[test]
fn test_position_map_falls_back_to_nearest_lower() {
    let mut map = PositionMap::default();
    map.set_for_columns(2, 4);
    map.set_for_columns(4, 9);

    // No entry for three columns: the two-column entry applies
    assert_eq!(map.for_columns(3), 4);
    // Above every entry: the largest lower one applies
    assert_eq!(map.for_columns(6), 9);
    // Below every entry: the smallest recorded one applies
    assert_eq!(map.for_columns(1), 4);
}

#[test]
fn test_position_map_empty_defaults_to_one() {
    assert_eq!(PositionMap::default().for_columns(3), 1);
}

#[test]
fn test_legacy_position_applies_everywhere() {
    let legacy: PositionMap = serde_json::from_value(json!(5)).unwrap();
    assert_eq!(legacy, PositionMap::Legacy(5));
    assert_eq!(legacy.for_columns(1), 5);
    assert_eq!(legacy.for_columns(12), 5);
}

#[test]
fn test_legacy_position_upgrades_on_write() {
    let mut map = PositionMap::Legacy(5);
    map.set_for_columns(3, 2);

    assert_eq!(map.for_columns(3), 2);
    assert!(matches!(map, PositionMap::PerColumns(_)));
}

#[test]
fn test_position_map_roundtrips_through_json() {
    let mut map = PositionMap::default();
    map.set_for_columns(3, 1);
    map.set_for_columns(2, 5);

    let value = serde_json::to_value(&map).unwrap();
    assert_eq!(value, json!({"2": 5, "3": 1}));

    let back: PositionMap = serde_json::from_value(value).unwrap();
    assert_eq!(back, map);
}
