//! Toggle switch widget: a two-state control that writes back to the
//! datasource its value setting reads from.

use serde_json::{json, Value};

use crate::expr::first_resource_ref;
use crate::plugin::{str_setting, SettingDef, SettingKind, SettingsMap, WidgetPlugin};
use crate::widget::{EventSink, WidgetInstance};

use super::value_is_truthy;

pub fn toggle_switch_plugin() -> WidgetPlugin {
    WidgetPlugin::new(
        "toggle_switch",
        vec![
            SettingDef::new("title", SettingKind::Text).display_name("Title"),
            SettingDef::new("value", SettingKind::Calculated)
                .display_name("Value")
                .description("The datasource field reflecting the switch state"),
            SettingDef::new("on_value", SettingKind::Text)
                .display_name("On Value")
                .default_value(json!("1")),
            SettingDef::new("off_value", SettingKind::Text)
                .display_name("Off Value")
                .default_value(json!("0")),
        ],
        Box::new(|settings, sink| {
            Ok(Box::new(ToggleSwitchWidget::new(&settings, sink)) as Box<dyn WidgetInstance>)
        }),
    )
    .display_name("Toggle Switch")
}

struct ToggleSwitchWidget {
    sink: EventSink,
    on: bool,
    on_value: Value,
    off_value: Value,
    /// Datasource named by the first reference in the value expression.
    /// Writes go nowhere if the expression names none.
    target: Option<String>,
}

impl ToggleSwitchWidget {
    fn new(settings: &SettingsMap, sink: EventSink) -> Self {
        let mut widget = Self {
            sink,
            on: false,
            on_value: json!("1"),
            off_value: json!("0"),
            target: None,
        };
        widget.apply(settings);
        widget
    }

    fn apply(&mut self, settings: &SettingsMap) {
        self.on_value = settings.get("on_value").cloned().unwrap_or(json!("1"));
        self.off_value = settings.get("off_value").cloned().unwrap_or(json!("0"));
        self.target = str_setting(settings, "value").and_then(first_resource_ref);
    }
}

impl WidgetInstance for ToggleSwitchWidget {
    fn on_settings_changed(&mut self, settings: &SettingsMap) {
        self.apply(settings);
    }

    fn on_calculated_value_changed(&mut self, setting_name: &str, value: Value) {
        if setting_name == "value" {
            self.on = value_is_truthy(&value);
        }
    }

    /// A click flips the switch and writes the corresponding value to the
    /// datasource behind the value expression.
    fn handle_input(&mut self, input: Value) {
        let desired = match input {
            Value::Bool(b) => b,
            Value::Null => !self.on,
            other => value_is_truthy(&other),
        };
        self.on = desired;

        if let Some(target) = &self.target {
            let value = if desired {
                self.on_value.clone()
            } else {
                self.off_value.clone()
            };
            self.sink.write(target.clone(), value);
        }
    }
}
