//! Indicator light widget: an on/off lamp with configurable captions.

use serde_json::Value;

use crate::plugin::{SettingDef, SettingKind, SettingsMap, WidgetPlugin};
use crate::widget::WidgetInstance;

use super::{display_string, value_is_truthy};

pub fn indicator_plugin() -> WidgetPlugin {
    WidgetPlugin::new(
        "indicator",
        vec![
            SettingDef::new("title", SettingKind::Text).display_name("Title"),
            SettingDef::new("value", SettingKind::Calculated).display_name("Value"),
            SettingDef::new("on_text", SettingKind::Calculated).display_name("On Text"),
            SettingDef::new("off_text", SettingKind::Calculated).display_name("Off Text"),
        ],
        Box::new(|_settings, _sink| {
            Ok(Box::new(IndicatorWidget::default()) as Box<dyn WidgetInstance>)
        }),
    )
    .display_name("Indicator Light")
}

#[derive(Default)]
struct IndicatorWidget {
    on: bool,
    on_text: String,
    off_text: String,
}

impl IndicatorWidget {
    #[cfg(test)]
    fn caption(&self) -> &str {
        if self.on {
            &self.on_text
        } else {
            &self.off_text
        }
    }
}

impl WidgetInstance for IndicatorWidget {
    fn on_settings_changed(&mut self, _settings: &SettingsMap) {}

    fn on_calculated_value_changed(&mut self, setting_name: &str, value: Value) {
        match setting_name {
            "value" => self.on = value_is_truthy(&value),
            "on_text" => self.on_text = display_string(&value),
            "off_text" => self.off_text = display_string(&value),
            _ => {}
        }
    }
}
