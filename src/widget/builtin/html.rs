//! Raw HTML widget with a configurable block height.

use serde_json::{json, Value};

use crate::plugin::{f64_setting, SettingDef, SettingKind, SettingsMap, WidgetPlugin};
use crate::widget::WidgetInstance;

use super::display_string;

pub fn html_plugin() -> WidgetPlugin {
    WidgetPlugin::new(
        "html",
        vec![
            SettingDef::new("html", SettingKind::Calculated)
                .display_name("HTML")
                .description("Can be literal markup or a calculated expression"),
            SettingDef::new("height", SettingKind::Number)
                .display_name("Height Blocks")
                .default_value(json!(4)),
        ],
        Box::new(|settings, _sink| {
            Ok(Box::new(HtmlWidget::new(&settings)) as Box<dyn WidgetInstance>)
        }),
    )
    .display_name("HTML")
    .fill_size(true)
}

struct HtmlWidget {
    height: u32,
    content: String,
}

impl HtmlWidget {
    fn new(settings: &SettingsMap) -> Self {
        let mut widget = Self {
            height: 4,
            content: String::new(),
        };
        widget.apply(settings);
        widget
    }

    fn apply(&mut self, settings: &SettingsMap) {
        self.height = f64_setting(settings, "height")
            .map(|h| h.max(1.0) as u32)
            .unwrap_or(4);
    }
}

impl WidgetInstance for HtmlWidget {
    fn on_settings_changed(&mut self, settings: &SettingsMap) {
        self.apply(settings);
    }

    fn on_calculated_value_changed(&mut self, setting_name: &str, value: Value) {
        if setting_name == "html" {
            self.content = display_string(&value);
        }
    }

    fn height_blocks(&self) -> u32 {
        self.height
    }
}
