//! Text readout widget.

use serde_json::Value;

use crate::plugin::{
    str_setting, SettingDef, SettingKind, SettingOption, SettingsMap, WidgetPlugin,
};
use crate::widget::WidgetInstance;

use super::display_string;

pub fn text_plugin() -> WidgetPlugin {
    WidgetPlugin::new(
        "text_widget",
        vec![
            SettingDef::new("title", SettingKind::Text).display_name("Title"),
            SettingDef::new("size", SettingKind::Option)
                .display_name("Size")
                .options(vec![
                    SettingOption {
                        name: "Regular".to_string(),
                        value: Value::String("regular".to_string()),
                    },
                    SettingOption {
                        name: "Big".to_string(),
                        value: Value::String("big".to_string()),
                    },
                ]),
            SettingDef::new("value", SettingKind::Calculated).display_name("Value"),
            SettingDef::new("units", SettingKind::Text).display_name("Units"),
        ],
        Box::new(|settings, _sink| {
            Ok(Box::new(TextWidget::new(&settings)) as Box<dyn WidgetInstance>)
        }),
    )
    .display_name("Text")
}

struct TextWidget {
    big: bool,
    units: String,
    current: String,
}

impl TextWidget {
    fn new(settings: &SettingsMap) -> Self {
        let mut widget = Self {
            big: false,
            units: String::new(),
            current: String::new(),
        };
        widget.apply(settings);
        widget
    }

    fn apply(&mut self, settings: &SettingsMap) {
        self.big = str_setting(settings, "size") == Some("big");
        self.units = str_setting(settings, "units").unwrap_or("").to_string();
    }

    #[cfg(test)]
    fn display(&self) -> String {
        if self.units.is_empty() {
            self.current.clone()
        } else {
            format!("{} {}", self.current, self.units)
        }
    }
}

impl WidgetInstance for TextWidget {
    fn on_settings_changed(&mut self, settings: &SettingsMap) {
        self.apply(settings);
    }

    fn on_calculated_value_changed(&mut self, setting_name: &str, value: Value) {
        if setting_name == "value" {
            self.current = display_string(&value);
        }
    }

    fn height_blocks(&self) -> u32 {
        if self.big {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::mpsc;

    use crate::widget::EventSink;

    use super::*;

    fn build(settings: serde_json::Value) -> Box<dyn WidgetInstance> {
        let (tx, _rx) = mpsc::unbounded_channel();
        let plugin = text_plugin();
        let map = settings.as_object().cloned().unwrap_or_default();
        (plugin.constructor)(map, EventSink::new(tx)).unwrap()
    }

    #[test]
    fn test_big_size_doubles_height() {
        let regular = build(json!({"size": "regular"}));
        let big = build(json!({"size": "big"}));

        assert_eq!(regular.height_blocks(), 1);
        assert_eq!(big.height_blocks(), 2);
    }

    #[test]
    fn test_value_updates_display() {
        let settings = json!({"units": "C"}).as_object().cloned().unwrap();
        let mut widget = TextWidget::new(&settings);

        widget.on_calculated_value_changed("value", json!(21.5));
        assert_eq!(widget.display(), "21.5 C");

        widget.on_calculated_value_changed("value", json!("offline"));
        assert_eq!(widget.display(), "offline C");
    }

    #[test]
    fn test_other_settings_are_ignored() {
        let mut widget = TextWidget::new(&SettingsMap::new());
        widget.on_calculated_value_changed("unrelated", json!(9));
        assert_eq!(widget.display(), "");
    }
}
