//! Gauge widget: a bounded numeric readout.

use serde_json::{json, Value};

use crate::plugin::{
    f64_setting, str_setting, SettingDef, SettingKind, SettingsMap, WidgetPlugin,
};
use crate::widget::WidgetInstance;

pub fn gauge_plugin() -> WidgetPlugin {
    WidgetPlugin::new(
        "gauge",
        vec![
            SettingDef::new("title", SettingKind::Text).display_name("Title"),
            SettingDef::new("value", SettingKind::Calculated).display_name("Value"),
            SettingDef::new("units", SettingKind::Text).display_name("Units"),
            SettingDef::new("min_value", SettingKind::Number)
                .display_name("Minimum")
                .default_value(json!(0)),
            SettingDef::new("max_value", SettingKind::Number)
                .display_name("Maximum")
                .default_value(json!(100)),
        ],
        Box::new(|settings, _sink| {
            Ok(Box::new(GaugeWidget::new(&settings)) as Box<dyn WidgetInstance>)
        }),
    )
    .display_name("Gauge")
}

struct GaugeWidget {
    min: f64,
    max: f64,
    units: String,
    current: Option<f64>,
}

impl GaugeWidget {
    fn new(settings: &SettingsMap) -> Self {
        let mut widget = Self {
            min: 0.0,
            max: 100.0,
            units: String::new(),
            current: None,
        };
        widget.apply(settings);
        widget
    }

    fn apply(&mut self, settings: &SettingsMap) {
        self.min = f64_setting(settings, "min_value").unwrap_or(0.0);
        self.max = f64_setting(settings, "max_value").unwrap_or(100.0);
        self.units = str_setting(settings, "units").unwrap_or("").to_string();
    }

    /// Current reading as a fraction of the configured range, clamped.
    #[cfg(test)]
    fn fraction(&self) -> Option<f64> {
        let value = self.current?;
        if self.max <= self.min {
            return Some(0.0);
        }
        Some(((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0))
    }
}

impl WidgetInstance for GaugeWidget {
    fn on_settings_changed(&mut self, settings: &SettingsMap) {
        self.apply(settings);
    }

    fn on_calculated_value_changed(&mut self, setting_name: &str, value: Value) {
        if setting_name != "value" {
            return;
        }
        self.current = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        };
    }

    fn height_blocks(&self) -> u32 {
        3
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn settings(value: serde_json::Value) -> SettingsMap {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_fraction_uses_configured_range() {
        let mut gauge = GaugeWidget::new(&settings(json!({"min_value": 10, "max_value": 20})));

        gauge.on_calculated_value_changed("value", json!(15));
        assert_eq!(gauge.fraction(), Some(0.5));
    }

    #[test]
    fn test_out_of_range_values_clamp() {
        let mut gauge = GaugeWidget::new(&settings(json!({})));

        gauge.on_calculated_value_changed("value", json!(250));
        assert_eq!(gauge.fraction(), Some(1.0));

        gauge.on_calculated_value_changed("value", json!(-3));
        assert_eq!(gauge.fraction(), Some(0.0));
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let mut gauge = GaugeWidget::new(&settings(json!({})));

        gauge.on_calculated_value_changed("value", json!("42.5"));
        assert_eq!(gauge.fraction(), Some(0.425));
    }

    #[test]
    fn test_non_numeric_value_clears_reading() {
        let mut gauge = GaugeWidget::new(&settings(json!({})));

        gauge.on_calculated_value_changed("value", json!(50));
        gauge.on_calculated_value_changed("value", json!({"a": 1}));
        assert_eq!(gauge.fraction(), None);
    }
}
