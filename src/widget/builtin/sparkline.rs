//! Sparkline widget: rolling history of one or more numeric series.

use serde_json::Value;

use crate::plugin::{SettingDef, SettingKind, SettingsMap, WidgetPlugin};
use crate::widget::WidgetInstance;

/// Points kept per series before the oldest are discarded.
const HISTORY_LIMIT: usize = 100;

pub fn sparkline_plugin() -> WidgetPlugin {
    WidgetPlugin::new(
        "sparkline",
        vec![
            SettingDef::new("title", SettingKind::Text).display_name("Title"),
            SettingDef::new("value", SettingKind::Calculated)
                .display_name("Value")
                .multi_input(),
        ],
        Box::new(|_settings, _sink| {
            Ok(Box::new(SparklineWidget::default()) as Box<dyn WidgetInstance>)
        }),
    )
    .display_name("Sparkline")
}

#[derive(Default)]
struct SparklineWidget {
    series: Vec<Vec<f64>>,
}

impl SparklineWidget {
    fn push_sample(&mut self, series: usize, sample: f64) {
        while self.series.len() <= series {
            self.series.push(Vec::new());
        }
        let points = &mut self.series[series];
        points.push(sample);
        if points.len() > HISTORY_LIMIT {
            points.remove(0);
        }
    }
}

impl WidgetInstance for SparklineWidget {
    fn on_settings_changed(&mut self, _settings: &SettingsMap) {
        // A settings change may rebind the series; start the history over.
        self.series.clear();
    }

    fn on_calculated_value_changed(&mut self, setting_name: &str, value: Value) {
        if setting_name != "value" {
            return;
        }
        match value {
            // Multi-input settings arrive as one array, a sample per series
            Value::Array(samples) => {
                for (index, sample) in samples.iter().enumerate() {
                    if let Some(sample) = sample.as_f64() {
                        self.push_sample(index, sample);
                    }
                }
            }
            Value::Number(n) => {
                if let Some(sample) = n.as_f64() {
                    self.push_sample(0, sample);
                }
            }
            _ => {}
        }
    }

    fn height_blocks(&self) -> u32 {
        2
    }
}
