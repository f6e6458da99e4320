//! The built-in widget set.

mod gauge;
mod html;
mod indicator;
mod sparkline;
mod text;
mod toggle_switch;

pub use gauge::gauge_plugin;
pub use html::html_plugin;
pub use indicator::indicator_plugin;
pub use sparkline::sparkline_plugin;
pub use text::text_plugin;
pub use toggle_switch::toggle_switch_plugin;

use serde_json::Value;

use crate::plugin::WidgetPlugin;

/// Every built-in widget plugin, for registry seeding.
pub fn all() -> Vec<WidgetPlugin> {
    vec![
        text_plugin(),
        gauge_plugin(),
        sparkline_plugin(),
        indicator_plugin(),
        toggle_switch_plugin(),
        html_plugin(),
    ]
}

/// Loose truthiness matching how calculated values drive on/off widgets:
/// null, false, zero, and the empty string are off, everything else on.
pub(crate) fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Render a calculated value for textual display.
pub(crate) fn display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
