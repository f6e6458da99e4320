//! The versioned dashboard document format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pane::PositionMap;
use crate::plugin::SettingsMap;

/// Version written by [`crate::dashboard::Dashboard::serialize`]. Documents
/// with a newer version are rejected; older ones load with defaults for
/// whatever they lack.
pub const SERIALIZATION_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardDocument {
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_image: Option<String>,
    #[serde(default = "default_true")]
    pub allow_edit: bool,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub datasources: Vec<DatasourceDocument>,
    #[serde(default)]
    pub panes: Vec<PaneDocument>,
    /// Column count the board was arranged for. Absent in old documents;
    /// loading one leaves the layout's current count alone.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
}

impl DashboardDocument {
    /// The document's column count, or the engine default when unrecorded.
    pub fn columns_or_default(&self) -> u32 {
        self.columns
            .unwrap_or(crate::layout::GridLayout::DEFAULT_COLUMNS)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasourceDocument {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub settings: SettingsMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaneDocument {
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_one")]
    pub width: u32,
    #[serde(default)]
    pub row: PositionMap,
    #[serde(default)]
    pub col: PositionMap,
    #[serde(default = "default_one")]
    pub col_width: u32,
    #[serde(default)]
    pub widgets: Vec<WidgetDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetDocument {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub settings: SettingsMap,
}

fn default_true() -> bool {
    true
}

fn default_one() -> u32 {
    1
}

/// Rewrite the expression syntax of documents saved before the rename of
/// the datasource namespace: `datasources[` and `datasources.` become
/// `resources[` and `resources.` in every string-valued widget setting.
pub(crate) fn rewrite_legacy_refs(settings: &mut SettingsMap) {
    for value in settings.values_mut() {
        rewrite_value(value);
    }
}

fn rewrite_value(value: &mut Value) {
    match value {
        Value::String(s) => {
            if s.contains("datasources[") || s.contains("datasources.") {
                *s = s
                    .replace("datasources[", "resources[")
                    .replace("datasources.", "resources.");
            }
        }
        // Multi-input settings hold an array of expressions
        Value::Array(items) => {
            for item in items {
                rewrite_value(item);
            }
        }
        _ => {}
    }
}
