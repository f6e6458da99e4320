//! Plugin descriptors and the explicit plugin registry.
//!
//! Datasource and widget variants are described by plugin records holding a
//! type name, a settings schema, and a constructor. The registry is plain
//! owned state populated at startup, before any dashboard loads; nothing in
//! the engine reaches for module-level globals.

mod error;
mod loader;
mod registry;


pub use error::PluginError;
pub use loader::{NoopPluginLoader, PluginLoader};
pub use registry::PluginRegistry;

use serde_json::Value;

use crate::datasource::{DatasourceInstance, UpdateSender};
use crate::widget::{EventSink, WidgetInstance};

/// Settings for one plugin instance, keyed by setting name.
pub type SettingsMap = serde_json::Map<String, Value>;

/// The taxonomy of setting types. Only `Calculated` settings participate in
/// expression compilation and dependency tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingKind {
    Text,
    Number,
    Boolean,
    Option,
    Array,
    Calculated,
}

/// One choice for an `Option`-kind setting.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingOption {
    pub name: String,
    pub value: Value,
}

/// Schema entry for a single plugin setting.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub kind: SettingKind,
    pub default_value: Option<Value>,
    pub required: bool,
    pub options: Vec<SettingOption>,
    /// Calculated settings that accept several expressions (one per series).
    pub multi_input: bool,
    /// Whether the settings editor lets the user change this value.
    pub configurable: bool,
    pub visible: bool,
    /// Nested schema for `Array`-kind settings.
    pub sub_settings: Vec<SettingDef>,
    pub suffix: Option<String>,
}

impl SettingDef {
    pub fn new(name: impl Into<String>, kind: SettingKind) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: None,
            kind,
            default_value: None,
            required: false,
            options: Vec::new(),
            multi_input: false,
            configurable: true,
            visible: true,
            sub_settings: Vec::new(),
            suffix: None,
        }
    }

    pub fn display_name(mut self, value: impl Into<String>) -> Self {
        self.display_name = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn multi_input(mut self) -> Self {
        self.multi_input = true;
        self
    }

    pub fn options(mut self, options: Vec<SettingOption>) -> Self {
        self.options = options;
        self
    }

    pub fn sub_settings(mut self, sub: Vec<SettingDef>) -> Self {
        self.sub_settings = sub;
        self
    }

    pub fn suffix(mut self, value: impl Into<String>) -> Self {
        self.suffix = Some(value.into());
        self
    }
}

type DatasourceConstructor = Box<
    dyn Fn(SettingsMap, UpdateSender) -> Result<Box<dyn DatasourceInstance>, PluginError>
        + Send
        + Sync,
>;

type WidgetConstructor = Box<
    dyn Fn(SettingsMap, EventSink) -> Result<Box<dyn WidgetInstance>, PluginError> + Send + Sync,
>;

/// A registered datasource variant.
pub struct DatasourcePlugin {
    pub type_name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    /// Script URLs that must be resolved before this plugin is usable.
    pub external_scripts: Vec<String>,
    pub settings: Vec<SettingDef>,
    pub(crate) constructor: DatasourceConstructor,
}

impl DatasourcePlugin {
    pub fn new(
        type_name: impl Into<String>,
        settings: Vec<SettingDef>,
        constructor: DatasourceConstructor,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            display_name: None,
            description: None,
            external_scripts: Vec::new(),
            settings,
            constructor,
        }
    }

    pub fn display_name(mut self, value: impl Into<String>) -> Self {
        self.display_name = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }
}

/// A registered widget variant.
pub struct WidgetPlugin {
    pub type_name: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub external_scripts: Vec<String>,
    /// Whether instances may fill their entire pane cell.
    pub fill_size: bool,
    pub settings: Vec<SettingDef>,
    pub(crate) constructor: WidgetConstructor,
}

impl WidgetPlugin {
    pub fn new(
        type_name: impl Into<String>,
        settings: Vec<SettingDef>,
        constructor: WidgetConstructor,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            display_name: None,
            description: None,
            external_scripts: Vec::new(),
            fill_size: false,
            settings,
            constructor,
        }
    }

    pub fn display_name(mut self, value: impl Into<String>) -> Self {
        self.display_name = Some(value.into());
        self
    }

    pub fn description(mut self, value: impl Into<String>) -> Self {
        self.description = Some(value.into());
        self
    }

    pub fn fill_size(mut self, value: bool) -> Self {
        self.fill_size = value;
        self
    }
}

/// Type name plus display name, for listing available plugins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginType {
    pub name: String,
    pub display_name: String,
}

// Typed accessors over a SettingsMap. Settings arrive as arbitrary JSON;
// these tolerate the loose typing saved documents exhibit (numbers saved
// as strings and vice versa).

pub fn str_setting<'a>(settings: &'a SettingsMap, name: &str) -> Option<&'a str> {
    settings.get(name).and_then(Value::as_str)
}

/// A required string setting. Absence is a missing-setting error; a value
/// of any other JSON type is a construction error naming the offender.
pub fn required_str_setting(
    settings: &SettingsMap,
    plugin: &str,
    name: &str,
) -> Result<String, PluginError> {
    match settings.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(PluginError::Construction {
            plugin: plugin.to_string(),
            message: format!("setting '{}' must be a string, got {}", name, other),
        }),
        None => Err(PluginError::MissingSetting {
            plugin: plugin.to_string(),
            setting: name.to_string(),
        }),
    }
}

pub fn f64_setting(settings: &SettingsMap, name: &str) -> Option<f64> {
    match settings.get(name) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

pub fn bool_setting(settings: &SettingsMap, name: &str) -> Option<bool> {
    match settings.get(name) {
        Some(Value::Bool(b)) => Some(*b),
        Some(Value::String(s)) => match s.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
