//! The plugin registry: owned maps of datasource and widget plugin types.

use std::collections::HashMap;

use crate::datasource::{DatasourceInstance, UpdateSender};
use crate::widget::{EventSink, WidgetInstance};

use super::{
    DatasourcePlugin, PluginError, PluginType, SettingDef, SettingsMap, WidgetPlugin,
};

/// Registry of available datasource and widget plugin types.
///
/// Owned by the dashboard; populated at startup before any dashboard
/// document loads. Registration is the only mutation.
#[derive(Default)]
pub struct PluginRegistry {
    datasources: HashMap<String, DatasourcePlugin>,
    widgets: HashMap<String, WidgetPlugin>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with every built-in plugin.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();

        for plugin in [
            crate::datasource::json_plugin(),
            crate::datasource::clock_plugin(),
            crate::datasource::playback_plugin(),
            crate::datasource::websocket_plugin(),
        ] {
            registry
                .register_datasource(plugin)
                .expect("built-in datasource types are distinct");
        }

        for plugin in crate::widget::builtin::all() {
            registry
                .register_widget(plugin)
                .expect("built-in widget types are distinct");
        }

        registry
    }

    /// Register a datasource plugin type.
    ///
    /// # Errors
    ///
    /// Returns `PluginError::DuplicateType` if the type name is taken.
    pub fn register_datasource(&mut self, plugin: DatasourcePlugin) -> Result<(), PluginError> {
        if self.datasources.contains_key(&plugin.type_name) {
            return Err(PluginError::DuplicateType(plugin.type_name.clone()));
        }
        self.datasources.insert(plugin.type_name.clone(), plugin);
        Ok(())
    }

    /// Register a widget plugin type.
    pub fn register_widget(&mut self, plugin: WidgetPlugin) -> Result<(), PluginError> {
        if self.widgets.contains_key(&plugin.type_name) {
            return Err(PluginError::DuplicateType(plugin.type_name.clone()));
        }
        self.widgets.insert(plugin.type_name.clone(), plugin);
        Ok(())
    }

    pub fn datasource(&self, type_name: &str) -> Option<&DatasourcePlugin> {
        self.datasources.get(type_name)
    }

    pub fn widget(&self, type_name: &str) -> Option<&WidgetPlugin> {
        self.widgets.get(type_name)
    }

    /// Available datasource types, sorted by type name.
    pub fn datasource_types(&self) -> Vec<PluginType> {
        let mut types: Vec<_> = self.datasources.values().map(plugin_type_ds).collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }

    /// Available widget types, sorted by type name.
    pub fn widget_types(&self) -> Vec<PluginType> {
        let mut types: Vec<_> = self.widgets.values().map(plugin_type_widget).collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        types
    }

    /// Instantiate a datasource. Defaults from the schema are filled into
    /// missing settings first; required settings without a value fail.
    pub fn create_datasource(
        &self,
        type_name: &str,
        mut settings: SettingsMap,
        sender: UpdateSender,
    ) -> Result<(Box<dyn DatasourceInstance>, SettingsMap), PluginError> {
        let plugin = self
            .datasources
            .get(type_name)
            .ok_or_else(|| PluginError::UnknownDatasourceType(type_name.to_string()))?;

        apply_defaults(&plugin.settings, &mut settings, type_name)?;
        let instance = (plugin.constructor)(settings.clone(), sender)?;
        Ok((instance, settings))
    }

    /// Instantiate a widget. Same default/required handling as datasources.
    pub fn create_widget(
        &self,
        type_name: &str,
        mut settings: SettingsMap,
        sink: EventSink,
    ) -> Result<(Box<dyn WidgetInstance>, SettingsMap), PluginError> {
        let plugin = self
            .widgets
            .get(type_name)
            .ok_or_else(|| PluginError::UnknownWidgetType(type_name.to_string()))?;

        apply_defaults(&plugin.settings, &mut settings, type_name)?;
        let instance = (plugin.constructor)(settings.clone(), sink)?;
        Ok((instance, settings))
    }
}

fn plugin_type_ds(plugin: &DatasourcePlugin) -> PluginType {
    PluginType {
        name: plugin.type_name.clone(),
        display_name: plugin
            .display_name
            .clone()
            .unwrap_or_else(|| plugin.type_name.clone()),
    }
}

fn plugin_type_widget(plugin: &WidgetPlugin) -> PluginType {
    PluginType {
        name: plugin.type_name.clone(),
        display_name: plugin
            .display_name
            .clone()
            .unwrap_or_else(|| plugin.type_name.clone()),
    }
}

fn apply_defaults(
    schema: &[SettingDef],
    settings: &mut SettingsMap,
    plugin: &str,
) -> Result<(), PluginError> {
    for def in schema {
        if settings.contains_key(&def.name) {
            continue;
        }
        if let Some(default) = &def.default_value {
            settings.insert(def.name.clone(), default.clone());
        } else if def.required {
            return Err(PluginError::MissingSetting {
                plugin: plugin.to_string(),
                setting: def.name.clone(),
            });
        }
    }
    Ok(())
}
