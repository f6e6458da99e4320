//! The widget model: calculated-setting wiring around a widget instance.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::expr::CompiledSetting;
use crate::plugin::{PluginError, PluginRegistry, SettingKind, SettingsMap};

use super::{EventSink, WidgetInstance};

/// A widget slot on a pane.
///
/// Owns the display instance plus the compiled form of every calculated
/// setting and the reverse index from datasource name to the settings
/// that read it. When a datasource updates, only the settings listed for
/// it are re-evaluated.
pub struct WidgetModel {
    title: String,
    type_name: String,
    settings: SettingsMap,
    fill_size: bool,
    instance: Option<Box<dyn WidgetInstance>>,
    compiled: HashMap<String, CompiledSetting>,
    refresh_notifications: HashMap<String, Vec<String>>,
    sink: EventSink,
}

impl WidgetModel {
    pub fn new(sink: EventSink) -> Self {
        Self {
            title: String::new(),
            type_name: String::new(),
            settings: SettingsMap::new(),
            fill_size: false,
            instance: None,
            compiled: HashMap::new(),
            refresh_notifications: HashMap::new(),
            sink,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn settings(&self) -> &SettingsMap {
        &self.settings
    }

    pub fn fill_size(&self) -> bool {
        self.fill_size
    }

    pub fn is_instantiated(&self) -> bool {
        self.instance.is_some()
    }

    /// Datasource names this widget's calculated settings depend on.
    pub fn depends_on(&self) -> Vec<&str> {
        self.refresh_notifications.keys().map(String::as_str).collect()
    }

    /// Switch the slot to a new plugin type.
    ///
    /// The current instance is disposed before the replacement is
    /// constructed. Calculated settings are compiled and immediately
    /// evaluated against the current datasource data.
    pub fn set_type(
        &mut self,
        registry: &PluginRegistry,
        type_name: &str,
        settings: SettingsMap,
        data: &Map<String, Value>,
    ) -> Result<(), PluginError> {
        self.dispose();

        let plugin = registry
            .widget(type_name)
            .ok_or_else(|| PluginError::UnknownWidgetType(type_name.to_string()))?;
        let fill_size = plugin.fill_size;

        let (instance, settings) =
            registry.create_widget(type_name, settings, self.sink.clone())?;

        self.type_name = type_name.to_string();
        self.settings = settings;
        self.fill_size = fill_size;
        self.instance = Some(instance);
        self.update_calculated_settings(registry, data);
        Ok(())
    }

    /// Apply a new settings map to the existing instance.
    pub fn set_settings(
        &mut self,
        registry: &PluginRegistry,
        settings: SettingsMap,
        data: &Map<String, Value>,
    ) {
        self.settings = settings;
        if let Some(instance) = &mut self.instance {
            instance.on_settings_changed(&self.settings);
            instance.on_size_changed();
        }
        self.update_calculated_settings(registry, data);
    }

    /// Rebuild every compiled setting and the datasource reverse index,
    /// then evaluate each calculated setting once against current data.
    ///
    /// A full rebuild on any settings change keeps the index trivially
    /// consistent; widget settings maps are small.
    fn update_calculated_settings(
        &mut self,
        registry: &PluginRegistry,
        data: &Map<String, Value>,
    ) {
        self.compiled.clear();
        self.refresh_notifications.clear();

        let Some(plugin) = registry.widget(&self.type_name) else {
            return;
        };

        for def in &plugin.settings {
            if def.kind != SettingKind::Calculated {
                continue;
            }
            let Some(raw) = self.settings.get(&def.name) else {
                continue;
            };

            let compiled = if def.multi_input {
                match raw {
                    Value::Array(parts) => CompiledSetting::compile_multi(parts),
                    other => match CompiledSetting::compile_value(other) {
                        Some(compiled) => compiled,
                        None => continue,
                    },
                }
            } else {
                match CompiledSetting::compile_value(raw) {
                    Some(compiled) => compiled,
                    None => continue,
                }
            };

            for dependency in compiled.dependencies() {
                let listeners = self
                    .refresh_notifications
                    .entry(dependency.clone())
                    .or_default();
                if !listeners.contains(&def.name) {
                    listeners.push(def.name.clone());
                }
            }
            self.compiled.insert(def.name.clone(), compiled);
        }

        let names: Vec<String> = self.compiled.keys().cloned().collect();
        for name in names {
            self.process_calculated_setting(&name, data);
        }
    }

    /// Re-evaluate the settings that read the named datasource.
    pub fn process_datasource_update(&mut self, datasource: &str, data: &Map<String, Value>) {
        let Some(settings) = self.refresh_notifications.get(datasource).cloned() else {
            return;
        };
        for setting in settings {
            self.process_calculated_setting(&setting, data);
        }
    }

    /// Evaluate one compiled setting and forward the result.
    ///
    /// No value (an undefined result) forwards nothing, so a widget keeps
    /// showing its previous value. Evaluation errors are swallowed after
    /// tracing; a broken expression must not take the dashboard down.
    fn process_calculated_setting(&mut self, setting: &str, data: &Map<String, Value>) {
        let Some(compiled) = self.compiled.get(setting) else {
            return;
        };
        match compiled.evaluate(data) {
            Ok(Some(value)) => {
                if let Some(instance) = &mut self.instance {
                    instance.on_calculated_value_changed(setting, value);
                }
            }
            Ok(None) => {}
            Err(error) => {
                tracing::debug!(widget = %self.type_name, setting, %error, "evaluation failed");
            }
        }
    }

    /// Vertical size in layout blocks.
    pub fn height_blocks(&self) -> u32 {
        self.instance
            .as_ref()
            .map(|i| i.height_blocks())
            .unwrap_or(1)
    }

    /// Forward user interaction to the instance.
    pub fn handle_input(&mut self, input: Value) {
        if let Some(instance) = &mut self.instance {
            instance.handle_input(input);
        }
    }

    pub fn on_size_changed(&mut self) {
        if let Some(instance) = &mut self.instance {
            instance.on_size_changed();
        }
    }

    pub fn dispose(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            instance.on_dispose();
        }
        self.compiled.clear();
        self.refresh_notifications.clear();
    }
}

impl Drop for WidgetModel {
    fn drop(&mut self) {
        self.dispose();
    }
}
