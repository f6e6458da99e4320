//! Shared test utilities for Gridboard integration tests.
//!
//! Provides a probe widget that records forwarded calculated values and a
//! push datasource whose payloads the test controls directly.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gridboard::datasource::{DatasourceError, DatasourceInstance, UpdateSender};
use gridboard::plugin::{
    DatasourcePlugin, SettingDef, SettingKind, SettingsMap, WidgetPlugin,
};
use gridboard::widget::WidgetInstance;
use serde_json::Value;

/// Calculated values forwarded to probe widgets, in arrival order.
pub type ProbeLog = Arc<Mutex<Vec<(String, Value)>>>;

struct ProbeWidget {
    log: ProbeLog,
}

impl WidgetInstance for ProbeWidget {
    fn on_settings_changed(&mut self, _settings: &SettingsMap) {}

    fn on_calculated_value_changed(&mut self, setting_name: &str, value: Value) {
        self.log
            .lock()
            .unwrap()
            .push((setting_name.to_string(), value));
    }
}

/// A widget plugin with two calculated settings that records every value
/// forwarded to its instances.
pub fn probe_widget_plugin(log: ProbeLog) -> WidgetPlugin {
    WidgetPlugin::new(
        "probe",
        vec![
            SettingDef::new("value", SettingKind::Calculated),
            SettingDef::new("extra", SettingKind::Calculated),
        ],
        Box::new(move |_settings, _sink| {
            Ok(Box::new(ProbeWidget {
                log: Arc::clone(&log),
            }) as Box<dyn WidgetInstance>)
        }),
    )
}

/// Handle for pushing payloads into a running `push` datasource.
#[derive(Clone, Default)]
pub struct PushHandle {
    sender: Arc<Mutex<Option<UpdateSender>>>,
    pub writes: Arc<Mutex<Vec<Value>>>,
}

impl PushHandle {
    /// Emit a payload as if the datasource produced it.
    pub fn push(&self, payload: Value) {
        self.sender
            .lock()
            .unwrap()
            .as_ref()
            .expect("push datasource not instantiated")
            .send(payload);
    }
}

struct PushSource {
    handle: PushHandle,
}

#[async_trait]
impl DatasourceInstance for PushSource {
    async fn update_now(&mut self) {}

    async fn on_settings_changed(&mut self, _settings: SettingsMap) {}

    fn on_dispose(&mut self) {
        self.handle.sender.lock().unwrap().take();
    }

    async fn write_now(&mut self, value: Value) -> Result<(), DatasourceError> {
        self.handle.writes.lock().unwrap().push(value);
        Ok(())
    }

    fn supports_write(&self) -> bool {
        true
    }
}

/// A datasource plugin that emits only what the test pushes through the
/// handle, and records written values.
pub fn push_datasource_plugin(handle: PushHandle) -> DatasourcePlugin {
    DatasourcePlugin::new(
        "push",
        vec![],
        Box::new(move |_settings, sender| {
            *handle.sender.lock().unwrap() = Some(sender);
            Ok(Box::new(PushSource {
                handle: handle.clone(),
            }) as Box<dyn DatasourceInstance>)
        }),
    )
}
