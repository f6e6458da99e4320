//! The named registry entry wrapping a datasource instance.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::plugin::{PluginError, PluginRegistry, SettingsMap};

use super::{DatasourceError, DatasourceEvent, DatasourceInstance, UpdateSender};

/// A named datasource slot on a dashboard.
///
/// Owns the running instance together with its bookkeeping: the settings
/// the instance was built with, the timestamp of the last successful
/// update, and the last transport error. Changing the type disposes the
/// old instance and constructs a new one; changing only the settings is
/// forwarded to the live instance without recreation.
pub struct DatasourceModel {
    name: String,
    type_name: String,
    settings: SettingsMap,
    instance: Option<Box<dyn DatasourceInstance>>,
    instance_cancel: CancellationToken,
    tx: mpsc::UnboundedSender<DatasourceEvent>,
    last_updated: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl DatasourceModel {
    pub fn new(name: impl Into<String>, tx: mpsc::UnboundedSender<DatasourceEvent>) -> Self {
        Self {
            name: name.into(),
            type_name: String::new(),
            settings: SettingsMap::new(),
            instance: None,
            instance_cancel: CancellationToken::new(),
            tx,
            last_updated: None,
            last_error: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn settings(&self) -> &SettingsMap {
        &self.settings
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_instantiated(&self) -> bool {
        self.instance.is_some()
    }

    /// Switch the entry to a new plugin type.
    ///
    /// The current instance, if any, is disposed first so its timers stop
    /// before the replacement starts. The new instance performs an
    /// immediate update once constructed.
    pub async fn set_type(
        &mut self,
        registry: &PluginRegistry,
        type_name: &str,
        settings: SettingsMap,
    ) -> Result<(), PluginError> {
        self.dispose();

        let cancel = CancellationToken::new();
        let sender = UpdateSender::new(self.name.clone(), self.tx.clone(), cancel.clone());
        let (mut instance, settings) = registry.create_datasource(type_name, settings, sender)?;
        instance.update_now().await;

        self.type_name = type_name.to_string();
        self.settings = settings;
        self.instance = Some(instance);
        self.instance_cancel = cancel;
        Ok(())
    }

    /// Forward new settings to the live instance without recreating it.
    pub async fn set_settings(&mut self, settings: SettingsMap) {
        self.settings = settings.clone();
        if let Some(instance) = &mut self.instance {
            instance.on_settings_changed(settings).await;
        }
    }

    pub async fn update_now(&mut self) {
        if let Some(instance) = &mut self.instance {
            instance.update_now().await;
        }
    }

    /// Push a value upstream through the instance.
    pub async fn write_now(&mut self, value: Value) -> Result<(), DatasourceError> {
        match &mut self.instance {
            Some(instance) => instance.write_now(value).await,
            None => Err(DatasourceError::NotInstantiated),
        }
    }

    pub fn supports_write(&self) -> bool {
        self.instance
            .as_ref()
            .map(|i| i.supports_write())
            .unwrap_or(false)
    }

    /// Record a successful update delivered through the event loop.
    pub fn record_update(&mut self) {
        self.last_updated = Some(Utc::now());
        self.last_error = None;
    }

    /// Record a transport failure delivered through the event loop.
    pub fn record_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    /// Stop the instance. The cancellation token is cancelled before
    /// `on_dispose` runs, so a timer that already fired cannot deliver a
    /// late payload.
    pub fn dispose(&mut self) {
        self.instance_cancel.cancel();
        if let Some(mut instance) = self.instance.take() {
            instance.on_dispose();
        }
    }
}

impl Drop for DatasourceModel {
    fn drop(&mut self) {
        self.dispose();
    }
}
