//! Datasource runtime and registry-entry model.
//!
//! A datasource is a named external feed producing JSON payloads. Each
//! variant owns its own refresh timer or socket and pushes payloads through
//! an [`UpdateSender`] into the dashboard's event loop. The uniform
//! lifecycle is create, update-now, settings-changed, dispose; variants
//! that can push values upstream additionally implement `write_now`.

mod clock;
mod entry;
mod error;
mod json_http;
mod playback;
mod websocket;

#[cfg(test)]
mod tests;

pub use clock::clock_plugin;
pub use entry::DatasourceModel;
pub use error::DatasourceError;
pub use json_http::json_plugin;
pub use playback::playback_plugin;
pub use websocket::websocket_plugin;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::plugin::SettingsMap;

/// An update or failure emitted by a datasource instance.
#[derive(Debug, Clone)]
pub enum DatasourceEvent {
    /// A new payload arrived for the named datasource.
    Update { name: String, payload: Value },
    /// A transport-level failure. Never fatal; the instance keeps retrying
    /// per its own policy and the dashboard records the message.
    Error { name: String, message: String },
}

/// Handle a datasource instance uses to deliver payloads.
///
/// The sender is bound to one instance generation: once the owning entry
/// disposes the instance and cancels the token, sends become no-ops, so a
/// straggling timer tick can never leak a payload past disposal.
#[derive(Clone)]
pub struct UpdateSender {
    name: String,
    tx: mpsc::UnboundedSender<DatasourceEvent>,
    cancel: CancellationToken,
}

impl UpdateSender {
    pub(crate) fn new(
        name: String,
        tx: mpsc::UnboundedSender<DatasourceEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self { name, tx, cancel }
    }

    /// The name of the datasource this sender belongs to.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deliver a payload. Silently dropped after dispose.
    pub fn send(&self, payload: Value) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.tx.send(DatasourceEvent::Update {
            name: self.name.clone(),
            payload,
        });
    }

    /// Report a transport failure. Silently dropped after dispose.
    pub fn send_error(&self, message: impl Into<String>) {
        if self.cancel.is_cancelled() {
            return;
        }
        let _ = self.tx.send(DatasourceEvent::Error {
            name: self.name.clone(),
            message: message.into(),
        });
    }

    /// Token cancelled when the owning instance is disposed. Background
    /// tasks spawned by an instance must select on this.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Uniform lifecycle contract for datasource runtime variants.
///
/// Object-safe; instances are stored as `Box<dyn DatasourceInstance>` and
/// exclusively owned by one registry entry. All methods are called from the
/// dashboard's single control task.
#[async_trait]
pub trait DatasourceInstance: Send {
    /// Trigger an immediate fetch/read. On success the instance delivers
    /// the payload through its [`UpdateSender`]; failures are handled by
    /// the variant's own retry policy and never propagate.
    async fn update_now(&mut self);

    /// Apply new settings without recreating the instance. Any fallback
    /// stage is reset, the refresh timer is rescheduled, and an immediate
    /// update follows.
    async fn on_settings_changed(&mut self, settings: SettingsMap);

    /// Stop all timers and sockets. No update may be delivered after this
    /// returns; the owning entry cancels the sender's token first, which
    /// makes that guarantee hold even for in-flight wakeups.
    fn on_dispose(&mut self);

    /// Push a value upstream. Only meaningful for variants that report
    /// `supports_write`.
    async fn write_now(&mut self, _value: Value) -> Result<(), DatasourceError> {
        Err(DatasourceError::WriteUnsupported)
    }

    fn supports_write(&self) -> bool {
        false
    }
}
