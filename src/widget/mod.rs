//! Widget runtime: display instances driven by calculated settings.
//!
//! A widget consumes the values its calculated settings evaluate to and
//! renders them (here, holds them as typed display state). Widgets never
//! talk to datasources directly; the dashboard evaluates expressions and
//! forwards results through `on_calculated_value_changed`. Interactive
//! widgets emit [`WidgetEvent`]s back through an [`EventSink`].

pub mod builtin;

mod model;


pub use model::WidgetModel;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::plugin::SettingsMap;

/// An action a widget asks the dashboard to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Push a value upstream into the named datasource.
    Write {
        datasource_name: String,
        value: Value,
    },
}

/// Handle a widget instance uses to request dashboard actions.
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<WidgetEvent>,
}

impl EventSink {
    pub(crate) fn new(tx: mpsc::UnboundedSender<WidgetEvent>) -> Self {
        Self { tx }
    }

    /// Ask the dashboard to write a value to a datasource.
    pub fn write(&self, datasource_name: impl Into<String>, value: Value) {
        let _ = self.tx.send(WidgetEvent::Write {
            datasource_name: datasource_name.into(),
            value,
        });
    }
}

/// Uniform contract for widget runtime variants.
///
/// All methods are synchronous; widgets hold display state and never do
/// I/O of their own. Instances are exclusively owned by one
/// [`WidgetModel`].
pub trait WidgetInstance: Send {
    /// The full settings map changed. Non-calculated settings (titles,
    /// units, thresholds) take effect here; calculated values arrive
    /// separately.
    fn on_settings_changed(&mut self, settings: &SettingsMap);

    /// A calculated setting produced a new value.
    fn on_calculated_value_changed(&mut self, setting_name: &str, value: Value);

    /// Vertical size in layout blocks. Most widgets occupy one block.
    fn height_blocks(&self) -> u32 {
        1
    }

    /// The hosting cell was resized. Widgets that precompute geometry
    /// react here; the default does nothing.
    fn on_size_changed(&mut self) {}

    /// User interaction (a toggle click, a button press) reached the
    /// widget. The default ignores it.
    fn handle_input(&mut self, _input: Value) {}

    /// Release any held state. No event may be emitted after this.
    fn on_dispose(&mut self) {}
}
