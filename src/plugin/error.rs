//! Error types for plugin registration and instantiation.

use thiserror::Error;

/// Errors raised by the plugin registry.
#[derive(Debug, Error)]
pub enum PluginError {
    /// A plugin with the same type name is already registered.
    #[error("duplicate plugin type '{0}'")]
    DuplicateType(String),

    /// No datasource plugin registered under this type name.
    #[error("unknown datasource type '{0}'")]
    UnknownDatasourceType(String),

    /// No widget plugin registered under this type name.
    #[error("unknown widget type '{0}'")]
    UnknownWidgetType(String),

    /// A required setting was absent and has no default.
    #[error("missing required setting '{setting}' for plugin '{plugin}'")]
    MissingSetting { plugin: String, setting: String },

    /// The plugin constructor rejected its settings.
    #[error("failed to construct '{plugin}': {message}")]
    Construction { plugin: String, message: String },

    /// An external plugin source could not be loaded.
    #[error("failed to load plugin source '{url}': {message}")]
    SourceLoad { url: String, message: String },
}
