//! Engine configuration: grid shape and startup dashboard.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::layout::GridLayout;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid column count used before a document overrides it.
    pub columns: u32,
    /// Dashboard document loaded at startup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dashboard: Option<PathBuf>,
    /// External plugin sources resolved before the dashboard loads.
    pub plugin_sources: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            columns: GridLayout::DEFAULT_COLUMNS,
            dashboard: None,
            plugin_sources: Vec::new(),
        }
    }
}
