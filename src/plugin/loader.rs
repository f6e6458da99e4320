//! Resolution of external plugin sources referenced by a dashboard.
//!
//! Saved documents may list plugin source URLs whose types must exist
//! before datasource and widget instances are constructed. How a source is
//! turned into registrations is host-specific, so deserialization goes
//! through this seam.

use async_trait::async_trait;

use super::{PluginError, PluginRegistry};

/// Resolves external plugin sources into registry registrations.
///
/// Called by dashboard deserialization with every source listed in the
/// document, before any instance whose type could depend on them is
/// constructed.
#[async_trait]
pub trait PluginLoader: Send + Sync {
    async fn load(
        &self,
        sources: &[String],
        registry: &mut PluginRegistry,
    ) -> Result<(), PluginError>;
}

/// Loader that records the sources and registers nothing. Suitable when
/// every needed type is already built in.
#[derive(Debug, Default)]
pub struct NoopPluginLoader;

#[async_trait]
impl PluginLoader for NoopPluginLoader {
    async fn load(
        &self,
        sources: &[String],
        _registry: &mut PluginRegistry,
    ) -> Result<(), PluginError> {
        for source in sources {
            tracing::debug!(source, "skipping external plugin source");
        }
        Ok(())
    }
}
