use thiserror::Error;

use crate::datasource::DatasourceError;
use crate::plugin::PluginError;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("a datasource named '{0}' already exists")]
    DuplicateDatasource(String),

    #[error("no datasource named '{0}'")]
    UnknownDatasource(String),

    #[error("document version {0} is newer than this engine supports")]
    UnsupportedVersion(u32),

    #[error("malformed dashboard document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Plugin(#[from] PluginError),

    #[error(transparent)]
    Datasource(#[from] DatasourceError),
}
