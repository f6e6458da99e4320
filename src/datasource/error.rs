//! Error types for datasource transports.

use thiserror::Error;

/// Errors raised by datasource transports. These stay inside the
/// datasource layer: the fan-out path only ever sees an optional
/// last-error string on the registry entry.
#[derive(Debug, Error)]
pub enum DatasourceError {
    #[error("HTTP error {0}")]
    Http(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("write not supported by this datasource")]
    WriteUnsupported,

    #[error("datasource has no live instance")]
    NotInstantiated,
}

impl From<reqwest::Error> for DatasourceError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            DatasourceError::Http(status.as_u16())
        } else {
            DatasourceError::Transport(error.to_string())
        }
    }
}
