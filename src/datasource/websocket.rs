//! WebSocket push datasource: every received JSON message becomes a
//! payload, and `write_now` sends values upstream as text frames.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::plugin::{
    f64_setting, required_str_setting, str_setting, DatasourcePlugin, PluginError, SettingDef,
    SettingKind, SettingsMap,
};

use super::{DatasourceError, DatasourceInstance, UpdateSender};

const DEFAULT_RECONNECT_SECONDS: f64 = 5.0;

/// Plugin descriptor for the `websocket` datasource type.
pub fn websocket_plugin() -> DatasourcePlugin {
    DatasourcePlugin::new(
        "websocket",
        vec![
            SettingDef::new("url", SettingKind::Text)
                .display_name("WebSocket URL")
                .description("ws:// or wss:// endpoint emitting JSON messages")
                .required(),
            SettingDef::new("reconnect", SettingKind::Number)
                .display_name("Reconnect After")
                .suffix("seconds")
                .default_value(json!(DEFAULT_RECONNECT_SECONDS)),
        ],
        Box::new(|settings, sender| {
            let source = WebSocketSource::new(settings, sender)?;
            Ok(Box::new(source) as Box<dyn DatasourceInstance>)
        }),
    )
    .display_name("WebSocket")
    .description("Subscribes to a WebSocket feed and supports write-back")
}

pub(crate) struct WebSocketSource {
    sender: UpdateSender,
    url: String,
    reconnect: Duration,
    outbound: mpsc::UnboundedSender<String>,
    connection: Option<JoinHandle<()>>,
    connection_cancel: CancellationToken,
}

impl WebSocketSource {
    pub(crate) fn new(settings: SettingsMap, sender: UpdateSender) -> Result<Self, PluginError> {
        let url = required_str_setting(&settings, "websocket", "url")?;
        let reconnect = Duration::from_secs_f64(
            f64_setting(&settings, "reconnect")
                .unwrap_or(DEFAULT_RECONNECT_SECONDS)
                .max(0.5),
        );

        let (outbound, _discarded) = mpsc::unbounded_channel();
        let mut source = Self {
            sender,
            url,
            reconnect,
            outbound,
            connection: None,
            connection_cancel: CancellationToken::new(),
        };
        source.connect();
        Ok(source)
    }

    fn connect(&mut self) {
        self.connection_cancel.cancel();
        if let Some(connection) = self.connection.take() {
            connection.abort();
        }

        let cancel = self.sender.cancellation().child_token();
        self.connection_cancel = cancel.clone();
        let sender = self.sender.clone();
        let url = self.url.clone();
        let reconnect = self.reconnect;

        // Each (re)connection consumes the outbound receiver; a fresh
        // channel replaces it so write_now keeps working across restarts.
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<String>();
        self.outbound = outbound;

        self.connection = Some(tokio::spawn(async move {
            loop {
                let stream = tokio::select! {
                    _ = cancel.cancelled() => return,
                    connected = connect_async(url.as_str()) => connected,
                };

                let mut socket = match stream {
                    Ok((socket, _response)) => socket,
                    Err(error) => {
                        sender.send_error(format!("websocket connect failed: {}", error));
                        tokio::select! {
                            _ = cancel.cancelled() => return,
                            _ = tokio::time::sleep(reconnect) => continue,
                        }
                    }
                };

                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            let _ = socket.close(None).await;
                            return;
                        }
                        outgoing = outbound_rx.recv() => {
                            if let Some(text) = outgoing {
                                if let Err(error) = socket.send(Message::Text(text)).await {
                                    sender.send_error(format!("websocket send failed: {}", error));
                                }
                            }
                        }
                        incoming = socket.next() => match incoming {
                            Some(Ok(Message::Text(text))) => {
                                match serde_json::from_str::<Value>(&text) {
                                    Ok(payload) => sender.send(payload),
                                    // Non-JSON frames pass through as strings
                                    Err(_) => sender.send(Value::String(text)),
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(error)) => {
                                sender.send_error(format!("websocket error: {}", error));
                                break;
                            }
                        },
                    }
                }

                // Connection dropped; wait and reconnect
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(reconnect) => {}
                }
            }
        }));
    }
}

#[async_trait]
impl DatasourceInstance for WebSocketSource {
    async fn update_now(&mut self) {
        // Push-driven; nothing to poll. A dropped connection is restarted.
        if self
            .connection
            .as_ref()
            .map(|task| task.is_finished())
            .unwrap_or(true)
        {
            self.connect();
        }
    }

    async fn on_settings_changed(&mut self, settings: SettingsMap) {
        if let Some(url) = str_setting(&settings, "url") {
            self.url = url.to_string();
        }
        if let Some(reconnect) = f64_setting(&settings, "reconnect") {
            self.reconnect = Duration::from_secs_f64(reconnect.max(0.5));
        }
        self.connect();
    }

    fn on_dispose(&mut self) {
        self.connection_cancel.cancel();
        if let Some(connection) = self.connection.take() {
            connection.abort();
        }
    }

    async fn write_now(&mut self, value: Value) -> Result<(), DatasourceError> {
        let text = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        self.outbound
            .send(text)
            .map_err(|_| DatasourceError::WebSocket("connection task stopped".to_string()))
    }

    fn supports_write(&self) -> bool {
        true
    }
}
