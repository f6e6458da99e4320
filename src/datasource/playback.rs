//! File-replay datasource: fetches a JSON array once and replays one
//! element per refresh interval, optionally looping.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::plugin::{
    bool_setting, f64_setting, required_str_setting, DatasourcePlugin, PluginError, SettingDef,
    SettingKind, SettingsMap,
};

use super::{DatasourceError, DatasourceInstance, UpdateSender};

const DEFAULT_REFRESH_SECONDS: f64 = 5.0;

/// Plugin descriptor for the `playback` datasource type.
pub fn playback_plugin() -> DatasourcePlugin {
    DatasourcePlugin::new(
        "playback",
        vec![
            SettingDef::new("datafile", SettingKind::Text)
                .display_name("Data File URL")
                .description("A link to a JSON array of data")
                .required(),
            SettingDef::new("loop", SettingKind::Boolean)
                .display_name("Loop")
                .description("Rewind and loop when finished")
                .default_value(json!(false)),
            SettingDef::new("refresh", SettingKind::Number)
                .display_name("Refresh Every")
                .suffix("seconds")
                .default_value(json!(DEFAULT_REFRESH_SECONDS)),
        ],
        Box::new(|settings, sender| {
            let source = PlaybackSource::new(settings, sender)?;
            Ok(Box::new(source) as Box<dyn DatasourceInstance>)
        }),
    )
    .display_name("Playback")
    .description("Replays a recorded JSON dataset")
}

#[derive(Debug, Clone)]
struct PlaybackSettings {
    datafile: String,
    looping: bool,
    refresh: Duration,
}

impl PlaybackSettings {
    fn parse(settings: &SettingsMap) -> Result<Self, PluginError> {
        Ok(Self {
            datafile: required_str_setting(settings, "playback", "datafile")?,
            looping: bool_setting(settings, "loop").unwrap_or(false),
            refresh: Duration::from_secs_f64(
                f64_setting(settings, "refresh")
                    .unwrap_or(DEFAULT_REFRESH_SECONDS)
                    .max(0.1),
            ),
        })
    }
}

pub(crate) struct PlaybackSource {
    client: reqwest::Client,
    sender: UpdateSender,
    settings: Arc<Mutex<PlaybackSettings>>,
    replay: Option<JoinHandle<()>>,
    replay_cancel: CancellationToken,
}

impl PlaybackSource {
    pub(crate) fn new(settings: SettingsMap, sender: UpdateSender) -> Result<Self, PluginError> {
        let parsed = PlaybackSettings::parse(&settings)?;
        Ok(Self {
            client: reqwest::Client::new(),
            sender,
            settings: Arc::new(Mutex::new(parsed)),
            replay: None,
            replay_cancel: CancellationToken::new(),
        })
    }

    fn stop_replay(&mut self) {
        self.replay_cancel.cancel();
        if let Some(replay) = self.replay.take() {
            replay.abort();
        }
    }

    async fn fetch_dataset(&self) -> Result<Vec<Value>, DatasourceError> {
        let datafile = self
            .settings
            .lock()
            .expect("settings mutex poisoned")
            .datafile
            .clone();
        let response = self.client.get(&datafile).send().await?.error_for_status()?;
        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| DatasourceError::InvalidPayload(e.to_string()))?;
        match payload {
            Value::Array(items) => Ok(items),
            _ => Ok(Vec::new()),
        }
    }

    fn start_replay(&mut self, dataset: Vec<Value>) {
        self.stop_replay();

        let cancel = self.sender.cancellation().child_token();
        self.replay_cancel = cancel.clone();
        let sender = self.sender.clone();
        let settings = Arc::clone(&self.settings);

        self.replay = Some(tokio::spawn(async move {
            if dataset.is_empty() {
                sender.send(json!({}));
                return;
            }

            let mut index = 0;
            loop {
                sender.send(dataset[index].clone());
                index += 1;

                let looping;
                let refresh;
                {
                    let settings = settings.lock().expect("settings mutex poisoned");
                    looping = settings.looping;
                    refresh = settings.refresh;
                }

                if index >= dataset.len() {
                    if !looping {
                        break;
                    }
                    index = 0;
                }

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(refresh) => {}
                }
            }
        }));
    }
}

#[async_trait]
impl DatasourceInstance for PlaybackSource {
    async fn update_now(&mut self) {
        self.stop_replay();
        match self.fetch_dataset().await {
            Ok(dataset) => self.start_replay(dataset),
            Err(error) => {
                tracing::debug!(
                    datasource = self.sender.name(),
                    %error,
                    "failed to fetch playback dataset"
                );
                self.sender.send_error(error.to_string());
            }
        }
    }

    async fn on_settings_changed(&mut self, settings: SettingsMap) {
        match PlaybackSettings::parse(&settings) {
            Ok(parsed) => {
                *self.settings.lock().expect("settings mutex poisoned") = parsed;
                self.update_now().await;
            }
            Err(error) => {
                tracing::warn!(
                    datasource = self.sender.name(),
                    %error,
                    "rejected settings update"
                );
            }
        }
    }

    fn on_dispose(&mut self) {
        self.stop_replay();
    }
}
