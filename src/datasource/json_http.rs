//! HTTP polling datasource with staged connection fallback.
//!
//! Stage 0 issues the request exactly as configured (method, body,
//! headers). Stage 1 retries as a bare GET with no custom body or headers.
//! Stage 2, enabled by the `use_proxy` setting, routes the URL through a
//! CORS relay proxy. Failures advance the stage only until the first
//! success; after that the stage is locked and earlier stages are never
//! retried. A settings change resets the machine and polls immediately.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::plugin::{
    bool_setting, f64_setting, required_str_setting, str_setting, DatasourcePlugin, PluginError,
    SettingDef, SettingKind, SettingOption, SettingsMap,
};

use super::{DatasourceError, DatasourceInstance, UpdateSender};

const DEFAULT_REFRESH_SECONDS: f64 = 5.0;
const DEFAULT_PROXY_URL: &str = "https://thingproxy.freeboard.io";

/// Plugin descriptor for the `JSON` datasource type.
pub fn json_plugin() -> DatasourcePlugin {
    DatasourcePlugin::new(
        "JSON",
        vec![
            SettingDef::new("url", SettingKind::Text)
                .display_name("URL")
                .required(),
            SettingDef::new("use_proxy", SettingKind::Boolean)
                .display_name("Try relay proxy")
                .description(
                    "A direct connection is tried first, then a plain GET. \
                     If both fail, route the request through a relay proxy.",
                )
                .default_value(json!(true)),
            SettingDef::new("proxy_url", SettingKind::Text)
                .display_name("Proxy URL")
                .default_value(json!(DEFAULT_PROXY_URL)),
            SettingDef::new("refresh", SettingKind::Number)
                .display_name("Refresh Every")
                .suffix("seconds")
                .default_value(json!(DEFAULT_REFRESH_SECONDS)),
            SettingDef::new("method", SettingKind::Option)
                .display_name("Method")
                .options(
                    ["GET", "POST", "PUT", "DELETE"]
                        .into_iter()
                        .map(|m| SettingOption {
                            name: m.to_string(),
                            value: json!(m),
                        })
                        .collect(),
                ),
            SettingDef::new("body", SettingKind::Text)
                .display_name("Body")
                .description("Request body, normally only used with POST"),
            SettingDef::new("headers", SettingKind::Array)
                .display_name("Headers")
                .sub_settings(vec![
                    SettingDef::new("name", SettingKind::Text).display_name("Name"),
                    SettingDef::new("value", SettingKind::Text).display_name("Value"),
                ]),
        ],
        Box::new(|settings, sender| {
            let source = JsonSource::new(settings, sender)?;
            Ok(Box::new(source) as Box<dyn DatasourceInstance>)
        }),
    )
    .display_name("JSON")
    .description("Polls a URL returning JSON")
}

#[derive(Debug, Clone)]
struct JsonSettings {
    url: String,
    method: String,
    body: Option<String>,
    headers: Vec<(String, String)>,
    refresh: Duration,
    use_proxy: bool,
    proxy_url: String,
}

impl JsonSettings {
    fn parse(settings: &SettingsMap) -> Result<Self, PluginError> {
        let url = required_str_setting(settings, "JSON", "url")?;

        let headers = settings
            .get("headers")
            .and_then(Value::as_array)
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| {
                        let name = entry.get("name")?.as_str()?;
                        let value = entry.get("value")?.as_str()?;
                        Some((name.to_string(), value.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            url,
            method: str_setting(settings, "method").unwrap_or("GET").to_string(),
            body: str_setting(settings, "body").map(str::to_string),
            headers,
            refresh: Duration::from_secs_f64(
                f64_setting(settings, "refresh")
                    .unwrap_or(DEFAULT_REFRESH_SECONDS)
                    .max(0.1),
            ),
            use_proxy: bool_setting(settings, "use_proxy").unwrap_or(true),
            proxy_url: str_setting(settings, "proxy_url")
                .unwrap_or(DEFAULT_PROXY_URL)
                .to_string(),
        })
    }
}

struct Shared {
    client: reqwest::Client,
    sender: UpdateSender,
    settings: Mutex<JsonSettings>,
    /// 0 = as configured, 1 = plain GET, 2 = relay proxy
    stage: AtomicU8,
    /// Set on first success; earlier stages are never revisited.
    stage_locked: AtomicBool,
}

impl Shared {
    async fn poll(self: &Arc<Self>) {
        let mut stage = self.stage.load(Ordering::SeqCst);
        loop {
            let settings = self
                .settings
                .lock()
                .expect("settings mutex poisoned")
                .clone();

            // Exhausted every stage; stay quiet until settings change.
            if (stage > 1 && !settings.use_proxy) || stage > 2 {
                return;
            }

            match self.request(&settings, stage).await {
                Ok(payload) => {
                    self.stage_locked.store(true, Ordering::SeqCst);
                    self.sender.send(payload);
                    return;
                }
                Err(error) => {
                    tracing::debug!(
                        datasource = self.sender.name(),
                        stage,
                        %error,
                        "poll failed"
                    );
                    self.sender.send_error(error.to_string());
                    if self.stage_locked.load(Ordering::SeqCst) {
                        return;
                    }
                    stage += 1;
                    self.stage.store(stage, Ordering::SeqCst);
                }
            }
        }
    }

    async fn request(&self, settings: &JsonSettings, stage: u8) -> Result<Value, DatasourceError> {
        let response = match stage {
            0 => {
                let method = settings
                    .method
                    .parse::<reqwest::Method>()
                    .unwrap_or(reqwest::Method::GET);
                let mut request = self.client.request(method, &settings.url);
                for (name, value) in &settings.headers {
                    request = request.header(name, value);
                }
                if let Some(body) = &settings.body {
                    request = request.body(body.clone());
                }
                request.send().await?
            }
            1 => self.client.get(&settings.url).send().await?,
            _ => {
                let relayed = format!(
                    "{}/fetch/{}",
                    settings.proxy_url.trim_end_matches('/'),
                    urlencoding::encode(&settings.url)
                );
                self.client.get(relayed).send().await?
            }
        };

        let response = response.error_for_status()?;
        let payload = response
            .json::<Value>()
            .await
            .map_err(|e| DatasourceError::InvalidPayload(e.to_string()))?;
        Ok(payload)
    }
}

/// The `JSON` HTTP-poll datasource instance.
pub(crate) struct JsonSource {
    shared: Arc<Shared>,
    timer: Option<JoinHandle<()>>,
    timer_cancel: CancellationToken,
}

impl JsonSource {
    pub(crate) fn new(settings: SettingsMap, sender: UpdateSender) -> Result<Self, PluginError> {
        let parsed = JsonSettings::parse(&settings)?;
        let shared = Arc::new(Shared {
            client: reqwest::Client::new(),
            sender,
            settings: Mutex::new(parsed),
            stage: AtomicU8::new(0),
            stage_locked: AtomicBool::new(false),
        });

        let mut source = Self {
            shared,
            timer: None,
            timer_cancel: CancellationToken::new(),
        };
        source.reschedule();
        Ok(source)
    }

    fn reschedule(&mut self) {
        self.timer_cancel.cancel();
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let cancel = self.shared.sender.cancellation().child_token();
        self.timer_cancel = cancel.clone();

        let shared = Arc::clone(&self.shared);
        let refresh = shared
            .settings
            .lock()
            .expect("settings mutex poisoned")
            .refresh;

        self.timer = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(refresh);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await; // consume the immediate first tick
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => shared.poll().await,
                }
            }
        }));
    }
}

#[async_trait]
impl DatasourceInstance for JsonSource {
    async fn update_now(&mut self) {
        self.shared.poll().await;
    }

    async fn on_settings_changed(&mut self, settings: SettingsMap) {
        match JsonSettings::parse(&settings) {
            Ok(parsed) => {
                *self.shared.settings.lock().expect("settings mutex poisoned") = parsed;
            }
            Err(error) => {
                tracing::warn!(
                    datasource = self.shared.sender.name(),
                    %error,
                    "rejected settings update"
                );
                return;
            }
        }
        self.shared.stage.store(0, Ordering::SeqCst);
        self.shared.stage_locked.store(false, Ordering::SeqCst);
        self.reschedule();
        self.update_now().await;
    }

    fn on_dispose(&mut self) {
        self.timer_cancel.cancel();
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
