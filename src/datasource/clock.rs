//! Timer-generated datasource emitting the current time.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use serde_json::{json, Value};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::plugin::{f64_setting, DatasourcePlugin, SettingDef, SettingKind, SettingsMap};

use super::{DatasourceInstance, UpdateSender};

const DEFAULT_REFRESH_SECONDS: f64 = 1.0;

/// Plugin descriptor for the `clock` datasource type.
pub fn clock_plugin() -> DatasourcePlugin {
    DatasourcePlugin::new(
        "clock",
        vec![SettingDef::new("refresh", SettingKind::Number)
            .display_name("Refresh Every")
            .suffix("seconds")
            .default_value(json!(DEFAULT_REFRESH_SECONDS))],
        Box::new(|settings, sender| {
            Ok(Box::new(ClockSource::new(&settings, sender)) as Box<dyn DatasourceInstance>)
        }),
    )
    .display_name("Clock")
    .description("Emits the current date and time on an interval")
}

fn tick_payload() -> Value {
    let now = Local::now();
    json!({
        "numeric_value": now.timestamp_millis(),
        "full_string_value": now.format("%Y-%m-%d %H:%M:%S").to_string(),
        "date_string_value": now.format("%Y-%m-%d").to_string(),
        "time_string_value": now.format("%H:%M:%S").to_string(),
    })
}

pub(crate) struct ClockSource {
    sender: UpdateSender,
    refresh: Duration,
    timer: Option<JoinHandle<()>>,
    timer_cancel: CancellationToken,
}

impl ClockSource {
    pub(crate) fn new(settings: &SettingsMap, sender: UpdateSender) -> Self {
        let mut source = Self {
            sender,
            refresh: refresh_from(settings),
            timer: None,
            timer_cancel: CancellationToken::new(),
        };
        source.reschedule();
        source
    }

    fn reschedule(&mut self) {
        self.timer_cancel.cancel();
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }

        let cancel = self.sender.cancellation().child_token();
        self.timer_cancel = cancel.clone();
        let sender = self.sender.clone();
        let refresh = self.refresh;

        self.timer = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(refresh);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => sender.send(tick_payload()),
                }
            }
        }));
    }
}

fn refresh_from(settings: &SettingsMap) -> Duration {
    Duration::from_secs_f64(
        f64_setting(settings, "refresh")
            .unwrap_or(DEFAULT_REFRESH_SECONDS)
            .max(0.1),
    )
}

#[async_trait]
impl DatasourceInstance for ClockSource {
    async fn update_now(&mut self) {
        self.sender.send(tick_payload());
    }

    async fn on_settings_changed(&mut self, settings: SettingsMap) {
        self.refresh = refresh_from(&settings);
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
