use crate::config::Config;
use crate::events::ControlEvent;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info};

/// Перечитать конфигурацию; невалидная логируется и игнорируется
pub fn reload_config(path: &Path) -> Option<Config> {
    match Config::load(path) {
        Ok(config) => {
            info!("Конфигурация перечитана из {:?}", path);
            Some(config)
        }
        Err(e) => {
            error!("Новая конфигурация отклонена, остаётся прежняя: {:#}", e);
            None
        }
    }
}

/// Отправить контроллеру перечитанную конфигурацию; false, если контроллер остановлен
pub async fn send_reloaded(path: &Path, events_tx: &mpsc::Sender<ControlEvent>) -> bool {
    match reload_config(path) {
        Some(config) => events_tx
            .send(ControlEvent::config_changed(config.cursor))
            .await
            .is_ok(),
        None => true,
    }
}

/// Следит за временем изменения файла конфигурации
pub struct ConfigWatcher {
    path: PathBuf,
    poll_interval: Duration,
    events_tx: mpsc::Sender<ControlEvent>,
    last_modified: Option<SystemTime>,
}

impl ConfigWatcher {
    pub fn new(path: impl Into<PathBuf>, poll_interval: Duration, events_tx: mpsc::Sender<ControlEvent>) -> Self {
        Self {
            path: path.into(),
            poll_interval,
            events_tx,
            last_modified: None,
        }
    }

    pub async fn run(mut self) {
        info!("ConfigWatcher следит за {:?} (интервал {:?})", self.path, self.poll_interval);

        self.last_modified = modified_time(&self.path).await;

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            if !self.check_changed().await {
                continue;
            }

            info!("Файл конфигурации {:?} изменился", self.path);
            if !send_reloaded(&self.path, &self.events_tx).await {
                debug!("Контроллер остановлен, ConfigWatcher завершает работу");
                return;
            }
        }
    }

    /// true, если время изменения файла отличается от запомненного (в том числе появление/удаление)
    pub async fn check_changed(&mut self) -> bool {
        let modified = modified_time(&self.path).await;
        if modified == self.last_modified {
            return false;
        }
        self.last_modified = modified;
        true
    }
}

async fn modified_time(path: &Path) -> Option<SystemTime> {
    let meta = tokio::fs::metadata(path).await.ok()?;
    meta.modified().ok()
}
