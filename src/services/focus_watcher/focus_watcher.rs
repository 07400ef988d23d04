use crate::config::FocusConfig;
use crate::debug_if_enabled;
use crate::events::{ControlEvent, WindowInfo};
use crate::services::layout_probe::Platform;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info, warn};

use super::kdotool::KdotoolSource;
use super::r#trait::ActiveWindowSource;
use super::sway::SwaySource;
use super::xdotool::XdotoolSource;

/// Пауза, если ни один источник не работает
const RETRY_DELAY: Duration = Duration::from_secs(10);

pub struct FocusWatcher {
    patterns: Vec<String>,
    polling_interval: Duration,
    events_tx: mpsc::Sender<ControlEvent>,
    sources: Vec<Box<dyn ActiveWindowSource>>,
    working_source: Option<usize>,
    // None до первого наблюдения
    editor_focused: Option<bool>,
}

/// Factory function: наблюдатель фокуса нужен только на Linux и только если он включён
pub fn create_focus_watcher(
    config: &FocusConfig,
    platform: Platform,
    events_tx: mpsc::Sender<ControlEvent>,
) -> Option<FocusWatcher> {
    if !config.enabled {
        info!("Отслеживание фокуса окна редактора отключено");
        return None;
    }

    if config.window_title_patterns.is_empty() {
        warn!("focus.window_title_patterns пуст, отслеживание фокуса отключено");
        return None;
    }

    if platform != Platform::Linux {
        warn!("Отслеживание фокуса не поддерживается на платформе {}", platform);
        return None;
    }

    let sources: Vec<Box<dyn ActiveWindowSource>> = vec![
        Box::new(KdotoolSource::new()),
        Box::new(XdotoolSource::new()),
        Box::new(SwaySource::new()),
    ];

    Some(FocusWatcher::new(config, events_tx, sources))
}

impl FocusWatcher {
    pub fn new(
        config: &FocusConfig,
        events_tx: mpsc::Sender<ControlEvent>,
        sources: Vec<Box<dyn ActiveWindowSource>>,
    ) -> Self {
        info!("Инициализация FocusWatcher (паттерны: {:?})", config.window_title_patterns);
        Self {
            patterns: config.window_title_patterns.clone(),
            polling_interval: Duration::from_millis(config.polling_interval_ms),
            events_tx,
            sources,
            working_source: None,
            editor_focused: None,
        }
    }

    pub async fn run(mut self) {
        info!("FocusWatcher запущен, интервал опроса: {:?}", self.polling_interval);

        let mut ticker = interval(self.polling_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let index = match self.working_source {
                Some(index) => index,
                None => match self.detect_working_source().await {
                    Some(index) => index,
                    None => {
                        error!("Ни один способ узнать активное окно не работает. Повтор через {:?}", RETRY_DELAY);
                        tokio::time::sleep(RETRY_DELAY).await;
                        continue;
                    }
                },
            };

            let result = self.sources[index].get_active_window(self.polling_interval).await;
            match result {
                Ok(window) => {
                    if self.observe(&window) {
                        info!("Окно редактора снова активно: {}", window);
                        if self.events_tx.send(ControlEvent::FocusGained).await.is_err() {
                            info!("Контроллер остановлен, FocusWatcher завершает работу");
                            return;
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        "Источник {} перестал работать: {}. Переопределяем...",
                        self.sources[index].name(),
                        e
                    );
                    self.working_source = None;
                }
            }
        }
    }

    async fn detect_working_source(&mut self) -> Option<usize> {
        info!("Определяем рабочий способ получения активного окна...");

        for (index, source) in self.sources.iter().enumerate() {
            match source.get_active_window(self.polling_interval.max(Duration::from_secs(1))).await {
                Ok(_) => {
                    info!("Используем {}", source.name());
                    self.working_source = Some(index);
                    return Some(index);
                }
                Err(e) => debug_if_enabled!("{} не работает: {}", source.name(), e),
            }
        }

        None
    }

    /// Учесть очередное активное окно; true, если редактор только что получил фокус
    pub fn observe(&mut self, window: &WindowInfo) -> bool {
        let focused = window.matches_any_pattern(&self.patterns);
        let previous = self.editor_focused.replace(focused);
        matches!(previous, Some(false)) && focused
    }
}
