use crate::config::{CursorConfig, LayoutColorTable};
use crate::error::Result;
use crate::events::{ControlEvent, LayoutCode};
use crate::services::reconciler::{OriginalColor, Reconciler};
use crate::services::status_indicator::StatusIndicator;
use crate::trace_if_enabled;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Ёмкость канала событий контроллера
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Состояние, которым владеет только контроллер
#[derive(Debug, Clone, PartialEq)]
pub struct ExtensionState {
    pub enabled: bool,
    pub layouts: LayoutColorTable,
    pub poll_interval: Duration,
    pub probe_timeout: Duration,
    pub always_write: bool,
    pub restore_on_exit: bool,
    pub original: OriginalColor,
    pub last_applied: Option<String>,
    pub last_layout: Option<LayoutCode>,
}

impl ExtensionState {
    pub fn from_config(config: &CursorConfig) -> Self {
        Self {
            enabled: config.enabled,
            layouts: config.layouts.clone(),
            poll_interval: config.poll_interval(),
            probe_timeout: config.probe_timeout(),
            always_write: config.always_write,
            restore_on_exit: config.restore_on_exit,
            original: OriginalColor::NotCaptured,
            last_applied: None,
            last_layout: None,
        }
    }

    /// Перечитать всё, кроме флага enabled (его переход обрабатывает контроллер)
    fn reload(&mut self, config: &CursorConfig) {
        self.layouts = config.layouts.clone();
        self.poll_interval = config.poll_interval();
        self.probe_timeout = config.probe_timeout();
        self.always_write = config.always_write;
        self.restore_on_exit = config.restore_on_exit;
    }
}

/// Контроллер жизненного цикла: ВКЛЮЧЕН / ВЫКЛЮЧЕН, таймер опроса и реакция на события
///
/// События обрабатываются строго по одному, а каждый цикл сверки дожидается
/// завершения, поэтому циклы никогда не пересекаются: последняя запись всегда
/// принадлежит последнему начатому циклу. Тики таймера схлопываются: пока
/// предыдущий тик не обработан, новый в очередь не ставится.
pub struct Controller {
    state: ExtensionState,
    reconciler: Reconciler,
    indicator: Arc<StatusIndicator>,
    events_tx: mpsc::Sender<ControlEvent>,
    events_rx: mpsc::Receiver<ControlEvent>,
    timer: Option<JoinHandle<()>>,
    tick_pending: Arc<AtomicBool>,
}

impl Controller {
    pub fn new(config: &CursorConfig, reconciler: Reconciler, indicator: Arc<StatusIndicator>) -> Self {
        info!(
            "Инициализация Controller (enabled: {}, интервал: {}мс)",
            config.enabled, config.monitoring_interval_ms
        );
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            state: ExtensionState::from_config(config),
            reconciler,
            indicator,
            events_tx,
            events_rx,
            timer: None,
            tick_pending: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Отправитель для источников событий (сигналы, фокус, конфигурация)
    pub fn sender(&self) -> mpsc::Sender<ControlEvent> {
        self.events_tx.clone()
    }

    #[allow(dead_code)]
    pub fn state(&self) -> &ExtensionState {
        &self.state
    }

    #[allow(dead_code)]
    pub fn is_timer_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Основной цикл: старт, события до Shutdown, затем корректное завершение
    pub async fn run(&mut self) -> Result<()> {
        self.start().await;

        while let Some(event) = self.events_rx.recv().await {
            if !self.handle_event(event).await {
                break;
            }
        }

        self.teardown().await;
        Ok(())
    }

    /// Сохранить исходный цвет и войти в начальное состояние
    pub async fn start(&mut self) {
        info!("Controller запущен (пробник: {})", self.reconciler.probe_name());
        self.reconciler.capture_original(&mut self.state).await;

        if self.state.enabled {
            self.enable().await;
        } else {
            self.update_status().await;
        }
    }

    /// Обработать одно событие; false означает завершение работы
    pub async fn handle_event(&mut self, event: ControlEvent) -> bool {
        trace_if_enabled!("Событие контроллера: {}", event);

        match event {
            ControlEvent::Tick => {
                self.tick_pending.store(false, Ordering::SeqCst);
                if !self.state.enabled {
                    return true;
                }
                if let Some(applied) = self.reconciler.reconcile(&mut self.state).await {
                    trace_if_enabled!(
                        "Тик: {} -> {} (записано: {})",
                        applied.layout,
                        applied.color,
                        applied.written
                    );
                }
            }
            ControlEvent::FocusGained => {
                if self.state.enabled {
                    debug!("Окно редактора получило фокус, обновляем цвет");
                    self.reconciler.reconcile(&mut self.state).await;
                }
            }
            ControlEvent::ConfigChanged(config) => self.apply_config(&config).await,
            ControlEvent::Toggle => self.toggle().await,
            ControlEvent::Reset => self.reset().await,
            ControlEvent::Shutdown => {
                info!("Получена команда завершения");
                return false;
            }
        }

        true
    }

    pub async fn toggle(&mut self) {
        if self.state.enabled {
            self.disable().await;
            self.indicator.message("Keyboard cursor color disabled");
        } else {
            self.enable().await;
            self.indicator.message("Keyboard cursor color enabled");
        }
    }

    /// Вернуть исходный цвет независимо от состояния
    pub async fn reset(&mut self) {
        self.reconciler.restore(&mut self.state).await;
        self.indicator.message("Cursor color reset to default");
    }

    pub async fn apply_config(&mut self, config: &CursorConfig) {
        info!(
            "Конфигурация обновлена (enabled: {}, раскладок: {}, интервал: {}мс)",
            config.enabled,
            config.layouts.len(),
            config.monitoring_interval_ms
        );

        let was_enabled = self.state.enabled;
        self.state.reload(config);

        match (was_enabled, config.enabled) {
            (true, false) => self.disable().await,
            (false, true) => self.enable().await,
            (true, true) => {
                // Новый интервал и таблица цветов вступают в силу сразу
                self.reconciler.reconcile(&mut self.state).await;
                self.start_timer();
            }
            (false, false) => self.update_status().await,
        }
    }

    async fn enable(&mut self) {
        self.state.enabled = true;
        self.reconciler.reconcile(&mut self.state).await;
        self.start_timer();
        self.update_status().await;
    }

    async fn disable(&mut self) {
        self.state.enabled = false;
        self.stop_timer();
        self.reconciler.restore(&mut self.state).await;
        self.update_status().await;
    }

    fn start_timer(&mut self) {
        self.stop_timer();

        let period = self.state.poll_interval;
        let events_tx = self.events_tx.clone();
        let tick_pending = Arc::clone(&self.tick_pending);
        tick_pending.store(false, Ordering::SeqCst);

        debug!("Запуск таймера опроса раскладки: {:?}", period);
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                // Предыдущий тик ещё в очереди: новый не нужен
                if tick_pending.swap(true, Ordering::SeqCst) {
                    continue;
                }
                if events_tx.send(ControlEvent::Tick).await.is_err() {
                    break;
                }
            }
        });

        self.timer = Some(handle);
    }

    fn stop_timer(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
            debug!("Таймер опроса раскладки остановлен");
        }
    }

    async fn update_status(&self) {
        self.indicator.show(self.state.enabled, self.state.last_layout.as_ref()).await;
    }

    /// Остановить таймер, при необходимости вернуть исходный цвет и погасить индикатор
    pub async fn teardown(&mut self) {
        info!("Controller завершает работу");
        self.stop_timer();

        if self.state.restore_on_exit {
            self.reconciler.restore(&mut self.state).await;
        } else {
            info!("restore_on_exit выключен, цвет курсора оставлен как есть");
        }

        self.indicator.dispose().await;
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop_timer();
    }
}
