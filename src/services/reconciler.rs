use crate::debug_if_enabled;
use crate::error::{CursorError, Result};
use crate::events::LayoutCode;
use crate::services::color_resolver::resolve_color;
use crate::services::controller::ExtensionState;
use crate::services::layout_probe::LayoutProbe;
use crate::services::settings_store::{cursor_color, SettingsStore, CURSOR_FOREGROUND_KEY};
use crate::services::status_indicator::StatusIndicator;
use crate::cursor_error;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Цвет курсора до первого вмешательства
#[derive(Debug, Clone, PartialEq)]
pub enum OriginalColor {
    /// Ещё не удалось прочитать хранилище; писать нельзя
    NotCaptured,
    /// Ключа не было: при восстановлении его нужно удалить
    Absent,
    Present(Value),
}

/// Результат успешного цикла
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub layout: LayoutCode,
    pub color: String,
    /// false, если в хранилище уже был этот цвет и запись пропущена
    pub written: bool,
}

/// Один проход "раскладка -> цвет -> настройки", плюс сохранение и возврат исходного цвета
pub struct Reconciler {
    probe: Box<dyn LayoutProbe>,
    store: Arc<dyn SettingsStore>,
    indicator: Arc<StatusIndicator>,
    // Чтобы не спамить предупреждениями на каждом тике
    probe_failing: bool,
    store_failing: bool,
}

impl Reconciler {
    pub fn new(
        probe: Box<dyn LayoutProbe>,
        store: Arc<dyn SettingsStore>,
        indicator: Arc<StatusIndicator>,
    ) -> Self {
        info!(
            "Инициализация Reconciler (пробник: {}, настройки: {})",
            probe.name(),
            store.describe()
        );
        Self {
            probe,
            store,
            indicator,
            probe_failing: false,
            store_failing: false,
        }
    }

    /// Запомнить исходный цвет, если он ещё не сохранён
    pub async fn capture_original(&self, state: &mut ExtensionState) {
        if state.original != OriginalColor::NotCaptured {
            return;
        }

        match self.store.read_customizations().await {
            Ok(customizations) => {
                state.original = match cursor_color(&customizations) {
                    Some(value) => OriginalColor::Present(value.clone()),
                    None => OriginalColor::Absent,
                };
                info!("Исходный цвет курсора сохранён: {:?}", state.original);
            }
            Err(e) => {
                warn!("Не удалось прочитать исходный цвет курсора: {}", e);
            }
        }
    }

    pub async fn reconcile(&mut self, state: &mut ExtensionState) -> Option<Applied> {
        if !state.enabled {
            return None;
        }

        let layout = match self.probe.detect(state.probe_timeout).await {
            Ok(layout) => {
                if self.probe_failing {
                    info!("Определение раскладки через {} снова работает", self.probe.name());
                    self.probe_failing = false;
                }
                layout
            }
            Err(CursorError::ProbeTimeout(msg)) => {
                warn!("Раскладка не определена вовремя ({}), цикл пропущен", msg);
                return None;
            }
            Err(e) => {
                if self.probe_failing {
                    debug!("Определение раскладки по-прежнему не работает: {}", e);
                } else {
                    warn!("Не удалось определить раскладку: {}. Используем {}", e, LayoutCode::DEFAULT);
                    self.probe_failing = true;
                }
                LayoutCode::default_layout()
            }
        };

        let color = resolve_color(&layout, &state.layouts).to_string();
        debug_if_enabled!("Раскладка: {}, цвет: {}", layout, color);

        match self.apply(state, &color).await {
            Ok(written) => {
                if self.store_failing {
                    info!("Запись настроек снова работает");
                    self.store_failing = false;
                }
                if written {
                    info!("Цвет курсора для раскладки {}: {}", layout, color);
                }
                state.last_applied = Some(color.clone());
                state.last_layout = Some(layout.clone());
                self.indicator.show(true, Some(&layout)).await;
                Some(Applied {
                    layout,
                    color,
                    written,
                })
            }
            Err(e) => {
                if self.store_failing {
                    debug!("Настройки по-прежнему недоступны: {}", e);
                } else {
                    warn!("Не удалось обновить цвет курсора: {}", e);
                    self.store_failing = true;
                }
                None
            }
        }
    }

    async fn apply(&self, state: &mut ExtensionState, color: &str) -> Result<bool> {
        self.capture_original(state).await;
        if state.original == OriginalColor::NotCaptured {
            return Err(cursor_error!(settings, "исходный цвет не сохранён, запись отложена"));
        }

        let mut customizations = self.store.read_customizations().await?;
        let target = Value::String(color.to_string());
        if !state.always_write && cursor_color(&customizations) == Some(&target) {
            return Ok(false);
        }

        customizations.insert(CURSOR_FOREGROUND_KEY.to_string(), target);
        self.store.write_customizations(customizations).await?;
        Ok(true)
    }

    /// Вернуть исходный цвет (или удалить ключ, если его не было)
    pub async fn restore(&mut self, state: &mut ExtensionState) -> bool {
        let result = match &state.original {
            OriginalColor::NotCaptured => {
                warn!("Исходный цвет курсора неизвестен, восстанавливать нечего");
                return false;
            }
            original => self.write_original(original).await,
        };

        match result {
            Ok(written) => {
                if written {
                    info!("Исходный цвет курсора восстановлен: {:?}", state.original);
                }
                state.last_applied = None;
                true
            }
            Err(e) => {
                warn!("Не удалось восстановить исходный цвет курсора: {}", e);
                false
            }
        }
    }

    async fn write_original(&self, original: &OriginalColor) -> Result<bool> {
        let mut customizations = self.store.read_customizations().await?;
        let current = cursor_color(&customizations);

        match original {
            OriginalColor::Present(value) => {
                if current == Some(value) {
                    return Ok(false);
                }
                customizations.insert(CURSOR_FOREGROUND_KEY.to_string(), value.clone());
            }
            OriginalColor::Absent => {
                if current.is_none() {
                    return Ok(false);
                }
                customizations.shift_remove(CURSOR_FOREGROUND_KEY);
            }
            OriginalColor::NotCaptured => return Ok(false),
        }

        self.store.write_customizations(customizations).await?;
        Ok(true)
    }

    /// Имя пробника для логов
    pub fn probe_name(&self) -> &'static str {
        self.probe.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CursorConfig;
    use crate::services::settings_store::MemoryStore;
    use crate::services::testing::{
        cursor_value, settings_document, without_cursor_key, FakeProbe, FlakyStore,
    };
    use serde_json::json;
    use std::time::Duration;

    fn state() -> ExtensionState {
        ExtensionState::from_config(&CursorConfig::default())
    }

    fn make_reconciler(probe: &FakeProbe, store: Arc<dyn SettingsStore>) -> Reconciler {
        Reconciler::new(probe.boxed(), store, Arc::new(StatusIndicator::new(None)))
    }

    #[tokio::test]
    async fn test_reconcile_applies_layout_color() {
        let probe = FakeProbe::returning("ru");
        let store = Arc::new(MemoryStore::with_document(settings_document(Some("#ABCDEF"))));
        let mut reconciler = make_reconciler(&probe, store.clone());
        let mut state = state();

        let applied = reconciler.reconcile(&mut state).await.unwrap();
        assert_eq!(applied.layout.as_str(), "ru");
        assert_eq!(applied.color, "#FF0000");
        assert!(applied.written);
        assert_eq!(cursor_value(&store.snapshot()), Some(json!("#FF0000")));
        assert_eq!(state.original, OriginalColor::Present(json!("#ABCDEF")));
        assert_eq!(state.last_applied.as_deref(), Some("#FF0000"));
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let probe = FakeProbe::returning("de");
        let store = Arc::new(MemoryStore::with_document(settings_document(None)));
        let before = without_cursor_key(&store.snapshot());
        let mut reconciler = make_reconciler(&probe, store.clone());
        let mut state = state();

        let first = reconciler.reconcile(&mut state).await.unwrap();
        let second = reconciler.reconcile(&mut state).await.unwrap();

        assert_eq!((&first.layout, &first.color), (&second.layout, &second.color));
        assert!(!second.written);
        assert_eq!(store.write_count(), 1);
        assert_eq!(without_cursor_key(&store.snapshot()), before);
    }

    #[tokio::test]
    async fn test_always_write_writes_every_cycle() {
        let probe = FakeProbe::returning("de");
        let store = Arc::new(MemoryStore::new());
        let mut reconciler = make_reconciler(&probe, store.clone());
        let mut state = state();
        state.always_write = true;

        reconciler.reconcile(&mut state).await.unwrap();
        reconciler.reconcile(&mut state).await.unwrap();
        assert_eq!(store.write_count(), 2);
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let probe = FakeProbe::returning("ru");
        let store = Arc::new(MemoryStore::new());
        let mut reconciler = make_reconciler(&probe, store.clone());
        let mut state = state();
        state.enabled = false;

        assert!(reconciler.reconcile(&mut state).await.is_none());
        assert_eq!(probe.calls(), 0);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_probe_failure_uses_default_layout() {
        let probe = FakeProbe::default();
        probe.fail();
        let store = Arc::new(MemoryStore::new());
        let mut reconciler = make_reconciler(&probe, store.clone());
        let mut state = state();

        let applied = reconciler.reconcile(&mut state).await.unwrap();
        assert!(applied.layout.is_default());
        assert_eq!(cursor_value(&store.snapshot()), Some(json!("#007ACC")));
    }

    #[tokio::test]
    async fn test_probe_timeout_skips_cycle() {
        let probe = FakeProbe::returning("ru");
        probe.set_delay(Duration::from_millis(200));
        let store = Arc::new(MemoryStore::new());
        let mut reconciler = make_reconciler(&probe, store.clone());
        let mut state = state();
        state.probe_timeout = Duration::from_millis(20);

        assert!(reconciler.reconcile(&mut state).await.is_none());
        assert_eq!(store.write_count(), 0);
        assert_eq!(state.last_applied, None);
    }

    #[tokio::test]
    async fn test_restore_removes_absent_key() {
        let probe = FakeProbe::returning("ru");
        let store = Arc::new(MemoryStore::with_document(settings_document(None)));
        let before = store.snapshot();
        let mut reconciler = make_reconciler(&probe, store.clone());
        let mut state = state();

        reconciler.capture_original(&mut state).await;
        assert_eq!(state.original, OriginalColor::Absent);
        reconciler.reconcile(&mut state).await.unwrap();
        assert!(reconciler.restore(&mut state).await);

        let after = store.snapshot();
        assert_eq!(cursor_value(&after), None);
        assert_eq!(after, before);
        assert_eq!(state.last_applied, None);
    }

    #[tokio::test]
    async fn test_restore_sets_present_value_back() {
        let probe = FakeProbe::returning("fr");
        let store = Arc::new(MemoryStore::with_document(settings_document(Some("#ABCDEF"))));
        let before = store.snapshot();
        let mut reconciler = make_reconciler(&probe, store.clone());
        let mut state = state();

        reconciler.capture_original(&mut state).await;
        reconciler.reconcile(&mut state).await.unwrap();
        assert_eq!(cursor_value(&store.snapshot()), Some(json!("#0000FF")));

        assert!(reconciler.restore(&mut state).await);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_no_write_until_original_captured() {
        let probe = FakeProbe::returning("ru");
        let store = Arc::new(FlakyStore::with_document(settings_document(Some("#ABCDEF"))));
        let mut reconciler = make_reconciler(&probe, store.clone());
        let mut state = state();

        store.set_broken(true);
        reconciler.capture_original(&mut state).await;
        assert_eq!(state.original, OriginalColor::NotCaptured);
        assert!(reconciler.reconcile(&mut state).await.is_none());
        assert!(!reconciler.restore(&mut state).await);

        // Хранилище ожило: исходный цвет захватывается перед первой записью
        store.set_broken(false);
        reconciler.reconcile(&mut state).await.unwrap();
        assert_eq!(state.original, OriginalColor::Present(json!("#ABCDEF")));
        assert_eq!(cursor_value(&store.snapshot()), Some(json!("#FF0000")));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed() {
        let probe = FakeProbe::returning("ru");
        let store = Arc::new(FlakyStore::with_document(settings_document(None)));
        let mut reconciler = make_reconciler(&probe, store.clone());
        let mut state = state();
        reconciler.capture_original(&mut state).await;

        store.set_broken(true);
        assert!(reconciler.reconcile(&mut state).await.is_none());
        assert!(reconciler.reconcile(&mut state).await.is_none());
        assert_eq!(state.last_applied, None);

        store.set_broken(false);
        assert!(reconciler.reconcile(&mut state).await.is_some());
    }
}
