//! Подставные реализации для тестов сервисов

use crate::cursor_error;
use crate::error::Result;
use crate::events::LayoutCode;
use crate::services::layout_probe::LayoutProbe;
use crate::services::settings_store::{ColorCustomizations, MemoryStore, SettingsStore};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Default)]
struct FakeProbeState {
    raw: Mutex<Option<String>>,
    delay: Mutex<Duration>,
    calls: AtomicUsize,
}

/// Пробник, ответ которого задаётся из теста; `None` - сбой команды
#[derive(Clone, Default)]
pub struct FakeProbe {
    state: Arc<FakeProbeState>,
}

impl FakeProbe {
    pub fn returning(raw: &str) -> Self {
        let probe = Self::default();
        probe.set(raw);
        probe
    }

    pub fn set(&self, raw: &str) {
        *self.state.raw.lock() = Some(raw.to_string());
    }

    pub fn fail(&self) {
        *self.state.raw.lock() = None;
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.state.delay.lock() = delay;
    }

    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    pub fn boxed(&self) -> Box<dyn LayoutProbe> {
        Box::new(self.clone())
    }
}

#[async_trait::async_trait]
impl LayoutProbe for FakeProbe {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn query(&self, timeout: Duration) -> Result<String> {
        self.state.calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.state.delay.lock();
        if delay > timeout {
            tokio::time::sleep(timeout).await;
            return Err(cursor_error!(timeout, "fake не ответил за {:?}", timeout));
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let raw = self.state.raw.lock().clone();
        raw.ok_or_else(|| cursor_error!(probe, "fake: команда завершилась с ошибкой"))
    }

    fn normalize(&self, raw: &str) -> LayoutCode {
        LayoutCode::from(raw)
    }
}

/// Хранилище в памяти, которое по команде начинает отказывать
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    broken: AtomicBool,
}

impl FlakyStore {
    pub fn with_document(document: Map<String, Value>) -> Self {
        Self {
            inner: MemoryStore::with_document(document),
            broken: AtomicBool::new(false),
        }
    }

    pub fn set_broken(&self, broken: bool) {
        self.broken.store(broken, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> Map<String, Value> {
        self.inner.snapshot()
    }

    pub fn write_count(&self) -> usize {
        self.inner.write_count()
    }
}

#[async_trait::async_trait]
impl SettingsStore for FlakyStore {
    async fn read_customizations(&self) -> Result<ColorCustomizations> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(cursor_error!(settings, "хранилище недоступно"));
        }
        self.inner.read_customizations().await
    }

    async fn write_customizations(&self, customizations: ColorCustomizations) -> Result<()> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(cursor_error!(settings, "хранилище недоступно"));
        }
        self.inner.write_customizations(customizations).await
    }

    fn describe(&self) -> String {
        "flaky".to_string()
    }
}

/// Документ настроек с чужими ключами и, по желанию, исходным цветом курсора
pub fn settings_document(cursor: Option<&str>) -> Map<String, Value> {
    let mut colors = Map::new();
    colors.insert("editor.background".to_string(), Value::from("#1E1E1E"));
    if let Some(color) = cursor {
        colors.insert("editorCursor.foreground".to_string(), Value::from(color));
    }
    colors.insert("terminal.foreground".to_string(), Value::from("#CCCCCC"));

    let mut document = Map::new();
    document.insert("editor.fontSize".to_string(), Value::from(14));
    document.insert("workbench.colorCustomizations".to_string(), Value::Object(colors));
    document
}

/// Все ключи, кроме нашего, должны оставаться нетронутыми
pub fn without_cursor_key(document: &Map<String, Value>) -> Map<String, Value> {
    let mut document = document.clone();
    if let Some(Value::Object(colors)) = document.get_mut("workbench.colorCustomizations") {
        colors.shift_remove("editorCursor.foreground");
    }
    document
}

pub fn cursor_value(document: &Map<String, Value>) -> Option<Value> {
    document
        .get("workbench.colorCustomizations")
        .and_then(|colors| colors.get("editorCursor.foreground"))
        .cloned()
}
