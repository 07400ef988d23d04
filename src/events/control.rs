use crate::config::CursorConfig;
use std::fmt;

/// События, которые обрабатывает контроллер
///
/// Все источники (таймер, окно редактора, сигналы, файл конфигурации)
/// пишут в один канал; контроллер обрабатывает их строго по очереди.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Очередной тик таймера опроса
    Tick,
    /// Окно редактора снова получило фокус
    FocusGained,
    /// Конфигурация перечитана
    ConfigChanged(Box<CursorConfig>),
    /// Переключить включено/выключено
    Toggle,
    /// Вернуть исходный цвет курсора независимо от состояния
    Reset,
    /// Завершение работы
    Shutdown,
}

impl ControlEvent {
    pub fn config_changed(config: CursorConfig) -> Self {
        Self::ConfigChanged(Box::new(config))
    }

    /// Короткое имя для логов
    pub fn kind(&self) -> &'static str {
        match self {
            ControlEvent::Tick => "tick",
            ControlEvent::FocusGained => "focus",
            ControlEvent::ConfigChanged(_) => "config",
            ControlEvent::Toggle => "toggle",
            ControlEvent::Reset => "reset",
            ControlEvent::Shutdown => "shutdown",
        }
    }
}

impl fmt::Display for ControlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
