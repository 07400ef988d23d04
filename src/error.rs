use thiserror::Error;

#[derive(Error, Debug)]
pub enum CursorError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Ошибка определения раскладки: {0}")]
    Probe(String),

    #[error("Превышено время ожидания: {0}")]
    ProbeTimeout(String),

    #[error("Ошибка хранилища настроек: {0}")]
    Settings(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CursorError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! cursor_error {
    (probe, $($arg:tt)*) => {
        $crate::error::CursorError::Probe(format!($($arg)*))
    };
    (timeout, $($arg:tt)*) => {
        $crate::error::CursorError::ProbeTimeout(format!($($arg)*))
    };
    (settings, $($arg:tt)*) => {
        $crate::error::CursorError::Settings(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::CursorError::Internal(format!($($arg)*))
    };
}
