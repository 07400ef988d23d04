use serde::{Deserialize, Serialize};
use std::fmt;

/// Канонический код раскладки ("en-US", "ru", "de", ...)
///
/// Любая строка допустима: нераспознанный ответ ОС проходит без изменений
/// и ищется в таблице цветов как есть.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutCode(String);

impl LayoutCode {
    /// Раскладка по умолчанию и код, возвращаемый при любой ошибке определения
    pub const DEFAULT: &'static str = "en-US";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn default_layout() -> Self {
        Self::new(Self::DEFAULT)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[allow(dead_code)]
    pub fn is_default(&self) -> bool {
        self.0 == Self::DEFAULT
    }
}

impl Default for LayoutCode {
    fn default() -> Self {
        Self::default_layout()
    }
}

impl From<&str> for LayoutCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for LayoutCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl AsRef<str> for LayoutCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayoutCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
