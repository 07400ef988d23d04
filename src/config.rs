use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::events::LayoutCode;

/// Таблица "код раскладки -> цвет курсора"
pub type LayoutColorTable = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub cursor: CursorConfig,
    pub settings: SettingsConfig,
    pub focus: FocusConfig,
    pub status: StatusConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Всё, что контроллер перечитывает при изменении конфигурации
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CursorConfig {
    pub enabled: bool,
    pub layouts: LayoutColorTable,
    pub monitoring_interval_ms: u64,
    pub probe_timeout_ms: u64,
    /// Писать цвет на каждом цикле, даже если он уже записан
    pub always_write: bool,
    pub restore_on_exit: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Путь к settings.json редактора, "auto" - стандартный путь VS Code
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FocusConfig {
    pub enabled: bool,
    pub polling_interval_ms: u64,
    pub window_title_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Пустая строка - файл статуса не пишется
    pub file: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchConfig {
    /// 0 отключает отслеживание файла конфигурации
    pub config_poll_interval_ms: u64,
}

pub fn default_layouts() -> LayoutColorTable {
    [
        (LayoutCode::DEFAULT, "#007ACC"),
        ("ru", "#FF0000"),
        ("de", "#00FF00"),
        ("fr", "#0000FF"),
    ]
    .into_iter()
    .map(|(code, color)| (code.to_string(), color.to_string()))
    .collect()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            layouts: default_layouts(),
            monitoring_interval_ms: 250,
            probe_timeout_ms: 2000,
            always_write: false,
            restore_on_exit: true,
        }
    }
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: "auto".to_string(),
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            polling_interval_ms: 500,
            window_title_patterns: vec!["Visual Studio Code".to_string()],
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            config_poll_interval_ms: 2000,
        }
    }
}

impl CursorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.monitoring_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl SettingsConfig {
    /// Путь к settings.json; None, если "auto" и каталог конфигурации неизвестен
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if self.path.is_empty() || self.path == "auto" {
            dirs::config_dir().map(|dir| dir.join("Code").join("User").join("settings.json"))
        } else {
            Some(PathBuf::from(&self.path))
        }
    }
}

impl StatusConfig {
    pub fn resolve_path(&self) -> Option<PathBuf> {
        if self.file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.file))
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("LAYOUT_CURSOR_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.cursor.monitoring_interval_ms == 0 {
            anyhow::bail!("monitoring_interval_ms должно быть больше 0");
        }

        if self.cursor.probe_timeout_ms == 0 {
            anyhow::bail!("probe_timeout_ms должно быть больше 0");
        }

        for (code, color) in &self.cursor.layouts {
            if code.trim().is_empty() {
                anyhow::bail!("Пустой код раскладки в таблице layouts");
            }
            if !is_hex_color(color) {
                anyhow::bail!("Неверный цвет '{}' для раскладки '{}'", color, code);
            }
        }

        if self.focus.enabled && self.focus.polling_interval_ms < 100 {
            anyhow::bail!("focus.polling_interval_ms должно быть минимум 100");
        }

        let watch_ms = self.watch.config_poll_interval_ms;
        if watch_ms != 0 && watch_ms < 100 {
            anyhow::bail!("watch.config_poll_interval_ms должно быть 0 или минимум 100");
        }

        Ok(())
    }
}

/// #RGB, #RGBA, #RRGGBB или #RRGGBBAA
pub fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => {
            matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}
