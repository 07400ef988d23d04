//! Доступ к пользовательским настройкам цвета редактора
//!
//! Хранилище принадлежит редактору. Мы владеем только одним ключом
//! `editorCursor.foreground` внутри `workbench.colorCustomizations`; всё
//! остальное (соседние ключи, остальной документ, порядок ключей) переписывается
//! как есть. Перед каждой записью документ перечитывается заново.

use crate::cursor_error;
use crate::error::Result;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs;
use tracing::{debug, error};

pub const COLOR_CUSTOMIZATIONS_KEY: &str = "workbench.colorCustomizations";
pub const CURSOR_FOREGROUND_KEY: &str = "editorCursor.foreground";

/// Содержимое `workbench.colorCustomizations`
pub type ColorCustomizations = Map<String, Value>;

#[async_trait::async_trait]
pub trait SettingsStore: Send + Sync {
    /// Прочитать текущий объект `workbench.colorCustomizations` (пустой, если его нет)
    async fn read_customizations(&self) -> Result<ColorCustomizations>;

    /// Записать объект целиком, не трогая остальной документ
    async fn write_customizations(&self, customizations: ColorCustomizations) -> Result<()>;

    /// Описание для логов
    fn describe(&self) -> String;
}

/// Текущее значение цвета курсора, если ключ есть
pub fn cursor_color(customizations: &ColorCustomizations) -> Option<&Value> {
    customizations.get(CURSOR_FOREGROUND_KEY)
}

fn customizations_of(document: &Map<String, Value>) -> Result<ColorCustomizations> {
    match document.get(COLOR_CUSTOMIZATIONS_KEY) {
        None | Some(Value::Null) => Ok(ColorCustomizations::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(cursor_error!(
            settings,
            "{} не является объектом: {}",
            COLOR_CUSTOMIZATIONS_KEY,
            other
        )),
    }
}

/// settings.json редактора на диске
pub struct JsonFileStore {
    path: PathBuf,
    // Ошибка разбора уже показана пользователю
    parse_error_reported: AtomicBool,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            parse_error_reported: AtomicBool::new(false),
        }
    }

    async fn read_document(&self) -> Result<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Файл настроек {:?} не существует, считаем его пустым", self.path);
                return Ok(Map::new());
            }
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        // Комментарии JSONC не поддерживаются: такой файл не перезаписываем
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(document)) => {
                self.parse_error_reported.store(false, Ordering::Relaxed);
                Ok(document)
            }
            Ok(_) => Err(cursor_error!(settings, "{:?}: корень документа не объект", self.path)),
            Err(e) => {
                if !self.parse_error_reported.swap(true, Ordering::Relaxed) {
                    error!(
                        "{:?} не является строгим JSON ({}). Комментарии и висячие запятые не поддерживаются, \
                         цвет курсора не будет меняться, пока файл не исправлен",
                        self.path, e
                    );
                }
                Err(cursor_error!(settings, "{:?}: не удалось разобрать JSON: {}", self.path, e))
            }
        }
    }

    /// Настоящий файл, если settings.json - символическая ссылка (stow, home-manager)
    async fn write_target(&self) -> PathBuf {
        match fs::canonicalize(&self.path).await {
            Ok(target) => target,
            Err(_) => self.path.clone(),
        }
    }

    async fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        let target = self.write_target().await;
        if let Some(parent) = target.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        // Отступ в 4 пробела, как у самого редактора
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        document.serialize(&mut serializer)?;
        buffer.push(b'\n');

        // Атомарная замена: пишем рядом с настоящим файлом и переименовываем
        let file_name = target
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "settings.json".to_string());
        let tmp_path = target.with_file_name(format!(".{}.layout-cursor.tmp", file_name));
        fs::write(&tmp_path, &buffer).await?;
        if let Err(e) = fs::rename(&tmp_path, &target).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl SettingsStore for JsonFileStore {
    async fn read_customizations(&self) -> Result<ColorCustomizations> {
        customizations_of(&self.read_document().await?)
    }

    async fn write_customizations(&self, customizations: ColorCustomizations) -> Result<()> {
        let mut document = self.read_document().await?;
        // Проверяем, что не затираем чужое значение другого типа
        customizations_of(&document)?;

        match document.get_mut(COLOR_CUSTOMIZATIONS_KEY) {
            Some(slot) => *slot = Value::Object(customizations),
            None => {
                document.insert(COLOR_CUSTOMIZATIONS_KEY.to_string(), Value::Object(customizations));
            }
        }

        self.write_document(&document).await
    }

    fn describe(&self) -> String {
        format!("{}", self.path.display())
    }
}

/// Хранилище в памяти: dry-run режим и тесты
pub struct MemoryStore {
    document: Mutex<Map<String, Value>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_document(Map::new())
    }

    pub fn with_document(document: Map<String, Value>) -> Self {
        Self {
            document: Mutex::new(document),
            writes: Mutex::new(0),
        }
    }

    /// Копия всего документа
    #[allow(dead_code)]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.document.lock().clone()
    }

    #[allow(dead_code)]
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SettingsStore for MemoryStore {
    async fn read_customizations(&self) -> Result<ColorCustomizations> {
        customizations_of(&self.document.lock())
    }

    async fn write_customizations(&self, customizations: ColorCustomizations) -> Result<()> {
        let mut document = self.document.lock();
        customizations_of(&document)?;
        document.insert(COLOR_CUSTOMIZATIONS_KEY.to_string(), Value::Object(customizations));
        *self.writes.lock() += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
