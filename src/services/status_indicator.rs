use crate::events::LayoutCode;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const STATUS_ICON: &str = "⌨";
const STATUS_TOOLTIP: &str = "Click to toggle keyboard cursor color";

/// То, что показывает индикатор
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusView {
    pub text: String,
    pub tooltip: String,
    /// "prominent" - подсвеченный фон, "disabled" - без подсветки
    pub class: String,
    pub enabled: bool,
    pub layout: Option<String>,
}

impl StatusView {
    pub fn render(enabled: bool, layout: Option<&LayoutCode>) -> Self {
        if enabled {
            let label = layout.map(LayoutCode::as_str).unwrap_or("Unknown");
            Self {
                text: format!("{} {}", STATUS_ICON, label),
                tooltip: STATUS_TOOLTIP.to_string(),
                class: "prominent".to_string(),
                enabled,
                layout: layout.map(|code| code.to_string()),
            }
        } else {
            Self {
                text: format!("{} Disabled", STATUS_ICON),
                tooltip: STATUS_TOOLTIP.to_string(),
                class: "disabled".to_string(),
                enabled,
                layout: None,
            }
        }
    }

    #[allow(dead_code)]
    pub fn is_highlighted(&self) -> bool {
        self.class == "prominent"
    }
}

/// Индикатор состояния: лог и, если настроен, JSON-файл для панелей (waybar и т.п.)
///
/// Никогда не возвращает ошибок: сбои записи логируются и проглатываются.
pub struct StatusIndicator {
    file: Option<PathBuf>,
    last: Mutex<Option<StatusView>>,
}

impl StatusIndicator {
    pub fn new(file: Option<PathBuf>) -> Self {
        if let Some(path) = &file {
            info!("Статус будет публиковаться в {:?}", path);
        }
        Self {
            file,
            last: Mutex::new(None),
        }
    }

    pub async fn show(&self, enabled: bool, layout: Option<&LayoutCode>) {
        let view = StatusView::render(enabled, layout);

        {
            let mut last = self.last.lock();
            if last.as_ref() == Some(&view) {
                return;
            }
            *last = Some(view.clone());
        }

        info!("Статус: {}", view.text);
        self.publish(&view).await;
    }

    /// Подтверждение команды пользователю
    pub fn message(&self, text: &str) {
        info!("{}", text);
    }

    #[allow(dead_code)]
    pub fn current(&self) -> Option<StatusView> {
        self.last.lock().clone()
    }

    /// Финальный статус при завершении работы
    pub async fn dispose(&self) {
        self.show(false, None).await;
    }

    async fn publish(&self, view: &StatusView) {
        let Some(path) = &self.file else {
            return;
        };

        if let Err(e) = write_status(path, view).await {
            warn!("Не удалось записать статус в {:?}: {}", path, e);
        }
    }
}

async fn write_status(path: &Path, view: &StatusView) -> std::io::Result<()> {
    let json = serde_json::to_string(view)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, json + "\n").await
}
