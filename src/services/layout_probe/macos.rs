use crate::error::Result;
use crate::events::LayoutCode;
use crate::utils::query_stdout;
use std::time::Duration;
use tracing::debug;

use super::r#trait::LayoutProbe;
use super::tables::{normalize_with, MAC_LAYOUTS};

/// Читает AppleCurrentKeyboardLayoutInputSourceID из настроек HIToolbox
pub struct MacProbe {
    // Файл plist пользователя; без домашнего каталога - домен defaults
    source: String,
}

impl MacProbe {
    pub fn new() -> Self {
        let source = dirs::home_dir()
            .map(|home| {
                home.join("Library/Preferences/com.apple.HIToolbox.plist")
                    .to_string_lossy()
                    .into_owned()
            })
            .unwrap_or_else(|| "com.apple.HIToolbox".to_string());
        Self { source }
    }
}

#[async_trait::async_trait]
impl LayoutProbe for MacProbe {
    fn name(&self) -> &'static str {
        "defaults"
    }

    async fn query(&self, timeout: Duration) -> Result<String> {
        let raw = query_stdout(
            "defaults",
            &["read", &self.source, "AppleCurrentKeyboardLayoutInputSourceID"],
            timeout,
        )
        .await?;
        debug!("defaults вернул источник ввода: '{}'", raw);
        Ok(raw)
    }

    fn normalize(&self, raw: &str) -> LayoutCode {
        normalize_with(&MAC_LAYOUTS, raw)
    }
}
