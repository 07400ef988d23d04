use crate::error::Result;
use crate::events::LayoutCode;
use crate::utils::query_stdout;
use std::time::Duration;
use tracing::debug;

use super::r#trait::LayoutProbe;
use super::tables::{normalize_with, WINDOWS_LAYOUTS};

const LANGUAGE_LIST_QUERY: &str =
    "Get-WinUserLanguageList | Select-Object -First 1 -ExpandProperty LanguageTag";

/// Первый язык из списка языков пользователя Windows
pub struct WindowsProbe;

impl WindowsProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl LayoutProbe for WindowsProbe {
    fn name(&self) -> &'static str {
        "powershell"
    }

    async fn query(&self, timeout: Duration) -> Result<String> {
        let raw = query_stdout(
            "powershell",
            &["-NoProfile", "-NonInteractive", "-Command", LANGUAGE_LIST_QUERY],
            timeout,
        )
        .await?;
        debug!("powershell вернул языковой тег: '{}'", raw);
        Ok(raw)
    }

    fn normalize(&self, raw: &str) -> LayoutCode {
        normalize_with(&WINDOWS_LAYOUTS, raw)
    }
}
