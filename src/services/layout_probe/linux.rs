use crate::cursor_error;
use crate::error::Result;
use crate::events::LayoutCode;
use crate::utils::query_stdout;
use std::time::Duration;
use tracing::debug;

use super::r#trait::LayoutProbe;
use super::tables::{normalize_with, LINUX_LAYOUTS};

/// Раскладка X11 через `setxkbmap -query`
pub struct LinuxProbe;

impl LinuxProbe {
    pub fn new() -> Self {
        Self
    }

    /// Достать значение строки `layout:`; из списка "us,ru" берётся первая раскладка
    pub fn parse_query_output(output: &str) -> Option<&str> {
        output
            .lines()
            .filter_map(|line| line.trim().strip_prefix("layout:"))
            .map(|value| value.trim().split(',').next().unwrap_or("").trim())
            .find(|token| !token.is_empty())
    }
}

#[async_trait::async_trait]
impl LayoutProbe for LinuxProbe {
    fn name(&self) -> &'static str {
        "setxkbmap"
    }

    async fn query(&self, timeout: Duration) -> Result<String> {
        let output = query_stdout("setxkbmap", &["-query"], timeout).await?;

        let layout = Self::parse_query_output(&output)
            .ok_or_else(|| cursor_error!(probe, "в выводе setxkbmap нет строки layout"))?;
        debug!("setxkbmap вернул раскладку: '{}'", layout);

        Ok(layout.to_string())
    }

    fn normalize(&self, raw: &str) -> LayoutCode {
        normalize_with(&LINUX_LAYOUTS, raw)
    }
}
