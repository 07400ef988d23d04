use crate::error::Result;
use crate::events::WindowInfo;
use crate::utils::query_stdout;
use std::time::Duration;
use tracing::debug;

use super::r#trait::ActiveWindowSource;

/// KDE Plasma (в том числе Wayland) через kdotool
pub struct KdotoolSource;

impl KdotoolSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ActiveWindowSource for KdotoolSource {
    fn name(&self) -> &'static str {
        "kdotool"
    }

    async fn get_active_window(&self, timeout: Duration) -> Result<WindowInfo> {
        // Получаем ID окна, затем название по ID
        let window_id = query_stdout("kdotool", &["getactivewindow"], timeout).await?;
        debug!("kdotool получил window_id: '{}'", window_id);

        let title = query_stdout("kdotool", &["getwindowname", &window_id], timeout).await?;

        Ok(WindowInfo::new(title).with_class("KDE".to_string()))
    }
}
