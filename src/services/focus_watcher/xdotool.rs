use crate::error::Result;
use crate::events::WindowInfo;
use crate::utils::query_stdout;
use std::time::Duration;
use tracing::debug;

use super::r#trait::ActiveWindowSource;

pub struct XdotoolSource;

impl XdotoolSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ActiveWindowSource for XdotoolSource {
    fn name(&self) -> &'static str {
        "xdotool"
    }

    async fn get_active_window(&self, timeout: Duration) -> Result<WindowInfo> {
        let title = query_stdout("xdotool", &["getactivewindow", "getwindowname"], timeout).await?;
        debug!("xdotool получил заголовок окна: '{}'", title);

        let class = match query_stdout("xdotool", &["getactivewindow", "getwindowclassname"], timeout).await {
            Ok(class_name) => class_name,
            Err(e) => {
                debug!("Не удалось получить класс окна: {}", e);
                String::new()
            }
        };

        Ok(WindowInfo::new(title).with_class(class))
    }
}
