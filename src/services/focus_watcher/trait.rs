use crate::error::Result;
use crate::events::WindowInfo;
use std::time::Duration;

/// Источник сведений об активном окне (одна утилита оконного менеджера)
#[async_trait::async_trait]
pub trait ActiveWindowSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn get_active_window(&self, timeout: Duration) -> Result<WindowInfo>;
}
