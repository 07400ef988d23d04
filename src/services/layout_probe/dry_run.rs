use crate::error::Result;
use crate::events::LayoutCode;
use std::time::{Duration, Instant};
use tracing::info;

use super::r#trait::LayoutProbe;

const FAKE_LAYOUTS: &[&str] = &["en-US", "ru", "de", "fr", "es"];

/// Эмуляция смены раскладки: новая раскладка каждые `period`
pub struct DryRunProbe {
    started: Instant,
    period: Duration,
}

impl DryRunProbe {
    pub fn new(period: Duration) -> Self {
        info!("Dry-run режим - раскладка эмулируется, смена каждые {:?}", period);
        Self {
            started: Instant::now(),
            period,
        }
    }

    fn layout_at(&self, elapsed: Duration) -> &'static str {
        let period_ms = self.period.as_millis().max(1);
        let index = (elapsed.as_millis() / period_ms) as usize % FAKE_LAYOUTS.len();
        FAKE_LAYOUTS[index]
    }
}

#[async_trait::async_trait]
impl LayoutProbe for DryRunProbe {
    fn name(&self) -> &'static str {
        "dry-run"
    }

    async fn query(&self, _timeout: Duration) -> Result<String> {
        Ok(self.layout_at(self.started.elapsed()).to_string())
    }

    fn normalize(&self, raw: &str) -> LayoutCode {
        LayoutCode::from(raw)
    }
}
