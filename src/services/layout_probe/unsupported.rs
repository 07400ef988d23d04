use crate::error::Result;
use crate::events::LayoutCode;
use std::time::Duration;

use super::r#trait::LayoutProbe;

/// Платформа без известного способа узнать раскладку: всегда en-US
pub struct UnsupportedProbe;

impl UnsupportedProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl LayoutProbe for UnsupportedProbe {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    async fn query(&self, _timeout: Duration) -> Result<String> {
        Ok(LayoutCode::DEFAULT.to_string())
    }

    fn normalize(&self, _raw: &str) -> LayoutCode {
        LayoutCode::default_layout()
    }
}
