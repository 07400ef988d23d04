use crate::error::Result;
use crate::events::LayoutCode;
use std::fmt;
use std::time::Duration;
use tracing::warn;

use super::dry_run::DryRunProbe;
use super::linux::LinuxProbe;
use super::macos::MacProbe;
use super::unsupported::UnsupportedProbe;
use super::windows::WindowsProbe;

/// Trait for layout probes, one per platform family
#[async_trait::async_trait]
pub trait LayoutProbe: Send + Sync {
    /// Имя для логов
    fn name(&self) -> &'static str;

    /// Сырой идентификатор раскладки от ОС (одна внешняя команда)
    async fn query(&self, timeout: Duration) -> Result<String>;

    /// Привести сырой идентификатор к каноническому коду
    fn normalize(&self, raw: &str) -> LayoutCode;

    async fn detect(&self, timeout: Duration) -> Result<LayoutCode> {
        let raw = self.query(timeout).await?;
        Ok(self.normalize(&raw))
    }
}

/// Семейство платформ, определяется один раз при запуске
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Other
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::Other => "other",
        };
        f.write_str(name)
    }
}

/// Factory function to create the layout probe for a platform (or a dry-run one)
pub fn create_layout_probe(platform: Platform, dry_run: bool) -> Box<dyn LayoutProbe> {
    if dry_run {
        return Box::new(DryRunProbe::new(Duration::from_secs(5)));
    }

    match platform {
        Platform::MacOs => Box::new(MacProbe::new()),
        Platform::Windows => Box::new(WindowsProbe::new()),
        Platform::Linux => Box::new(LinuxProbe::new()),
        Platform::Other => Box::new(UnsupportedProbe::new()),
    }
}

/// Определить раскладку, никогда не возвращая ошибку
///
/// Любой сбой (запуск, код выхода, пустой вывод, таймаут, неподдерживаемая
/// платформа) логируется и превращается в `LayoutCode::DEFAULT`.
pub async fn detect_layout(probe: &dyn LayoutProbe, timeout: Duration) -> LayoutCode {
    match probe.detect(timeout).await {
        Ok(code) => code,
        Err(e) => {
            warn!("Не удалось определить раскладку через {}: {}", probe.name(), e);
            LayoutCode::default_layout()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor_error;

    struct FailingProbe;

    #[async_trait::async_trait]
    impl LayoutProbe for FailingProbe {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn query(&self, _timeout: Duration) -> Result<String> {
            Err(cursor_error!(probe, "spawn failed"))
        }

        fn normalize(&self, raw: &str) -> LayoutCode {
            LayoutCode::from(raw)
        }
    }

    #[tokio::test]
    async fn test_failure_falls_back_to_default() {
        let code = detect_layout(&FailingProbe, Duration::from_millis(10)).await;
        assert_eq!(code, LayoutCode::default_layout());
    }

    #[tokio::test]
    async fn test_other_platform_is_always_default() {
        let probe = create_layout_probe(Platform::Other, false);
        assert_eq!(probe.name(), "unsupported");
        let code = detect_layout(probe.as_ref(), Duration::from_millis(10)).await;
        assert_eq!(code.as_str(), "en-US");
    }

    #[test]
    fn test_factory_picks_platform_probe() {
        assert_eq!(create_layout_probe(Platform::MacOs, false).name(), "defaults");
        assert_eq!(create_layout_probe(Platform::Windows, false).name(), "powershell");
        assert_eq!(create_layout_probe(Platform::Linux, false).name(), "setxkbmap");
        assert_eq!(create_layout_probe(Platform::Linux, true).name(), "dry-run");
    }
}
