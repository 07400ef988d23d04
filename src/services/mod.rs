pub mod color_resolver;
pub mod config_watcher;
pub mod controller;
pub mod focus_watcher;
pub mod layout_probe;
pub mod reconciler;
pub mod settings_store;
pub mod status_indicator;

#[cfg(test)]
pub mod testing;

pub use config_watcher::ConfigWatcher;
pub use controller::Controller;
pub use focus_watcher::create_focus_watcher;
pub use layout_probe::{create_layout_probe, detect_layout, Platform};
pub use reconciler::Reconciler;
pub use settings_store::{JsonFileStore, MemoryStore, SettingsStore};
pub use status_indicator::StatusIndicator;
