//! FocusWatcher service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for noticing that the
//! editor window became the active window again and emitting
//! `ControlEvent::FocusGained`. It MUST NOT detect layouts or touch settings:
//! the Controller decides what a regained focus means.

mod focus_watcher;
mod kdotool;
mod sway;
mod xdotool;
mod r#trait;

pub use self::focus_watcher::create_focus_watcher;
