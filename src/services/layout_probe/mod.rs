//! LayoutProbe service: responsibility and boundaries
//!
//! This module and its submodules are responsible ONLY for asking the operating
//! system which keyboard layout is active and normalizing the answer to a
//! `LayoutCode`. One implementation exists per platform family; the mapping
//! tables are static data in `tables`. Probes MUST NOT touch editor settings,
//! colors or the status indicator: those belong to the Reconciler.

mod dry_run;
mod linux;
mod macos;
mod tables;
mod unsupported;
mod windows;
mod r#trait;

pub use self::r#trait::{create_layout_probe, detect_layout, LayoutProbe, Platform};
