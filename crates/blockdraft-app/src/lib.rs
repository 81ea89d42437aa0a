//! Blockdraft Application
//!
//! Application shell wiring the editor core to storage, keyboard shortcuts
//! and the new-block dialog flow.

mod app;
mod shortcuts;

pub use app::{App, AppConfig, AppError};
pub use shortcuts::{Action, Shortcut, ShortcutRegistry};
