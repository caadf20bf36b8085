//! Scribble Application
//!
//! The native application shell: windowing, input translation, file dialogs
//! and frame presentation around the core engine.

#[cfg(feature = "native")]
mod app;
mod event_handler;
mod shortcuts;

#[cfg(feature = "native")]
pub use app::{App, AppConfig, AppEvent, DATA_DIR_ENV};
pub use event_handler::{AppCommand, EventHandler};
pub use shortcuts::{Action, Shortcut, ShortcutRegistry};
