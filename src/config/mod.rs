//! Configuration module.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for cross-platform data directories, and TOML persistence via
//! `AppConfig::load_or_init` (writes defaults on first run) / `AppConfig::save_to`.

pub mod paths;
pub mod settings;

pub use paths::AppPaths;
pub use settings::{
    AppConfig, CatalogConfig, HotkeyConfig, RenderConfig, ScheduleConfig, SpeechConfig, UiConfig,
};
