//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//! Every section is `#[serde(default)]`, so a partial `settings.toml` only
//! overrides the keys it names.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ScheduleConfig
// ---------------------------------------------------------------------------

/// Quiet periods of the two session timers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Inactivity before the input is matched and rendered.
    pub update_delay_ms: u64,
    /// Inactivity before the input field is wiped.
    pub clear_delay_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            update_delay_ms: 1_000,
            clear_delay_ms: 5_000,
        }
    }
}

impl ScheduleConfig {
    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }

    pub fn clear_delay(&self) -> Duration {
        Duration::from_millis(self.clear_delay_ms)
    }
}

// ---------------------------------------------------------------------------
// CatalogConfig
// ---------------------------------------------------------------------------

/// Where meme templates come from and how loosely keywords match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// TOML catalog file.  `None` uses the catalog compiled into the binary.
    pub path: Option<PathBuf>,
    /// Minimum normalized Levenshtein similarity (0.0 – 1.0) for a keyword
    /// to count as a match.
    pub fuzzy_threshold: f64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: None,
            fuzzy_threshold: 0.75,
        }
    }
}

// ---------------------------------------------------------------------------
// RenderConfig
// ---------------------------------------------------------------------------

/// Settings for the memegen-compatible render service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Base URL of the API, without a trailing slash.
    pub base_url: String,
    /// Image extension requested from the API (`png`, `jpg`).
    pub extension: String,
    /// Maximum seconds to wait for an image before giving up.
    pub timeout_secs: u64,
    /// Fraction of the viewport the rendered image may occupy.
    pub fit_ratio: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.memegen.link".into(),
            extension: "png".into(),
            timeout_secs: 10,
            fit_ratio: 0.9,
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechConfig
// ---------------------------------------------------------------------------

/// Settings for the background speech listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Start the microphone listener at all.
    pub enabled: bool,
    /// Whisper model id (see [`crate::stt::WHISPER_MODELS`]).
    pub model: String,
    /// ISO-639-1 language code, or `"auto"` for Whisper's detection.
    pub language: String,
    /// Attempt GPU-accelerated inference when available.
    pub use_gpu: bool,
    /// Baseline RMS energy above which a frame counts as speech.
    pub energy_threshold: f32,
    /// Raise the threshold from the measured ambient noise at startup.
    pub dynamic_energy: bool,
    /// Seconds of audio used to measure ambient noise.
    pub ambient_secs: f32,
    /// Seconds of silence that end a phrase.
    pub pause_secs: f32,
    /// Phrases with less voiced audio than this are discarded as noise.
    pub min_phrase_secs: f32,
    /// Phrases are cut and transcribed once they reach this length.
    pub max_phrase_secs: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "base.en".into(),
            language: "en".into(),
            use_gpu: false,
            energy_threshold: 0.01,
            dynamic_energy: true,
            ambient_secs: 1.0,
            pause_secs: 0.8,
            min_phrase_secs: 0.3,
            max_phrase_secs: 15.0,
        }
    }
}

// ---------------------------------------------------------------------------
// HotkeyConfig
// ---------------------------------------------------------------------------

/// Global hotkey bindings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Key that pauses / resumes the speech listener (e.g. `"F9"`).
    pub toggle_listening_key: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            toggle_listening_key: "F9".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub min_width: f32,
    pub min_height: f32,
    /// Keep the window floating above all other windows.
    pub always_on_top: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            min_width: 500.0,
            min_height: 500.0,
            always_on_top: false,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use memegen_live::config::{AppConfig, AppPaths};
///
/// // First run writes the defaults so there is a file to edit.
/// let config = AppConfig::load_or_init(&AppPaths::new().settings_file).unwrap();
/// println!("update every {:?}", config.schedule.update_delay());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Debounce timer periods.
    pub schedule: ScheduleConfig,
    /// Template catalog source.
    pub catalog: CatalogConfig,
    /// Render service settings.
    pub render: RenderConfig,
    /// Speech listener settings.
    pub speech: SpeechConfig,
    /// Global hotkey bindings.
    pub hotkey: HotkeyConfig,
    /// Window settings.
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load `path`, or write the defaults there when it does not exist yet.
    ///
    /// Failing to write is not fatal; the defaults are still returned.
    pub fn load_or_init(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Self::default();
        match config.save_to(path) {
            Ok(()) => log::info!("config: wrote defaults to {}", path.display()),
            Err(e) => log::warn!("config: could not write {}: {e}", path.display()),
        }
        Ok(config)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
