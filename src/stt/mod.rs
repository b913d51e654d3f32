//! Speech-to-text engine.
//!
//! ```text
//!  [speech] model ──▶ ModelPaths::resolve ──▶ WhisperEngine::load
//!                                                   │
//!        phrase (16 kHz mono f32) ──▶ SttEngine::transcribe ──▶ text
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use memegen_live::config::{AppPaths, SpeechConfig};
//! use memegen_live::stt::{ModelPaths, SttEngine, TranscribeParams, WhisperEngine};
//!
//! let config = SpeechConfig::default();
//! let path = ModelPaths::from_app_paths(&AppPaths::new()).resolve(&config.model);
//! let engine = WhisperEngine::load(path, TranscribeParams::from_config(&config))
//!     .expect("model file present");
//!
//! let audio: Vec<f32> = vec![0.0; 16_000];
//! println!("{}", engine.transcribe(&audio).unwrap());
//! ```

pub mod engine;
pub mod model;
pub mod transcribe;

pub use engine::{SttEngine, SttError, WhisperEngine, MAX_AUDIO_SAMPLES, MIN_AUDIO_SAMPLES};
pub use model::{find_model_by_id, ModelInfo, ModelPaths, WHISPER_MODELS};
pub use transcribe::{TranscribeParams, TranscriptionResult};

#[cfg(test)]
pub use engine::MockSttEngine;
