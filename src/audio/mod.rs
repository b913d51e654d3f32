//! Audio front end for the speech listener.
//!
//! # Pipeline
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → to_whisper_input
//!           → UtteranceSegmenter (VadDetector + RingBuffer pre-roll)
//!           → one Vec<f32> per spoken phrase
//! ```
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::mpsc;
//! use memegen_live::audio::{
//!     to_whisper_input, AudioCapture, AudioChunk, SegmenterLimits, UtteranceSegmenter,
//!     VadDetector,
//! };
//! use memegen_live::config::SpeechConfig;
//!
//! let config = SpeechConfig::default();
//! let mut segmenter = UtteranceSegmenter::new(
//!     VadDetector::new(config.energy_threshold),
//!     SegmenterLimits::from(&config),
//!     config.dynamic_energy,
//! );
//!
//! let (tx, rx) = mpsc::channel::<AudioChunk>();
//! let capture = AudioCapture::new().unwrap();
//! let _handle = capture.start(tx).unwrap();
//!
//! while let Ok(chunk) = rx.recv() {
//!     for phrase in segmenter.push(&to_whisper_input(&chunk)) {
//!         println!("phrase of {} samples", phrase.len());
//!     }
//! }
//! ```

pub mod buffer;
pub mod capture;
pub mod resample;
pub mod segmenter;
pub mod vad;

pub use buffer::RingBuffer;
pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use resample::{resample_to_16k, stereo_to_mono, to_whisper_input, TARGET_RATE};
pub use segmenter::{SegmenterLimits, UtteranceSegmenter};
pub use vad::{frame_rms, VadDetector, FRAME_SIZE};
