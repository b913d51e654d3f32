//! Speech input: microphone phrases turned into session events.
//!
//! ```text
//! AudioCapture ──AudioChunk──▶ SpeechListener thread
//!                                │ ambient calibration (ambient_secs)
//!                                │ UtteranceSegmenter (pause / min / max)
//!                                │ SttEngine::transcribe
//!                                │ clean_transcript
//!                                ▼
//!          SessionEvent::Transcribed(text) | SessionEvent::RecognitionFailed
//! ```
//!
//! The listening flag is shared with the UI and the hotkey; while it is off
//! the microphone keeps running but audio is discarded.

pub mod listener;
pub mod transcript;

pub use listener::{SpeechListener, SpeechWorker};
pub use transcript::clean_transcript;
