//! STT engine trait and the Whisper implementation.
//!
//! [`SttEngine`] is object-safe and `Send + Sync` so the speech listener can
//! hold an `Arc<dyn SttEngine>`.  [`WhisperEngine`] wraps a
//! `whisper_rs::WhisperContext`; [`MockSttEngine`] (tests only) returns a
//! canned response.

use std::path::Path;

use thiserror::Error;
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::stt::transcribe::{TranscribeParams, TranscriptionResult};

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Error)]
pub enum SttError {
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Whisper context initialisation failed: {0}")]
    ContextInit(String),

    #[error("Transcription error: {0}")]
    Transcription(String),

    #[error("Audio too short: minimum 0.5 s (8 000 samples at 16 kHz)")]
    AudioTooShort,

    #[error("Audio too long: maximum 30 s (480 000 samples at 16 kHz)")]
    AudioTooLong,
}

// ---------------------------------------------------------------------------
// SttEngine trait
// ---------------------------------------------------------------------------

/// Speech-to-text over 16 kHz mono `f32` audio.
///
/// Audio shorter than [`MIN_AUDIO_SAMPLES`] or longer than
/// [`MAX_AUDIO_SAMPLES`] is rejected.
pub trait SttEngine: Send + Sync {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError>;
}

// Compile-time assertion: Box<dyn SttEngine> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SttEngine>) {}
};

/// 0.5 s at 16 kHz.
pub const MIN_AUDIO_SAMPLES: usize = 8_000;
/// One Whisper window: 30 s at 16 kHz.
pub const MAX_AUDIO_SAMPLES: usize = 480_000;

fn check_length(audio: &[f32]) -> Result<(), SttError> {
    if audio.len() < MIN_AUDIO_SAMPLES {
        return Err(SttError::AudioTooShort);
    }
    if audio.len() > MAX_AUDIO_SAMPLES {
        return Err(SttError::AudioTooLong);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// WhisperEngine
// ---------------------------------------------------------------------------

/// A loaded GGML model.  Each call creates its own `WhisperState`.
pub struct WhisperEngine {
    ctx: WhisperContext,
    params: TranscribeParams,
}

impl std::fmt::Debug for WhisperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperEngine")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// SAFETY: WhisperContext is Send+Sync as declared by whisper-rs; the weights
// are read-only after loading.
unsafe impl Send for WhisperEngine {}
unsafe impl Sync for WhisperEngine {}

impl WhisperEngine {
    /// Load the GGML model at `model_path`.
    pub fn load(model_path: impl AsRef<Path>, params: TranscribeParams) -> Result<Self, SttError> {
        let path = model_path.as_ref();
        if !path.exists() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }

        let path_str = path.to_str().ok_or_else(|| {
            SttError::ModelNotFound(format!(
                "model path contains non-UTF-8 characters: {}",
                path.display()
            ))
        })?;

        let mut ctx_params = WhisperContextParameters::default();
        ctx_params.use_gpu(params.use_gpu);
        let ctx = WhisperContext::new_with_params(path_str, ctx_params)
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        log::info!("speech: loaded model {}", path.display());
        Ok(Self { ctx, params })
    }

    /// Transcribe `audio`, also reporting inference time.
    pub fn transcribe_full(&self, audio: &[f32]) -> Result<TranscriptionResult, SttError> {
        check_length(audio)?;

        let mut fp = FullParams::new(SamplingStrategy::Greedy {
            best_of: self.params.best_of,
        });
        fp.set_language(self.params.language_hint());
        fp.set_n_threads(self.params.n_threads);
        fp.set_single_segment(self.params.single_segment);
        fp.set_no_context(true);
        fp.set_suppress_blank(true);
        fp.set_print_special(false);
        fp.set_print_progress(false);
        fp.set_print_realtime(false);
        fp.set_print_timestamps(false);

        let mut state = self
            .ctx
            .create_state()
            .map_err(|e| SttError::ContextInit(e.to_string()))?;

        let wall_start = std::time::Instant::now();
        state
            .full(fp, audio)
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let n_segments = state
            .full_n_segments()
            .map_err(|e| SttError::Transcription(e.to_string()))?;

        let mut text = String::new();
        for i in 0..n_segments {
            let segment = state
                .full_get_segment_text(i)
                .map_err(|e| SttError::Transcription(format!("segment {i}: {e}")))?;
            text.push_str(&segment);
        }

        Ok(TranscriptionResult {
            text: text.trim().to_string(),
            duration_ms: wall_start.elapsed().as_millis(),
        })
    }
}

impl SttEngine for WhisperEngine {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        let result = self.transcribe_full(audio)?;
        log::debug!("speech: inference took {} ms", result.duration_ms);
        Ok(result.text)
    }
}

// ---------------------------------------------------------------------------
// MockSttEngine  (test-only)
// ---------------------------------------------------------------------------

/// Returns a fixed response after enforcing the length contract.
#[cfg(test)]
pub struct MockSttEngine {
    response: Result<String, SttError>,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockSttEngine {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            calls: Default::default(),
        }
    }

    pub fn err(error: SttError) -> Self {
        Self {
            response: Err(error),
            calls: Default::default(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl SttEngine for MockSttEngine {
    fn transcribe(&self, audio: &[f32]) -> Result<String, SttError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        check_length(audio)?;
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_ok_returns_configured_text() {
        let engine = MockSttEngine::ok("one does not simply");
        let audio = vec![0.0f32; MIN_AUDIO_SAMPLES];
        assert_eq!(engine.transcribe(&audio).unwrap(), "one does not simply");
        assert_eq!(engine.calls(), 1);
    }

    #[test]
    fn mock_err_returns_configured_error() {
        let engine = MockSttEngine::err(SttError::Transcription("boom".into()));
        let err = engine.transcribe(&vec![0.0f32; MIN_AUDIO_SAMPLES]).unwrap_err();
        assert!(matches!(err, SttError::Transcription(_)));
    }

    #[test]
    fn length_boundaries() {
        let engine = MockSttEngine::ok("ok");
        assert!(engine.transcribe(&vec![0.0f32; MIN_AUDIO_SAMPLES]).is_ok());
        assert!(matches!(
            engine.transcribe(&vec![0.0f32; MIN_AUDIO_SAMPLES - 1]),
            Err(SttError::AudioTooShort)
        ));
        assert!(matches!(
            engine.transcribe(&vec![0.0f32; MAX_AUDIO_SAMPLES + 1]),
            Err(SttError::AudioTooLong)
        ));
    }

    #[test]
    fn load_missing_model_returns_model_not_found() {
        let result = WhisperEngine::load("/nonexistent/model.bin", TranscribeParams::default());
        assert!(
            matches!(result, Err(SttError::ModelNotFound(_))),
            "expected ModelNotFound, got: {result:?}"
        );
    }

    #[test]
    fn box_dyn_stt_engine_compiles() {
        let engine: Box<dyn SttEngine> = Box::new(MockSttEngine::ok("ok"));
        let _ = engine.transcribe(&vec![0.0f32; MIN_AUDIO_SAMPLES]);
    }

    #[test]
    fn error_display_mentions_path() {
        let e = SttError::ModelNotFound("/some/path.bin".into());
        assert!(e.to_string().contains("/some/path.bin"));
    }
}
