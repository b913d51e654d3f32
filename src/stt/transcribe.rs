//! Parameters for one Whisper inference run and its result.

use crate::config::SpeechConfig;

/// Settings handed to Whisper for every phrase.
///
/// ```
/// use memegen_live::config::SpeechConfig;
/// use memegen_live::stt::TranscribeParams;
///
/// let params = TranscribeParams::from_config(&SpeechConfig::default());
/// assert_eq!(params.language, "en");
/// assert!(params.single_segment);
/// ```
#[derive(Debug, Clone)]
pub struct TranscribeParams {
    /// ISO-639-1 code, or `"auto"` for detection.
    pub language: String,

    /// Candidates per greedy decoding step.
    pub best_of: i32,

    /// Capped at 8; more threads stop helping.
    pub n_threads: i32,

    /// Phrases are short; one segment avoids split captions.
    pub single_segment: bool,

    pub use_gpu: bool,
}

impl Default for TranscribeParams {
    fn default() -> Self {
        Self {
            language: "en".into(),
            best_of: 1,
            n_threads: optimal_threads(),
            single_segment: true,
            use_gpu: false,
        }
    }
}

impl TranscribeParams {
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            language: config.language.clone(),
            use_gpu: config.use_gpu,
            ..Self::default()
        }
    }

    /// Language for whisper-rs; `None` lets the model detect it.
    pub fn language_hint(&self) -> Option<&str> {
        match self.language.trim() {
            "" | "auto" => None,
            lang => Some(lang),
        }
    }
}

pub(crate) fn optimal_threads() -> i32 {
    std::thread::available_parallelism()
        .map(|n| n.get().min(8) as i32)
        .unwrap_or(4)
}

/// Text of one phrase with the time inference took.
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    pub text: String,
    pub duration_ms: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_config_copies_language_and_gpu() {
        let config = SpeechConfig {
            language: "de".into(),
            use_gpu: true,
            ..SpeechConfig::default()
        };
        let params = TranscribeParams::from_config(&config);
        assert_eq!(params.language, "de");
        assert!(params.use_gpu);
        assert_eq!(params.best_of, 1);
    }

    #[test]
    fn auto_language_has_no_hint() {
        let params = TranscribeParams {
            language: "auto".into(),
            ..TranscribeParams::default()
        };
        assert_eq!(params.language_hint(), None);
        assert_eq!(TranscribeParams::default().language_hint(), Some("en"));
    }

    #[test]
    fn optimal_threads_is_bounded() {
        let t = optimal_threads();
        assert!((1..=8).contains(&t));
    }
}
