//! Background speech recognition thread.
//!
//! Whisper inference blocks for hundreds of milliseconds, so recognition runs
//! on its own OS thread and talks to the session through
//! `tokio::sync::mpsc::Sender::blocking_send`.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{Receiver, RecvTimeoutError},
    Arc,
};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::audio::{to_whisper_input, AudioChunk, SegmenterLimits, UtteranceSegmenter, VadDetector};
use crate::config::SpeechConfig;
use crate::session::SessionEvent;
use crate::stt::{SttEngine, MAX_AUDIO_SAMPLES, MIN_AUDIO_SAMPLES};

use super::transcript::clean_transcript;

const SAMPLE_RATE: f32 = 16_000.0;

/// How often the thread wakes without audio to check the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// SpeechWorker
// ---------------------------------------------------------------------------

/// Everything the recognition thread does, minus the thread.
///
/// Samples first go into ambient calibration, then into the segmenter; each
/// finished phrase is transcribed into one [`SessionEvent`].
pub struct SpeechWorker {
    segmenter: UtteranceSegmenter,
    stt: Arc<dyn SttEngine>,
    ambient: Option<Ambient>,
    paused: bool,
}

/// Samples collected for the initial noise-floor calibration.
struct Ambient {
    needed: usize,
    samples: Vec<f32>,
}

impl SpeechWorker {
    pub fn new(config: &SpeechConfig, stt: Arc<dyn SttEngine>) -> Self {
        let needed = (config.ambient_secs.max(0.0) * SAMPLE_RATE) as usize;
        Self {
            segmenter: UtteranceSegmenter::new(
                VadDetector::new(config.energy_threshold),
                SegmenterLimits::from(config),
                config.dynamic_energy,
            ),
            stt,
            ambient: (needed > 0).then(|| Ambient {
                needed,
                samples: Vec::with_capacity(needed),
            }),
            paused: false,
        }
    }

    pub fn is_calibrating(&self) -> bool {
        self.ambient.is_some()
    }

    pub fn threshold(&self) -> f32 {
        self.segmenter.vad().threshold()
    }

    /// Feed 16 kHz mono samples; returns one event per completed phrase.
    pub fn push(&mut self, samples: &[f32]) -> Vec<SessionEvent> {
        if let Some(ambient) = self.ambient.as_mut() {
            ambient.samples.extend_from_slice(samples);
            if ambient.samples.len() < ambient.needed {
                return Vec::new();
            }
            self.segmenter.vad_mut().calibrate(&ambient.samples);
            self.ambient = None;
            return Vec::new();
        }

        self.segmenter
            .push(samples)
            .into_iter()
            .map(|phrase| self.recognize(phrase))
            .collect()
    }

    /// Stop or resume listening.
    ///
    /// A phrase already spoken when pausing is cut off there and still
    /// transcribed; its event is returned.
    pub fn set_paused(&mut self, paused: bool) -> Option<SessionEvent> {
        let mut last = None;
        if paused && !self.paused {
            log::info!("speech: listening paused");
            last = self.segmenter.flush().map(|phrase| self.recognize(phrase));
            self.segmenter.reset();
        } else if !paused && self.paused {
            log::info!("speech: listening resumed");
        }
        self.paused = paused;
        last
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Transcribe one phrase.
    pub fn recognize(&self, mut phrase: Vec<f32>) -> SessionEvent {
        if phrase.len() < MIN_AUDIO_SAMPLES {
            phrase.resize(MIN_AUDIO_SAMPLES, 0.0);
        }
        phrase.truncate(MAX_AUDIO_SAMPLES);

        match self.stt.transcribe(&phrase) {
            Ok(raw) => {
                let text = clean_transcript(&raw);
                if text.is_empty() {
                    log::debug!("speech: nothing intelligible in {raw:?}");
                    SessionEvent::RecognitionFailed("could not understand audio".into())
                } else {
                    log::info!("speech: heard {text:?}");
                    SessionEvent::Transcribed(text)
                }
            }
            Err(e) => {
                log::warn!("speech: recognition failed: {e}");
                SessionEvent::RecognitionFailed(e.to_string())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SpeechListener
// ---------------------------------------------------------------------------

/// Handle to the running recognition thread.  Dropping it stops the thread
/// at its next poll.
pub struct SpeechListener {
    stop: Arc<AtomicBool>,
    _thread: std::thread::JoinHandle<()>,
}

impl SpeechListener {
    /// Spawn the recognition thread.
    ///
    /// * `audio`     receives chunks from [`crate::audio::AudioCapture::start`].
    /// * `events`    is the session's event channel.
    /// * `listening` gates recognition; while `false` audio is discarded.
    pub fn start(
        config: &SpeechConfig,
        stt: Arc<dyn SttEngine>,
        audio: Receiver<AudioChunk>,
        events: mpsc::Sender<SessionEvent>,
        listening: Arc<AtomicBool>,
    ) -> std::io::Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let mut worker = SpeechWorker::new(config, stt);

        let thread = std::thread::Builder::new()
            .name("speech-listener".into())
            .spawn(move || {
                log::info!("speech: calibrating for ambient noise");
                while !stop_flag.load(Ordering::Relaxed) {
                    let chunk = match audio.recv_timeout(POLL_INTERVAL) {
                        Ok(chunk) => chunk,
                        Err(RecvTimeoutError::Timeout) => continue,
                        Err(RecvTimeoutError::Disconnected) => {
                            log::warn!("speech: audio stream closed");
                            break;
                        }
                    };

                    let mut out: Vec<SessionEvent> = worker
                        .set_paused(!listening.load(Ordering::Relaxed))
                        .into_iter()
                        .collect();
                    if !worker.is_paused() {
                        out.extend(worker.push(&to_whisper_input(&chunk)));
                    }

                    for event in out {
                        if events.blocking_send(event).is_err() {
                            log::debug!("speech: session gone, stopping");
                            return;
                        }
                    }
                }
            })?;

        Ok(Self {
            stop,
            _thread: thread,
        })
    }
}

impl Drop for SpeechListener {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::FRAME_SIZE;
    use crate::stt::{MockSttEngine, SttError};

    fn config() -> SpeechConfig {
        SpeechConfig {
            energy_threshold: 0.01,
            dynamic_energy: false,
            ambient_secs: 0.0,
            pause_secs: 0.3,
            min_phrase_secs: 0.09,
            max_phrase_secs: 5.0,
            ..SpeechConfig::default()
        }
    }

    fn worker(stt: MockSttEngine) -> (SpeechWorker, Arc<MockSttEngine>) {
        let stt = Arc::new(stt);
        (SpeechWorker::new(&config(), stt.clone()), stt)
    }

    fn phrase() -> Vec<f32> {
        let mut audio = vec![0.0; 10 * FRAME_SIZE];
        audio.extend(vec![0.3; 20 * FRAME_SIZE]);
        audio.extend(vec![0.0; 10 * FRAME_SIZE]);
        audio
    }

    #[test]
    fn spoken_phrase_becomes_transcript() {
        let (mut w, stt) = worker(MockSttEngine::ok(" one does not simply "));
        let events = w.push(&phrase());
        assert_eq!(
            events,
            vec![SessionEvent::Transcribed("one does not simply".into())]
        );
        assert_eq!(stt.calls(), 1);
    }

    #[test]
    fn short_phrase_is_padded_for_whisper() {
        let (w, _) = worker(MockSttEngine::ok("ok"));
        let event = w.recognize(vec![0.3; 1_000]);
        assert_eq!(event, SessionEvent::Transcribed("ok".into()));
    }

    #[test]
    fn blank_transcript_is_recognition_failure() {
        let (mut w, _) = worker(MockSttEngine::ok("[BLANK_AUDIO]"));
        let events = w.push(&phrase());
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::RecognitionFailed(_)]
        ));
    }

    #[test]
    fn engine_error_is_recognition_failure() {
        let (mut w, _) = worker(MockSttEngine::err(SttError::Transcription("boom".into())));
        let events = w.push(&phrase());
        match events.as_slice() {
            [SessionEvent::RecognitionFailed(reason)] => assert!(reason.contains("boom")),
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn silence_reaches_no_engine() {
        let (mut w, stt) = worker(MockSttEngine::ok("never"));
        assert!(w.push(&vec![0.0; 100 * FRAME_SIZE]).is_empty());
        assert_eq!(stt.calls(), 0);
    }

    #[test]
    fn calibration_consumes_ambient_audio_first() {
        let stt = Arc::new(MockSttEngine::ok("hello"));
        let cfg = SpeechConfig {
            ambient_secs: 0.5,
            ..config()
        };
        let mut w = SpeechWorker::new(&cfg, stt.clone());
        assert!(w.is_calibrating());

        // Loud ambient noise raises the threshold above the floor.
        assert!(w.push(&vec![0.1; 8_000]).is_empty());
        assert!(!w.is_calibrating());
        assert!(w.threshold() > 0.1, "{}", w.threshold());
        assert_eq!(stt.calls(), 0);
    }

    #[test]
    fn pausing_delivers_phrase_in_progress() {
        let (mut w, stt) = worker(MockSttEngine::ok("hello"));
        assert!(w.push(&vec![0.3; 20 * FRAME_SIZE]).is_empty());

        assert_eq!(
            w.set_paused(true),
            Some(SessionEvent::Transcribed("hello".into()))
        );
        assert!(w.is_paused());
        assert_eq!(w.set_paused(true), None);
        assert_eq!(w.set_paused(false), None);

        // Nothing of the old phrase is left to finish later.
        assert!(w.push(&vec![0.0; 20 * FRAME_SIZE]).is_empty());
        assert_eq!(stt.calls(), 1);
    }

    #[test]
    fn pausing_in_silence_transcribes_nothing() {
        let (mut w, stt) = worker(MockSttEngine::ok("hello"));
        w.push(&vec![0.0; 20 * FRAME_SIZE]);
        assert_eq!(w.set_paused(true), None);
        assert_eq!(stt.calls(), 0);
    }

    #[tokio::test]
    async fn listener_forwards_events_to_session() {
        let (audio_tx, audio_rx) = std::sync::mpsc::channel();
        let (event_tx, mut event_rx) = mpsc::channel(8);
        let listening = Arc::new(AtomicBool::new(true));

        let _listener = SpeechListener::start(
            &config(),
            Arc::new(MockSttEngine::ok("brace yourselves")),
            audio_rx,
            event_tx,
            listening,
        )
        .unwrap();

        audio_tx
            .send(AudioChunk {
                samples: phrase(),
                sample_rate: 16_000,
                channels: 1,
            })
            .unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv())
            .await
            .unwrap();
        assert_eq!(
            event,
            Some(SessionEvent::Transcribed("brace yourselves".into()))
        );
    }
}
