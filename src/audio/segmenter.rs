//! Split a continuous 16 kHz stream into spoken phrases.
//!
//! ```text
//!            voice frame                    pause_secs of silence
//!  waiting ──────────────▶ in phrase ───────────────────────────▶ emit
//!     ▲  (pre-roll kept)       │  max_phrase_secs reached ──────▶ emit
//!     └────────────────────────┘
//! ```
//!
//! Emitted phrases start with the pre-roll and lose their trailing silence.
//! Phrases with less than `min_phrase_secs` of voiced frames are dropped.

use crate::config::SpeechConfig;

use super::buffer::RingBuffer;
use super::vad::{VadDetector, FRAME_SIZE};

const SAMPLE_RATE: f32 = 16_000.0;

/// Pre-roll kept in front of every phrase.
const PRE_ROLL_SECS: f32 = 0.3;

/// Timing limits for [`UtteranceSegmenter`], in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmenterLimits {
    pub pause_secs: f32,
    pub min_phrase_secs: f32,
    pub max_phrase_secs: f32,
}

impl From<&SpeechConfig> for SegmenterLimits {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            pause_secs: config.pause_secs,
            min_phrase_secs: config.min_phrase_secs,
            max_phrase_secs: config.max_phrase_secs,
        }
    }
}

/// Whole frames covering `secs`, ignoring float noise in the last digit.
fn frames_for(secs: f32) -> usize {
    let frames = secs.max(0.0) as f64 * SAMPLE_RATE as f64 / FRAME_SIZE as f64;
    (frames - 1e-6).ceil().max(0.0) as usize
}

// ---------------------------------------------------------------------------
// UtteranceSegmenter
// ---------------------------------------------------------------------------

pub struct UtteranceSegmenter {
    vad: VadDetector,
    adaptive: bool,
    pause_frames: usize,
    min_voiced_frames: usize,
    max_samples: usize,

    pre_roll: RingBuffer<f32>,
    /// Samples not yet forming a whole frame.
    carry: Vec<f32>,
    phrase: Vec<f32>,
    in_phrase: bool,
    voiced_frames: usize,
    silent_frames: usize,
}

impl UtteranceSegmenter {
    /// `adaptive` lets the VAD threshold follow the noise between phrases.
    pub fn new(vad: VadDetector, limits: SegmenterLimits, adaptive: bool) -> Self {
        Self {
            vad,
            adaptive,
            pause_frames: frames_for(limits.pause_secs).max(1),
            min_voiced_frames: frames_for(limits.min_phrase_secs),
            max_samples: ((limits.max_phrase_secs.max(0.1) * SAMPLE_RATE) as usize)
                .max(FRAME_SIZE),
            pre_roll: RingBuffer::new(frames_for(PRE_ROLL_SECS).max(1) * FRAME_SIZE),
            carry: Vec::with_capacity(FRAME_SIZE),
            phrase: Vec::new(),
            in_phrase: false,
            voiced_frames: 0,
            silent_frames: 0,
        }
    }

    pub fn vad(&self) -> &VadDetector {
        &self.vad
    }

    pub fn vad_mut(&mut self) -> &mut VadDetector {
        &mut self.vad
    }

    pub fn is_in_phrase(&self) -> bool {
        self.in_phrase
    }

    /// Feed 16 kHz mono samples; returns every phrase completed by them.
    pub fn push(&mut self, samples: &[f32]) -> Vec<Vec<f32>> {
        let mut done = Vec::new();
        self.carry.extend_from_slice(samples);

        let whole = self.carry.len() / FRAME_SIZE * FRAME_SIZE;
        let frames: Vec<f32> = self.carry.drain(..whole).collect();
        for frame in frames.chunks_exact(FRAME_SIZE) {
            if let Some(phrase) = self.push_frame(frame) {
                done.push(phrase);
            }
        }
        done
    }

    /// End the current phrase now, e.g. when listening is paused.
    pub fn flush(&mut self) -> Option<Vec<f32>> {
        self.carry.clear();
        if self.in_phrase {
            self.finish()
        } else {
            None
        }
    }

    /// Forget everything buffered.
    pub fn reset(&mut self) {
        self.carry.clear();
        self.pre_roll.clear();
        self.phrase.clear();
        self.in_phrase = false;
        self.voiced_frames = 0;
        self.silent_frames = 0;
    }

    fn push_frame(&mut self, frame: &[f32]) -> Option<Vec<f32>> {
        let voice = self.vad.is_voice(frame);

        if !self.in_phrase {
            if !voice {
                if self.adaptive {
                    self.vad.adapt(frame);
                }
                self.pre_roll.push_slice(frame);
                return None;
            }
            log::debug!("speech: phrase started");
            self.in_phrase = true;
            self.phrase = self.pre_roll.drain();
            self.voiced_frames = 0;
            self.silent_frames = 0;
        }

        self.phrase.extend_from_slice(frame);
        if voice {
            self.voiced_frames += 1;
            self.silent_frames = 0;
        } else {
            self.silent_frames += 1;
        }

        if self.silent_frames >= self.pause_frames || self.phrase.len() >= self.max_samples {
            self.finish()
        } else {
            None
        }
    }

    fn finish(&mut self) -> Option<Vec<f32>> {
        let mut phrase = std::mem::take(&mut self.phrase);
        let trailing = self.silent_frames * FRAME_SIZE;
        phrase.truncate(phrase.len().saturating_sub(trailing));

        let voiced = self.voiced_frames;
        self.in_phrase = false;
        self.voiced_frames = 0;
        self.silent_frames = 0;

        if voiced < self.min_voiced_frames.max(1) {
            log::debug!("speech: dropped {voiced}-frame blip");
            return None;
        }
        log::debug!(
            "speech: phrase of {:.2}s",
            phrase.len() as f32 / SAMPLE_RATE
        );
        Some(phrase)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
