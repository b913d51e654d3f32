//! Energy-based voice activity detection.
//!
//! Audio is judged in 30 ms frames (480 samples at 16 kHz).  A frame is
//! *voice* when its RMS amplitude exceeds the current threshold.
//!
//! The threshold starts at a configured floor.  [`VadDetector::calibrate`]
//! raises it to `ambient_rms × AMBIENT_FACTOR` from a stretch of room noise,
//! and [`VadDetector::adapt`] keeps following the noise level between
//! phrases.  Neither ever takes it below the floor.

/// Samples per frame at 16 kHz.
pub const FRAME_SIZE: usize = 480;

/// Voice must be this much louder than the measured ambient level.
pub const AMBIENT_FACTOR: f32 = 1.5;

/// Weight of each new silent frame in the running ambient estimate.
const ADAPT_RATE: f32 = 0.05;

/// RMS amplitude of `frame`; `0.0` for an empty frame.
///
/// ```rust
/// use memegen_live::audio::frame_rms;
///
/// assert_eq!(frame_rms(&[]), 0.0);
/// assert!((frame_rms(&[0.5, -0.5, 0.5, -0.5]) - 0.5).abs() < 1e-6);
/// ```
pub fn frame_rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    let mean_sq: f32 = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
    mean_sq.sqrt()
}

// ---------------------------------------------------------------------------
// VadDetector
// ---------------------------------------------------------------------------

/// Frame classifier with an adjustable energy threshold.
///
/// # Example
///
/// ```rust
/// use memegen_live::audio::VadDetector;
///
/// let mut vad = VadDetector::new(0.01);
/// assert!(vad.is_voice(&[0.5; 480]));
///
/// // A noisy room pushes the threshold up.
/// vad.calibrate(&[0.1; 16_000]);
/// assert!((vad.threshold() - 0.15).abs() < 1e-6);
/// assert!(!vad.is_voice(&[0.12; 480]));
/// ```
#[derive(Debug, Clone)]
pub struct VadDetector {
    floor: f32,
    threshold: f32,
}

impl VadDetector {
    /// Create a detector whose threshold never drops below `floor`.
    ///
    /// `0.01` suits a quiet room; noisy rooms are handled by calibration.
    pub fn new(floor: f32) -> Self {
        let floor = floor.max(0.0);
        Self {
            floor,
            threshold: floor,
        }
    }

    /// RMS threshold currently in use.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns `true` when `frame` is louder than the threshold.
    pub fn is_voice(&self, frame: &[f32]) -> bool {
        !frame.is_empty() && frame_rms(frame) > self.threshold
    }

    /// Set the threshold from a recording of ambient noise.
    pub fn calibrate(&mut self, ambient: &[f32]) {
        let rms = frame_rms(ambient);
        self.threshold = (rms * AMBIENT_FACTOR).max(self.floor);
        log::info!(
            "speech: ambient level {rms:.4}, energy threshold {:.4}",
            self.threshold
        );
    }

    /// Fold one non-speech frame into the threshold.
    pub fn adapt(&mut self, frame: &[f32]) {
        let target = frame_rms(frame) * AMBIENT_FACTOR;
        let next = self.threshold * (1.0 - ADAPT_RATE) + target * ADAPT_RATE;
        self.threshold = next.max(self.floor);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_is_not_voice() {
        let vad = VadDetector::new(0.01);
        assert!(!vad.is_voice(&[0.0; FRAME_SIZE]));
        assert!(!vad.is_voice(&[]));
    }

    #[test]
    fn loud_frame_is_voice() {
        let vad = VadDetector::new(0.01);
        assert!(vad.is_voice(&[0.2; FRAME_SIZE]));
    }

    #[test]
    fn calibration_never_goes_below_floor() {
        let mut vad = VadDetector::new(0.05);
        vad.calibrate(&[0.001; 1600]);
        assert!((vad.threshold() - 0.05).abs() < 1e-7);
    }

    #[test]
    fn calibration_of_empty_audio_keeps_floor() {
        let mut vad = VadDetector::new(0.02);
        vad.calibrate(&[]);
        assert!((vad.threshold() - 0.02).abs() < 1e-7);
    }

    #[test]
    fn adapt_moves_toward_ambient_level() {
        let mut vad = VadDetector::new(0.01);
        for _ in 0..200 {
            vad.adapt(&[0.1; FRAME_SIZE]);
        }
        // Converges on 0.1 × 1.5.
        assert!((vad.threshold() - 0.15).abs() < 1e-3, "{}", vad.threshold());

        for _ in 0..400 {
            vad.adapt(&[0.0; FRAME_SIZE]);
        }
        assert!((vad.threshold() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn negative_floor_is_clamped() {
        let vad = VadDetector::new(-1.0);
        assert_eq!(vad.threshold(), 0.0);
    }
}
