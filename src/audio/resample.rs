//! Channel mixing and resampling to Whisper's input format.
//!
//! Whisper wants 16 kHz mono `f32`.  Capture delivers whatever the device
//! prefers, so every chunk goes through [`to_whisper_input`]: downmix with
//! [`stereo_to_mono`], then [`resample_to_16k`] by linear interpolation.

use super::capture::AudioChunk;

/// Sample rate expected by the STT engine.
pub const TARGET_RATE: u32 = 16_000;

/// Average interleaved channels into one.
///
/// `channels == 0` yields an empty vector; a trailing partial frame is
/// dropped.
///
/// ```rust
/// use memegen_live::audio::stereo_to_mono;
///
/// let mono = stereo_to_mono(&[0.5, -0.5, 0.2, 0.4], 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

/// Linear-interpolation resampler from `source_rate` to 16 kHz.
///
/// ```rust
/// use memegen_live::audio::resample_to_16k;
///
/// assert_eq!(resample_to_16k(&[0.5; 480], 48_000).len(), 160);
/// assert_eq!(resample_to_16k(&[0.5; 80], 8_000).len(), 160);
/// ```
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_RATE || source_rate == 0 {
        return samples.to_vec();
    }
    if samples.is_empty() {
        return Vec::new();
    }

    let step = source_rate as f64 / TARGET_RATE as f64;
    let output_len = (samples.len() as f64 / step).ceil() as usize;
    let last = samples.len() - 1;

    (0..output_len)
        .map(|i| {
            let pos = i as f64 * step;
            let idx = (pos as usize).min(last);
            let frac = (pos - idx as f64) as f32;
            match samples.get(idx + 1) {
                Some(&next) => samples[idx] * (1.0 - frac) + next * frac,
                None => samples[idx],
            }
        })
        .collect()
}

/// Convert one capture chunk to 16 kHz mono.
pub fn to_whisper_input(chunk: &AudioChunk) -> Vec<f32> {
    let mono = stereo_to_mono(&chunk.samples, chunk.channels);
    resample_to_16k(&mono, chunk.sample_rate)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
