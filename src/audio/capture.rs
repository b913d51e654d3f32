//! Microphone capture via `cpal`.
//!
//! [`AudioCapture`] opens the default input device in its preferred format
//! and forwards every hardware buffer as an [`AudioChunk`] of `f32` samples.
//! The returned [`StreamHandle`] keeps the stream alive; drop it to stop.

use std::sync::mpsc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use thiserror::Error;

/// One hardware buffer: interleaved samples in `[-1.0, 1.0]`.
#[derive(Debug, Clone)]
pub struct AudioChunk {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// RAII guard for the running cpal stream.
pub struct StreamHandle {
    _stream: cpal::Stream,
}

// ---------------------------------------------------------------------------
// CaptureError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("no input device found on the default audio host")]
    NoDevice,

    #[error("failed to query default input config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("input sample format {0:?} is not supported")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error("failed to build input stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

// ---------------------------------------------------------------------------
// AudioCapture
// ---------------------------------------------------------------------------

/// The default microphone, ready to stream.
///
/// ```rust,no_run
/// use std::sync::mpsc;
/// use memegen_live::audio::{AudioCapture, AudioChunk};
///
/// let (tx, rx) = mpsc::channel::<AudioChunk>();
/// let capture = AudioCapture::new().unwrap();
/// let _handle = capture.start(tx).unwrap();
/// let chunk = rx.recv().unwrap();
/// println!("{} samples @ {} Hz", chunk.samples.len(), chunk.sample_rate);
/// ```
pub struct AudioCapture {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
}

impl AudioCapture {
    /// Open the system default input device.
    pub fn new() -> Result<Self, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoDevice)?;

        let supported = device.default_input_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        log::info!(
            "speech: input device {:?}, {} Hz, {} ch, {:?}",
            device.name().unwrap_or_else(|_| "unknown".into()),
            config.sample_rate.0,
            config.channels,
            sample_format
        );

        Ok(Self {
            device,
            config,
            sample_format,
        })
    }

    /// Start streaming chunks to `tx`.
    ///
    /// Runs on cpal's audio thread.  A dropped receiver is ignored so the
    /// callback never panics.
    pub fn start(&self, tx: mpsc::Sender<AudioChunk>) -> Result<StreamHandle, CaptureError> {
        let sample_rate = self.config.sample_rate.0;
        let channels = self.config.channels;
        let on_error = |err: cpal::StreamError| log::error!("speech: cpal stream error: {err}");

        let stream = match self.sample_format {
            cpal::SampleFormat::F32 => self.device.build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let _ = tx.send(AudioChunk {
                        samples: data.to_vec(),
                        sample_rate,
                        channels,
                    });
                },
                on_error,
                None,
            )?,
            cpal::SampleFormat::I16 => self.device.build_input_stream(
                &self.config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let _ = tx.send(AudioChunk {
                        samples: i16_to_f32(data),
                        sample_rate,
                        channels,
                    });
                },
                on_error,
                None,
            )?,
            other => return Err(CaptureError::UnsupportedFormat(other)),
        };

        stream.play()?;
        Ok(StreamHandle { _stream: stream })
    }

    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    pub fn channels(&self) -> u16 {
        self.config.channels
    }
}

fn i16_to_f32(data: &[i16]) -> Vec<f32> {
    data.iter().map(|&s| s as f32 / i16::MAX as f32).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
