//! # Audio Capture Module
//!
//! This module owns the microphone capture device and hands out fixed-size
//! time-domain sample windows on demand. It is built on CPAL (Cross-Platform
//! Audio Library).
//!
//! ## Features
//! - Automatic input device and config selection
//! - Explicit Idle/Active lifecycle with idempotent `start()`
//! - Rolling 2048-sample window, refreshed on each poll
//! - Typed capture errors (denied microphone vs. missing device)

use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Receiver;
use thiserror::Error;

/// Number of samples in the window handed to the pitch estimator.
///
/// Larger windows improve low-frequency resolution but increase latency.
/// 2048 samples is a good balance for the guitar's range (~46ms at 44.1kHz).
pub const WINDOW_SIZE: usize = 2048;

/// Captured chunks queued between the audio callback and the polling thread.
/// When the consumer lags the callback drops chunks instead of blocking.
const FRAME_QUEUE_DEPTH: usize = 64;

/// Errors raised while acquiring or starting the capture device.
///
/// `start()` surfaces these to the caller so a frontend can prompt the user;
/// the capture stays Idle and `start()` may be retried.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No input device exists, or the device disappeared mid-acquisition.
    #[error("no audio input device available")]
    DeviceUnavailable,
    /// The platform refused microphone access.
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),
    /// The device exposes no f32 input configuration.
    #[error("no supported f32 input format found")]
    UnsupportedFormat,
    /// Any other stream setup failure.
    #[error("audio stream error: {0}")]
    Stream(String),
}

impl From<cpal::BuildStreamError> for CaptureError {
    fn from(err: cpal::BuildStreamError) -> Self {
        match err {
            cpal::BuildStreamError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
            // Platform permission refusals surface as backend-specific errors.
            cpal::BuildStreamError::BackendSpecific { err } => {
                CaptureError::PermissionDenied(err.to_string())
            }
            other => CaptureError::Stream(other.to_string()),
        }
    }
}

impl From<cpal::PlayStreamError> for CaptureError {
    fn from(err: cpal::PlayStreamError) -> Self {
        match err {
            cpal::PlayStreamError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
            other => CaptureError::PermissionDenied(other.to_string()),
        }
    }
}

impl From<cpal::DefaultStreamConfigError> for CaptureError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        match err {
            cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureError::DeviceUnavailable,
            cpal::DefaultStreamConfigError::StreamTypeNotSupported => {
                CaptureError::UnsupportedFormat
            }
            other => CaptureError::Stream(other.to_string()),
        }
    }
}

impl From<cpal::SupportedStreamConfigsError> for CaptureError {
    fn from(err: cpal::SupportedStreamConfigsError) -> Self {
        match err {
            cpal::SupportedStreamConfigsError::DeviceNotAvailable => {
                CaptureError::DeviceUnavailable
            }
            other => CaptureError::Stream(other.to_string()),
        }
    }
}

/// Live capture state: the cpal stream plus the channel it feeds.
struct ActiveCapture {
    stream: cpal::Stream,
    frames: Receiver<Vec<f32>>,
    sample_rate: u32,
}

/// Owns the microphone and the rolling sample window.
///
/// Constructed Idle; `start()`/`stop()` move it between Idle and Active.
/// A single instance owned by the caller suffices; no global state.
///
/// The cpal callback runs on its own audio thread, so captured chunks are
/// handed over a bounded channel and all window mutation happens on the
/// polling thread inside [`AudioCapture::window`].
pub struct AudioCapture {
    active: Option<ActiveCapture>,
    window: Vec<f32>,
}

impl AudioCapture {
    /// Creates an Idle capture. No device is touched until `start()`.
    pub fn new() -> Self {
        Self {
            active: None,
            window: Vec::new(),
        }
    }

    /// Acquires the default input device and starts streaming.
    ///
    /// Idempotent: calling while already Active is a no-op returning `Ok`.
    ///
    /// The stream targets the device's native sample rate (typically 44100
    /// or 48000 Hz) with an f32 format, preferring mono. Devices that only
    /// expose interleaved multi-channel input are accepted; the callback
    /// keeps the first channel.
    ///
    /// # Errors
    /// [`CaptureError::DeviceUnavailable`] when no input device exists,
    /// [`CaptureError::PermissionDenied`] when the platform refuses access.
    /// On error the capture stays Idle and `start()` may be called again.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.active.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::DeviceUnavailable)?;
        log::info!(
            "using audio input device: {}",
            device.name().unwrap_or_else(|_| "<unknown>".into())
        );

        let supported = select_input_config(&device)?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.into();
        log::info!("selected input config: {sample_rate} Hz, {channels} channel(s)");

        let (sender, receiver) = crossbeam_channel::bounded::<Vec<f32>>(FRAME_QUEUE_DEPTH);
        let err_fn = |err| log::error!("audio stream error: {err}");

        let stream = device.build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                // Keep the first channel of interleaved input.
                let chunk: Vec<f32> = if channels == 1 {
                    data.to_vec()
                } else {
                    data.iter().step_by(channels).copied().collect()
                };
                // Drop the chunk if the consumer has fallen behind rather
                // than block the audio thread.
                let _ = sender.try_send(chunk);
            },
            err_fn,
            None,
        )?;

        stream.play()?;

        // Zero-filled window until real samples arrive; the estimator's
        // noise gate treats it as silence.
        self.window.clear();
        self.window.resize(WINDOW_SIZE, 0.0);
        self.active = Some(ActiveCapture {
            stream,
            frames: receiver,
            sample_rate,
        });
        Ok(())
    }

    /// Releases the capture device. Safe to call when not started.
    ///
    /// Subsequent `window()` polls return `None` until `start()` again.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            if let Err(err) = active.stream.pause() {
                log::warn!("error pausing input stream: {err}");
            }
        }
        self.window.clear();
    }

    /// Whether the capture device is currently held.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Native sample rate of the running stream, `None` when Idle.
    pub fn sample_rate(&self) -> Option<u32> {
        self.active.as_ref().map(|active| active.sample_rate)
    }

    /// Returns the current sample window, or `None` when not started.
    ///
    /// Drains every chunk captured since the previous poll into the rolling
    /// window (oldest samples evicted) and returns the most recent
    /// [`WINDOW_SIZE`] samples. The buffer is overwritten on the next poll;
    /// the returned slice must not be retained past this call, which the
    /// borrow on `self` enforces.
    pub fn window(&mut self) -> Option<&[f32]> {
        let active = self.active.as_ref()?;
        while let Ok(chunk) = active.frames.try_recv() {
            self.window.extend_from_slice(&chunk);
        }
        // Keep only the newest WINDOW_SIZE samples.
        if self.window.len() > WINDOW_SIZE {
            let excess = self.window.len() - WINDOW_SIZE;
            self.window.drain(..excess);
        }
        Some(&self.window)
    }
}

impl Default for AudioCapture {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks an f32 input config for the device.
///
/// The device's default config wins outright when it is already mono f32.
/// Otherwise the supported ranges are scored: mono first, then closest
/// achievable rate to the device's default rate.
fn select_input_config(
    device: &cpal::Device,
) -> Result<cpal::SupportedStreamConfig, CaptureError> {
    let default_config = device.default_input_config()?;
    if default_config.sample_format() == cpal::SampleFormat::F32 && default_config.channels() == 1
    {
        return Ok(default_config);
    }

    let target_rate = default_config.sample_rate().0;
    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    find_supported_config(configs, target_rate).ok_or(CaptureError::UnsupportedFormat)
}

/// Finds the best f32 configuration for the target sample rate.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<cpal::SupportedStreamConfig> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let channel_penalty: u64 = if c.channels() == 1 { 0 } else { 1 << 32 };
            let achievable = target_rate.clamp(c.min_sample_rate().0, c.max_sample_rate().0);
            channel_penalty + u64::from(achievable.abs_diff(target_rate))
        })
        .map(|c| {
            let rate = target_rate.clamp(c.min_sample_rate().0, c.max_sample_rate().0);
            c.with_sample_rate(cpal::SampleRate(rate))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Device acquisition needs real hardware; these cover the lifecycle
    // guarantees around the Idle state.

    #[test]
    fn window_is_unavailable_when_idle() {
        let mut capture = AudioCapture::new();
        assert!(capture.window().is_none());
        assert!(capture.sample_rate().is_none());
        assert!(!capture.is_active());
    }

    #[test]
    fn stop_without_start_is_a_noop() {
        let mut capture = AudioCapture::new();
        capture.stop();
        capture.stop();
        assert!(!capture.is_active());
        assert!(capture.window().is_none());
    }
}
