//! # Pitch Detection Module
//!
//! Fundamental-frequency estimation for a plucked guitar string, using
//! time-domain autocorrelation restricted to the guitar's frequency range.
//!
//! Autocorrelation is used instead of FFT peak-picking because a plucked
//! string has a harmonic-rich spectrum where the loudest bin is often an
//! overtone; the autocorrelation peak tracks the fundamental period.

/// Minimum RMS amplitude for pitch detection.
///
/// Windows below this are treated as silence or noise. Tuned for typical
/// microphone gain; a capture pipeline with different gain staging may need
/// to recalibrate and pass its own threshold.
pub const AMPLITUDE_THRESHOLD: f32 = 0.01;

// Search bounds for the fundamental. Low E is ~82 Hz and high E ~330 Hz,
// so 60-400 Hz covers the open strings with margin while bounding the
// lag range (and with it, cost per window).
const MIN_FREQUENCY: f32 = 60.0;
const MAX_FREQUENCY: f32 = 400.0;

/// Minimum peak autocorrelation value to accept a period as a real pitch.
/// Like the RMS gate, this is an unnormalized heuristic confidence floor.
const CORRELATION_THRESHOLD: f32 = 0.01;

/// Estimates the fundamental frequency of a sample window.
///
/// The search runs over integer lags between `sample_rate / 400` and
/// `sample_rate / 60` samples, computing the unnormalized autocorrelation
/// at each lag and keeping the maximum. No sub-sample refinement is
/// performed, so resolution is limited to whole-sample lag steps and
/// coarsens at higher pitches.
///
/// Cost is O(lag range × window length) per call, which fits comfortably
/// inside a ~16ms frame budget at 2048 samples and typical rates.
///
/// # Arguments
/// * `signal` - Input sample window, values in [-1, 1]
/// * `sample_rate` - Sample rate in Hz
/// * `amplitude_threshold` - Minimum RMS for detection (see [`AMPLITUDE_THRESHOLD`])
///
/// # Returns
/// * `Some(frequency)` - Estimated fundamental in Hz
/// * `None` - Silence below the gate, or no strong periodic correlation
pub fn detect_pitch_autocorr(
    signal: &[f32],
    sample_rate: u32,
    amplitude_threshold: f32,
) -> Option<f32> {
    let frame_size = signal.len();
    if frame_size == 0 || sample_rate == 0 {
        return None;
    }

    // --- Noise gate: RMS must clear the threshold ---
    let rms = (signal.iter().map(|&s| s * s).sum::<f32>() / frame_size as f32).sqrt();
    if rms < amplitude_threshold {
        return None;
    }

    // --- Candidate period range in samples ---
    let min_period = (sample_rate as f32 / MAX_FREQUENCY) as usize;
    let max_period =
        ((sample_rate as f32 / MIN_FREQUENCY) as usize).min(frame_size.saturating_sub(1));
    if min_period == 0 || min_period > max_period {
        return None;
    }

    // --- Track the lag with the strongest autocorrelation ---
    let mut best_period = 0;
    let mut best_correlation = 0.0_f32;

    for period in min_period..=max_period {
        let mut correlation = 0.0_f32;
        for i in 0..(frame_size - period) {
            correlation += signal[i] * signal[i + period];
        }
        if correlation > best_correlation {
            best_correlation = correlation;
            best_period = period;
        }
    }

    // --- Confidence check ---
    if best_period > 0 && best_correlation > CORRELATION_THRESHOLD {
        Some(sample_rate as f32 / best_period as f32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(frequency: f32, sample_rate: u32, length: usize, amplitude: f32) -> Vec<f32> {
        (0..length)
            .map(|i| {
                amplitude
                    * f32::sin(i as f32 * 2.0 * std::f32::consts::PI * frequency / sample_rate as f32)
            })
            .collect()
    }

    #[test]
    fn detects_a_string_within_lag_quantization() {
        let window = sine(110.0, 44100, 2048, 0.5);
        let detected = detect_pitch_autocorr(&window, 44100, AMPLITUDE_THRESHOLD)
            .expect("110 Hz sine should be detected");
        assert!(
            (detected - 110.0).abs() < 1.0,
            "detected {detected} Hz, expected ~110 Hz"
        );
    }

    #[test]
    fn detects_low_e_at_48k() {
        let window = sine(82.41, 48000, 2048, 0.5);
        let detected = detect_pitch_autocorr(&window, 48000, AMPLITUDE_THRESHOLD)
            .expect("low E sine should be detected");
        assert!(
            (detected - 82.41).abs() < 1.0,
            "detected {detected} Hz, expected ~82.41 Hz"
        );
    }

    #[test]
    fn gate_rejects_silence() {
        let window = vec![0.0; 2048];
        assert_eq!(detect_pitch_autocorr(&window, 44100, AMPLITUDE_THRESHOLD), None);
    }

    #[test]
    fn gate_rejects_quiet_periodic_signal() {
        // Periodic but far below the RMS gate; must be treated as noise.
        let window = sine(110.0, 44100, 2048, 0.005);
        assert_eq!(detect_pitch_autocorr(&window, 44100, AMPLITUDE_THRESHOLD), None);
    }

    #[test]
    fn empty_window_yields_no_pitch() {
        assert_eq!(detect_pitch_autocorr(&[], 44100, AMPLITUDE_THRESHOLD), None);
        assert_eq!(
            detect_pitch_autocorr(&[0.5; 64], 0, AMPLITUDE_THRESHOLD),
            None
        );
    }
}
