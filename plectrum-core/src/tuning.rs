//! # Tuning Evaluation Module
//!
//! Maps a detected frequency plus a target selection to a concrete string,
//! a cents deviation, and a tuned/untuned verdict.
//!
//! Evaluation is a pure function of its inputs and the static reference
//! table; no state is retained between calls.

use crate::TuningResult;
use crate::strings::{self, StringSelection};

/// Absolute cents deviation below which a string counts as in tune.
pub const TUNED_TOLERANCE_CENTS: f32 = 5.0;

/// Calculates the deviation from a target frequency in cents.
///
/// Cents are a logarithmic unit of pitch measurement where:
/// - 100 cents = 1 semitone
/// - 1200 cents = 1 octave
/// - Positive values indicate sharpness, negative values indicate flatness
pub fn cents_deviation(freq: f32, target_freq: f32) -> f32 {
    1200.0 * (freq / target_freq).log2()
}

/// Evaluates a detected frequency against the selected target string.
///
/// * `None` input (no pitch) yields `None` - the caller shows an idle
///   indicator, not an error.
/// * A named string is looked up by identity in the reference table.
/// * `Auto` - or any selector without a table entry - falls back to the
///   reference string closest to the detected frequency.
///
/// The returned cents value is signed and unclamped; it can exceed ±50
/// when the wrong string is being compared against.
pub fn evaluate(detected: Option<f32>, selection: StringSelection) -> Option<TuningResult> {
    let frequency = detected?;

    let target = strings::find_by_name(selection)
        .unwrap_or_else(|| strings::find_nearest(frequency));

    let cents = cents_deviation(frequency, target.frequency);

    Some(TuningResult {
        note: target.label,
        frequency,
        cents,
        is_tuned: cents.abs() < TUNED_TOLERANCE_CENTS,
    })
}
