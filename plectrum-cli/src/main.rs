//! # Plectrum - Terminal Guitar Tuner
//!
//! Thin presentation loop over `plectrum-core`: polls the capture window,
//! runs the pitch estimator and tuning evaluator once per frame, and redraws
//! a one-line cents meter. All algorithmic content lives in the core crate.

use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use plectrum_core::TuningResult;
use plectrum_core::audio::AudioCapture;
use plectrum_core::pitch;
use plectrum_core::strings::{self, StringSelection};
use plectrum_core::tuning;

/// Frame cadence for polling and redrawing, ~60 Hz.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Width of the cents meter in cells; the meter spans -50..+50 cents.
const METER_CELLS: usize = 21;
const METER_RANGE_CENTS: f32 = 50.0;

/// Tune a guitar from the terminal
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Target string (e2, a2, d3, g3, b3, e4) or auto
    #[arg(short, long, default_value = "auto")]
    string: String,

    /// Print the reference string table and exit
    #[arg(short, long)]
    list: bool,
}

fn parse_selection(value: &str) -> Option<StringSelection> {
    match value.to_ascii_lowercase().as_str() {
        "e2" => Some(StringSelection::E2),
        "a2" => Some(StringSelection::A2),
        "d3" => Some(StringSelection::D3),
        "g3" => Some(StringSelection::G3),
        "b3" => Some(StringSelection::B3),
        "e4" => Some(StringSelection::E4),
        "auto" => Some(StringSelection::Auto),
        _ => None,
    }
}

fn print_string_table() {
    println!("open strings (low to high):");
    for string in strings::all() {
        println!("  {:?}  {}  {:7.2} Hz", string.name, string.label, string.frequency);
    }
}

/// Renders one frame of the meter onto the current terminal line.
fn render(result: &TuningResult) {
    let clamped = result.cents.clamp(-METER_RANGE_CENTS, METER_RANGE_CENTS);
    let position = ((clamped + METER_RANGE_CENTS) / (2.0 * METER_RANGE_CENTS)
        * (METER_CELLS - 1) as f32)
        .round() as usize;

    let mut meter = String::with_capacity(METER_CELLS);
    for cell in 0..METER_CELLS {
        if cell == position {
            meter.push('|');
        } else if cell == METER_CELLS / 2 {
            meter.push('+');
        } else {
            meter.push('-');
        }
    }

    let verdict = if result.is_tuned {
        "in tune"
    } else if result.cents > 0.0 {
        "sharp  "
    } else {
        "flat   "
    };

    print!(
        "\r{}  {:7.2} Hz  [{}]  {:+6.1} cents  {}",
        result.note, result.frequency, meter, result.cents, verdict
    );
    let _ = std::io::stdout().flush();
}

fn render_idle() {
    print!(
        "\r.  listening...  [{}]                        ",
        "-".repeat(METER_CELLS)
    );
    let _ = std::io::stdout().flush();
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.list {
        print_string_table();
        return Ok(());
    }

    let Some(selection) = parse_selection(&args.string) else {
        bail!("unknown string {:?}; expected e2, a2, d3, g3, b3, e4 or auto", args.string);
    };

    let mut capture = AudioCapture::new();
    // Permission or device failures propagate here so the user sees them.
    capture.start().context("could not start audio capture")?;
    let sample_rate = capture
        .sample_rate()
        .context("capture reported no sample rate")?;

    log::info!("tuning target: {selection:?}, sample rate {sample_rate} Hz");
    println!("pluck a string (ctrl-c to quit)");

    loop {
        let detected = capture
            .window()
            .and_then(|window| {
                pitch::detect_pitch_autocorr(window, sample_rate, pitch::AMPLITUDE_THRESHOLD)
            });

        match tuning::evaluate(detected, selection) {
            Some(result) => render(&result),
            None => render_idle(),
        }

        thread::sleep(FRAME_INTERVAL);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_parsing_accepts_all_strings() {
        assert_eq!(parse_selection("e2"), Some(StringSelection::E2));
        assert_eq!(parse_selection("B3"), Some(StringSelection::B3));
        assert_eq!(parse_selection("AUTO"), Some(StringSelection::Auto));
        assert_eq!(parse_selection("c4"), None);
        assert_eq!(parse_selection(""), None);
    }
}
