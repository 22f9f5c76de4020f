//! # Reference String Table
//!
//! Static data for the six standard guitar open strings, plus the selector
//! type used to pick a tuning target.

use once_cell::sync::Lazy;

/// Concert pitch the table is derived from.
const A4_FREQUENCY: f32 = 440.0;

/// A tuning target: one of the six open strings, or automatic matching
/// against whichever string is closest to the detected pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringSelection {
    E2,
    A2,
    D3,
    G3,
    B3,
    E4,
    /// Match the closest reference string to the detected frequency.
    Auto,
}

/// One open-string reference entry. Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct GuitarString {
    pub name: StringSelection,
    /// Target frequency in Hz.
    pub frequency: f32,
    /// Base display name (e.g. "E").
    pub label: &'static str,
}

/// Statically computed table of the six open strings, lowest to highest.
///
/// Frequencies follow equal temperament against A4 = 440 Hz:
/// f = 440 · 2^(n/12) with n semitones away from A4. This lands on the
/// published open-string pitches (E2 ≈ 82.41 Hz ... E4 ≈ 329.63 Hz).
static GUITAR_STRINGS: Lazy<Vec<GuitarString>> = Lazy::new(|| {
    // (selector, semitones from A4, display label)
    const LAYOUT: [(StringSelection, i32, &str); 6] = [
        (StringSelection::E2, -29, "E"),
        (StringSelection::A2, -24, "A"),
        (StringSelection::D3, -19, "D"),
        (StringSelection::G3, -14, "G"),
        (StringSelection::B3, -10, "B"),
        (StringSelection::E4, -5, "E"),
    ];

    LAYOUT
        .iter()
        .map(|&(name, semitones, label)| GuitarString {
            name,
            frequency: A4_FREQUENCY * 2.0_f32.powf(semitones as f32 / 12.0),
            label,
        })
        .collect()
});

/// The full reference table, in ascending frequency order.
pub fn all() -> &'static [GuitarString] {
    &GUITAR_STRINGS
}

/// Looks up a string by its selector. `Auto` has no table entry and
/// yields `None`.
pub fn find_by_name(name: StringSelection) -> Option<&'static GuitarString> {
    GUITAR_STRINGS.iter().find(|s| s.name == name)
}

/// Finds the reference string closest in frequency to `freq`.
///
/// Linear scan over the six entries; equal distances resolve to the
/// first-encountered (lower-frequency) entry.
pub fn find_nearest(freq: f32) -> &'static GuitarString {
    GUITAR_STRINGS
        .iter()
        .min_by(|a, b| {
            let diff_a = (a.frequency - freq).abs();
            let diff_b = (b.frequency - freq).abs();
            diff_a.partial_cmp(&diff_b).unwrap()
        })
        .unwrap() // safe, the table is never empty
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_standard_tuning() {
        let expected = [82.41, 110.00, 146.83, 196.00, 246.94, 329.63];
        for (string, frequency) in all().iter().zip(expected) {
            assert!(
                (string.frequency - frequency).abs() < 0.01,
                "{:?}: computed {} Hz, published {} Hz",
                string.name,
                string.frequency,
                frequency
            );
        }
    }

    #[test]
    fn table_is_ascending() {
        let table = all();
        assert_eq!(table.len(), 6);
        for pair in table.windows(2) {
            assert!(pair[0].frequency < pair[1].frequency);
        }
    }

    #[test]
    fn lookup_by_name() {
        let e2 = find_by_name(StringSelection::E2).unwrap();
        assert_eq!(e2.label, "E");
        assert!((e2.frequency - 82.41).abs() < 0.01);
        assert!(find_by_name(StringSelection::Auto).is_none());
    }

    #[test]
    fn nearest_picks_minimal_distance() {
        assert_eq!(find_nearest(82.41).name, StringSelection::E2);
        assert_eq!(find_nearest(100.0).name, StringSelection::A2);
        assert_eq!(find_nearest(150.0).name, StringSelection::D3);
        assert_eq!(find_nearest(1000.0).name, StringSelection::E4);
        assert_eq!(find_nearest(20.0).name, StringSelection::E2);
    }

    #[test]
    fn nearest_boundary_between_adjacent_strings() {
        let table = all();
        let (low, high) = (&table[0], &table[1]);
        let midpoint = (low.frequency + high.frequency) / 2.0;
        assert_eq!(find_nearest(midpoint - 0.01).name, low.name);
        assert_eq!(find_nearest(midpoint + 0.01).name, high.name);
    }
}
