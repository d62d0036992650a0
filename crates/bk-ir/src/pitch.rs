//! Equal-tempered pitch table and note names.
//!
//! Nine octaves of twelve semitones, C0 at index 0. The reference A
//! (440 Hz) sits at octave 4, semitone 9: table index 57. Octave 4 here
//! corresponds to QBasic's octave 2; two extra sub-bass octaves extend
//! the table down far enough to cover an 88-key piano.

use arrayvec::ArrayString;
use core::fmt::Write;
use std::sync::OnceLock;

/// Semitones per octave.
pub const NOTES_PER_OCTAVE: usize = 12;

/// Octaves in the table.
pub const OCTAVE_COUNT: usize = 9;

/// Total table entries.
pub const NOTE_COUNT: usize = NOTES_PER_OCTAVE * OCTAVE_COUNT;

/// The A above middle C: ISO 16.
pub const CONCERT_A_HZ: f64 = 440.0;

/// Table index of the reference A (octave 4, semitone 9).
pub const CONCERT_A_INDEX: usize = 57;

/// The standard 12-TET pitch table, built once.
///
/// Entry `n` is `440 · 2^((n − 57) / 12)` Hz.
pub fn standard_pitches() -> &'static [f64] {
    static PITCHES: OnceLock<Vec<f64>> = OnceLock::new();
    PITCHES.get_or_init(|| {
        (0..NOTE_COUNT)
            .map(|n| CONCERT_A_HZ * 2f64.powf((n as f64 - CONCERT_A_INDEX as f64) / 12.0))
            .collect()
    })
}

/// Names for every table entry: "C0", "C#0", ... "B8".
pub fn note_names() -> &'static [ArrayString<4>] {
    static NAMES: OnceLock<Vec<ArrayString<4>>> = OnceLock::new();
    NAMES.get_or_init(|| {
        const LETTERS: [&str; NOTES_PER_OCTAVE] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        let mut names = Vec::with_capacity(NOTE_COUNT);
        for octave in 0..OCTAVE_COUNT {
            for letter in LETTERS {
                let mut name = ArrayString::<4>::new();
                let _ = write!(name, "{}{}", letter, octave);
                names.push(name);
            }
        }
        names
    })
}
