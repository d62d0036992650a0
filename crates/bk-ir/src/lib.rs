//! Core types for the busker synthesis engine.
//!
//! This crate defines the sound model shared by the MML compiler and the
//! playback engine: the equal-tempered pitch table, waveform oscillators,
//! amplitude envelopes, instruments, and scheduled notes. The compiler
//! emits these types, and the engine samples them.

mod envelope;
mod instrument;
mod note;
mod osc;
mod pitch;

pub use envelope::{ArEnvelope, Envelope, LevelFn};
pub use instrument::{
    default_instruments, Instrument, InstrumentMap, DEFAULT_INSTRUMENT_KEY,
};
pub use note::Note;
pub use osc::{Oscillator, WaveFn};
pub use pitch::{
    note_names, standard_pitches, CONCERT_A_HZ, CONCERT_A_INDEX, NOTE_COUNT,
    NOTES_PER_OCTAVE, OCTAVE_COUNT,
};
