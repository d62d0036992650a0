//! Headless controller for the busker MML synthesis engine.
//!
//! Re-exports the engine surface and provides offline rendering, WAV
//! encoding, and live playback that command-line tools can share.

mod player;
mod wav;

// Re-export common types so callers don't need the member crates directly.
pub use bk_engine::{build_voice, build_voice_with, Maestro, Venue, Voice};
pub use bk_ir::{
    default_instruments, note_names, standard_pitches, ArEnvelope, Envelope, Instrument,
    InstrumentMap, Note, Oscillator, DEFAULT_INSTRUMENT_KEY, NOTE_COUNT,
};
pub use bk_mml::{compile_voice, MmlError};

pub use player::Player;
pub use wav::{samples_to_wav, write_wav};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Render a piece offline: drive a private venue at `sample_rate` until
/// its completion callback reports the program exhausted.
pub fn render_piece(piece: Maestro, sample_rate: u32) -> Vec<f64> {
    let venue = Venue::new();
    let done = Arc::new(AtomicBool::new(false));
    let flag = done.clone();
    venue.set_completion_callback(move || flag.store(true, Ordering::Relaxed));
    venue.queue_piece(piece);

    let time_delta = 1.0 / sample_rate as f64;
    let mut samples = Vec::new();
    let mut time = 0.0;
    while !done.load(Ordering::Relaxed) {
        samples.push(venue.get_sample(0, time, time_delta));
        time += time_delta;
    }
    samples
}

/// Render a piece straight to an in-memory WAV file.
pub fn render_to_wav(piece: Maestro, sample_rate: u32) -> Vec<u8> {
    samples_to_wav(&render_piece(piece, sample_rate), sample_rate)
}
