//! A single melodic line and its playback cursor.

use bk_ir::{default_instruments, standard_pitches, InstrumentMap, Note};
use bk_mml::{compile_voice, MmlError};

/// One voice: an ordered note schedule plus the cursor state needed to
/// sample it.
///
/// `play` must be called with non-decreasing times; the cursor only
/// moves forward until `rewind`. The active set holds indices into the
/// note list, which is never mutated after construction.
#[derive(Debug, Default)]
pub struct Voice {
    notes: Vec<Note>,
    index: usize,
    active: Vec<usize>,
}

impl Voice {
    /// Wrap a compiled note schedule.
    pub fn new(notes: Vec<Note>) -> Self {
        // Each note activates at most once per pass, so this capacity
        // keeps the play path from ever reallocating.
        let capacity = notes.len();
        Self {
            notes,
            index: 0,
            active: Vec::with_capacity(capacity),
        }
    }

    /// Sample the voice at `time` seconds: the sum of its active notes.
    pub fn play(&mut self, time: f64) -> f64 {
        // Skip notes whose release tails have already passed.
        while self.index < self.notes.len() && self.notes[self.index].after(time) {
            self.index += 1;
        }
        // Done, or resting before the next note: just drain the actives.
        if self.index == self.notes.len() || self.notes[self.index].before(time) {
            return self.sum_and_prune(time);
        }
        // Every remaining note at or before `time` starts sounding now.
        while self.index < self.notes.len() && !self.notes[self.index].before(time) {
            self.active.push(self.index);
            self.index += 1;
        }
        self.sum_and_prune(time)
    }

    fn sum_and_prune(&mut self, time: f64) -> f64 {
        let sum: f64 = self.active.iter().map(|&i| self.notes[i].sample(time)).sum();
        let notes = &self.notes;
        self.active.retain(|&i| !notes[i].after(time));
        sum
    }

    /// True once every note has been passed and nothing still sounds.
    pub fn finished(&self) -> bool {
        self.index == self.notes.len() && self.active.is_empty()
    }

    /// Reset the cursor so the voice plays again from its first note.
    pub fn rewind(&mut self) {
        self.index = 0;
        self.active.clear();
    }

    /// The compiled schedule.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl Clone for Voice {
    // Hand-written to preserve the active set's reserved capacity.
    fn clone(&self) -> Self {
        let mut active = Vec::with_capacity(self.notes.len());
        active.extend_from_slice(&self.active);
        Self {
            notes: self.notes.clone(),
            index: self.index,
            active,
        }
    }
}

/// Compile an MML string into a voice with the standard pitch table and
/// the built-in instruments.
pub fn build_voice(input: &str) -> Result<Voice, MmlError> {
    build_voice_with(input, default_instruments(), standard_pitches())
}

/// Compile an MML string against a caller-supplied instrument map and
/// pitch table.
pub fn build_voice_with(
    input: &str,
    instruments: &InstrumentMap,
    pitches: &[f64],
) -> Result<Voice, MmlError> {
    Ok(Voice::new(compile_voice(input, instruments, pitches)?))
}
