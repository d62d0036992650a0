//! A scheduled note.

use crate::instrument::Instrument;

/// One scheduled note: immutable once built.
///
/// A note is *before* its window until `start_time`, *after* it once the
/// duration and the instrument's release tail have both passed, and
/// active in between.
#[derive(Clone, Debug)]
pub struct Note {
    pub instrument: Instrument,
    /// Frequency in Hz
    pub frequency: f64,
    /// Absolute start, seconds into the voice timeline
    pub start_time: f64,
    /// Sounding length, seconds (articulation already applied)
    pub duration: f64,
    /// Volume in [0, 1]
    pub volume: f64,
}

impl Note {
    pub fn new(
        instrument: Instrument,
        frequency: f64,
        start_time: f64,
        duration: f64,
        volume: f64,
    ) -> Self {
        Self {
            instrument,
            frequency,
            start_time,
            duration,
            volume,
        }
    }

    /// True while `time` has not yet reached this note.
    pub fn before(&self, time: f64) -> bool {
        time < self.start_time
    }

    /// True once `time` is past the note and its release tail.
    pub fn after(&self, time: f64) -> bool {
        time > self.start_time + self.duration + self.instrument.release_length()
    }

    /// Sample the note at an absolute voice time.
    pub fn sample(&self, time: f64) -> f64 {
        let note_time = time - self.start_time;
        let released_at = if note_time < self.duration {
            None
        } else {
            Some(self.duration)
        };
        self.volume * self.instrument.sample(self.frequency, note_time, released_at)
    }
}
