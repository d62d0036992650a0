//! A compiled piece: parallel voices sampled together.

use bk_ir::{default_instruments, standard_pitches, InstrumentMap};
use bk_mml::MmlError;

use crate::voice::{build_voice_with, Voice};

/// One piece of music. Each voice is a melodic line; the piece's sample
/// is the average of its voices, so polyphony does not change loudness.
#[derive(Clone, Debug, Default)]
pub struct Maestro {
    choir: Vec<Voice>,
}

impl Maestro {
    /// Compile one MML string per voice with the built-in instruments.
    pub fn from_mml<S: AsRef<str>>(music: &[S]) -> Result<Self, MmlError> {
        Self::from_mml_with(music, default_instruments())
    }

    /// Compile one MML string per voice against a custom instrument map.
    ///
    /// Voices that compile to zero notes are dropped here; a line of
    /// rests contributes nothing a listener could miss.
    pub fn from_mml_with<S: AsRef<str>>(
        music: &[S],
        instruments: &InstrumentMap,
    ) -> Result<Self, MmlError> {
        let mut choir = Vec::with_capacity(music.len());
        for line in music {
            let voice = build_voice_with(line.as_ref(), instruments, standard_pitches())?;
            if !voice.is_empty() {
                choir.push(voice);
            }
        }
        Ok(Self { choir })
    }

    /// Bundle prebuilt voices, kept exactly as given.
    pub fn from_voices(choir: Vec<Voice>) -> Self {
        Self { choir }
    }

    /// Sample the piece at `time`: the average over its voices.
    pub fn play(&mut self, time: f64) -> f64 {
        if self.choir.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.choir.iter_mut().map(|voice| voice.play(time)).sum();
        sum / self.choir.len() as f64
    }

    /// True when every voice has finished.
    pub fn finished(&self) -> bool {
        self.choir.iter().all(Voice::finished)
    }

    /// Restart every voice from the top.
    pub fn rewind(&mut self) {
        for voice in &mut self.choir {
            voice.rewind();
        }
    }

    /// Number of voices that survived compilation.
    pub fn voices(&self) -> usize {
        self.choir.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::build_voice;

    #[test]
    fn single_voice_piece_matches_the_voice() {
        let mut solo = build_voice("T120 L4 C E G").unwrap();
        let mut piece = Maestro::from_mml(&["T120 L4 C E G"]).unwrap();
        for i in 0..2000 {
            let time = i as f64 / 1000.0;
            assert_eq!(piece.play(time), solo.play(time), "at t={}", time);
        }
    }

    #[test]
    fn two_voices_average() {
        let mut first = build_voice("C E G").unwrap();
        let mut second = build_voice(">C").unwrap();
        let mut piece = Maestro::from_mml(&["C E G", ">C"]).unwrap();
        for i in 0..1000 {
            let time = i as f64 / 1000.0;
            let expected = (first.play(time) + second.play(time)) / 2.0;
            assert_eq!(piece.play(time), expected, "at t={}", time);
        }
    }

    #[test]
    fn empty_piece_is_silent_and_finished() {
        let mut piece = Maestro::from_voices(Vec::new());
        assert_eq!(piece.play(0.0), 0.0);
        assert!(piece.finished());
    }

    #[test]
    fn voices_with_no_notes_are_dropped() {
        let piece = Maestro::from_mml(&["C", "P P P", "T90 L1 P"]).unwrap();
        assert_eq!(piece.voices(), 1);
    }

    #[test]
    fn from_voices_keeps_empty_voices() {
        let piece = Maestro::from_voices(vec![Voice::default()]);
        assert_eq!(piece.voices(), 1);
    }

    #[test]
    fn compile_errors_surface() {
        assert!(Maestro::from_mml(&["C", "O9 C"]).is_err());
    }

    #[test]
    fn finished_needs_every_voice_done() {
        // Second voice is four beats of sound, first only one
        let mut piece = Maestro::from_mml(&["L4 C", "L4 C D E F"]).unwrap();
        piece.play(1.0);
        assert!(!piece.finished());
        piece.play(3.0);
        assert!(piece.finished());
    }

    #[test]
    fn rewind_restarts_the_whole_piece() {
        let mut piece = Maestro::from_mml(&["L4 C", "L4 E"]).unwrap();
        let opening = piece.play(0.1);
        piece.play(5.0);
        assert!(piece.finished());
        piece.rewind();
        assert_eq!(piece.play(0.1), opening);
    }
}
