//! MML compilation: one voice string to a note schedule.
//!
//! Command summary (case-insensitive, whitespace ignored):
//! - `A`–`G` play a note; modifiers: `+`/`#` sharp, `-` flat, digits
//!   override the length denominator (1–64), `.` dotting, `_` tenuto,
//!   `'` staccato, `^` marcato, `,` chord (next note shares this start).
//! - `O n` set octave 0–8; `<`/`>` step it down/up.
//! - `L n` default length denominator; `T n` tempo 16–256 BPM.
//! - `N nnn` play raw table pitch 1–108; `N 0` is a silent tick.
//! - `P`/`R` rest, with optional length and dots.
//! - `M L|N|S` articulation legato/normal/staccato; `M F|B` ignored.
//! - `I Q|T|S|W|N` built-in instrument; `I P nn` rectangular duty;
//!   `I X c` custom instrument lookup.
//! - `V nnn` volume 0–100, or named dynamics `V PPP`…`V FFF` with an
//!   optional `;` terminator.

use bk_ir::{
    Instrument, InstrumentMap, Note, DEFAULT_INSTRUMENT_KEY, NOTES_PER_OCTAVE, NOTE_COUNT,
    OCTAVE_COUNT,
};

use crate::scanner::Scanner;
use crate::MmlError;

/// Semitone offsets of the letters A through G within an octave.
const LETTER_OFFSETS: [i32; 7] = [9, 11, 0, 2, 4, 5, 7];

/// Compile an MML voice string into a note schedule.
///
/// Start times are non-decreasing; equal start times form chords. The
/// pitch table must have exactly [`NOTE_COUNT`] entries and the
/// instrument map an entry at [`DEFAULT_INSTRUMENT_KEY`].
///
/// Whitespace is skipped before every token, including the key of an
/// `I X` lookup: `IX  Z` reads `Z` as the key.
pub fn compile_voice(
    input: &str,
    instruments: &InstrumentMap,
    pitches: &[f64],
) -> Result<Vec<Note>, MmlError> {
    if pitches.len() != NOTE_COUNT {
        return Err(MmlError::Malconfigured {
            reason: "Pitch table must have exactly 108 entries",
        });
    }
    let Some(default) = instruments.get(&DEFAULT_INSTRUMENT_KEY) else {
        return Err(MmlError::Malconfigured {
            reason: "Instrument map has no default entry",
        });
    };

    let mut compiler = Compiler {
        scanner: Scanner::new(input),
        instruments,
        pitches,
        octave: 4,
        beat_note: 4,
        tempo: 120,
        articulation: 7.0 / 8.0,
        note_length: 240.0 / (4.0 * 120.0),
        volume: 0.5,
        instrument: default.clone(),
        time: 0.0,
        notes: Vec::new(),
    };
    compiler.run()?;
    Ok(compiler.notes)
}

struct Compiler<'a> {
    scanner: Scanner<'a>,
    instruments: &'a InstrumentMap,
    pitches: &'a [f64],
    octave: i32,
    beat_note: u32,
    tempo: u32,
    /// Fraction of each beat the note actually sounds
    articulation: f64,
    /// Seconds per default-length note: 240 / (beat_note · tempo)
    note_length: f64,
    volume: f64,
    instrument: Instrument,
    /// Absolute cursor into the output timeline, seconds
    time: f64,
    notes: Vec<Note>,
}

impl Compiler<'_> {
    fn run(&mut self) -> Result<(), MmlError> {
        while !self.scanner.done() {
            match self.scanner.peek() {
                b'A'..=b'G' => self.letter_note()?,
                b'>' => {
                    self.scanner.consume();
                    self.shift_octave(1)?;
                }
                b'<' => {
                    self.scanner.consume();
                    self.shift_octave(-1)?;
                }
                b'O' => self.set_octave()?,
                b'L' => self.set_beat_note()?,
                b'T' => self.set_tempo()?,
                b'N' => self.numbered_note()?,
                b'P' | b'R' => self.rest()?,
                b'M' => self.music_mode()?,
                b'I' => self.set_instrument()?,
                b'V' => self.set_volume()?,
                other => return Err(MmlError::UnknownCommand { found: other as char }),
            }
        }
        Ok(())
    }

    /// A letter note and its modifier sequence.
    fn letter_note(&mut self) -> Result<(), MmlError> {
        let letter = self.scanner.consume();
        let mut pitch_index =
            self.octave * NOTES_PER_OCTAVE as i32 + LETTER_OFFSETS[(letter - b'A') as usize];

        let mut length = self.note_length;
        let mut articulation = self.articulation;
        let mut volume = self.volume;
        let mut next_dot = length * 0.5;
        let mut advance = true;

        loop {
            match self.scanner.peek() {
                b'+' | b'#' => {
                    self.scanner.consume();
                    pitch_index += 1;
                    if pitch_index == NOTE_COUNT as i32 {
                        return Err(MmlError::PitchBoundary { sharp: true });
                    }
                }
                b'-' => {
                    self.scanner.consume();
                    pitch_index -= 1;
                    if pitch_index == -1 {
                        return Err(MmlError::PitchBoundary { sharp: false });
                    }
                }
                // A length override must come before any dot.
                b'1'..=b'9' => {
                    let denominator = self.scanner.number(letter as char)?;
                    if !(1..=64).contains(&denominator) {
                        return Err(MmlError::OutOfRange {
                            what: "note length",
                            value: denominator as i64,
                        });
                    }
                    length = 240.0 / (denominator as f64 * self.tempo as f64);
                    next_dot = length * 0.5;
                }
                b'.' => {
                    self.scanner.consume();
                    length += next_dot;
                    next_dot *= 0.5;
                }
                b'_' => {
                    self.scanner.consume();
                    articulation = 1.0;
                }
                b'\'' => {
                    self.scanner.consume();
                    articulation = 3.0 / 4.0;
                }
                b'^' => {
                    self.scanner.consume();
                    volume = (volume + 0.125).min(1.0);
                }
                // Chord: the next note shares this note's start time.
                b',' => {
                    self.scanner.consume();
                    advance = false;
                    break;
                }
                _ => break,
            }
        }

        self.notes.push(Note::new(
            self.instrument.clone(),
            self.pitches[pitch_index as usize],
            self.time,
            length * articulation,
            volume,
        ));
        if advance {
            self.time += length;
        }
        Ok(())
    }

    fn shift_octave(&mut self, step: i32) -> Result<(), MmlError> {
        self.octave += step;
        if !(0..OCTAVE_COUNT as i32).contains(&self.octave) {
            return Err(MmlError::OutOfRange {
                what: "octave",
                value: self.octave as i64,
            });
        }
        Ok(())
    }

    fn set_octave(&mut self) -> Result<(), MmlError> {
        self.scanner.consume();
        let octave = self.scanner.number('O')?;
        if octave as usize >= OCTAVE_COUNT {
            return Err(MmlError::OutOfRange {
                what: "octave",
                value: octave as i64,
            });
        }
        self.octave = octave as i32;
        Ok(())
    }

    fn set_beat_note(&mut self) -> Result<(), MmlError> {
        self.scanner.consume();
        let beat_note = self.scanner.number('L')?;
        if !(1..=64).contains(&beat_note) {
            return Err(MmlError::OutOfRange {
                what: "note length",
                value: beat_note as i64,
            });
        }
        self.beat_note = beat_note;
        self.recompute_note_length();
        Ok(())
    }

    fn set_tempo(&mut self) -> Result<(), MmlError> {
        self.scanner.consume();
        let tempo = self.scanner.number('T')?;
        if !(16..=256).contains(&tempo) {
            return Err(MmlError::OutOfRange {
                what: "tempo",
                value: tempo as i64,
            });
        }
        self.tempo = tempo;
        self.recompute_note_length();
        Ok(())
    }

    /// Tempo is quarter notes per minute, so a whole note lasts
    /// 240/tempo seconds and a 1/beat_note note its share of that.
    fn recompute_note_length(&mut self) {
        self.note_length = 240.0 / (self.beat_note as f64 * self.tempo as f64);
    }

    /// `N nnn`: play a raw pitch table entry. `N 0` advances silently.
    fn numbered_note(&mut self) -> Result<(), MmlError> {
        self.scanner.consume();
        let number = self.scanner.number('N')?;
        if number as usize > NOTE_COUNT {
            return Err(MmlError::OutOfRange {
                what: "note index",
                value: number as i64,
            });
        }
        if number != 0 {
            self.notes.push(Note::new(
                self.instrument.clone(),
                self.pitches[number as usize - 1],
                self.time,
                self.note_length * self.articulation,
                self.volume,
            ));
        }
        self.time += self.note_length;
        Ok(())
    }

    /// `P` or `R`: advance the cursor without emitting a note.
    fn rest(&mut self) -> Result<(), MmlError> {
        let command = self.scanner.consume();
        let mut length = self.note_length;
        if self.scanner.peek().is_ascii_digit() {
            let denominator = self.scanner.number(command as char)?;
            if !(1..=64).contains(&denominator) {
                return Err(MmlError::OutOfRange {
                    what: "note length",
                    value: denominator as i64,
                });
            }
            length = 240.0 / (denominator as f64 * self.tempo as f64);
        }
        let mut next_dot = length * 0.5;
        while self.scanner.peek() == b'.' {
            self.scanner.consume();
            length += next_dot;
            next_dot *= 0.5;
        }
        self.time += length;
        Ok(())
    }

    fn music_mode(&mut self) -> Result<(), MmlError> {
        self.scanner.consume();
        match self.scanner.peek() {
            // Foreground/background playback selectors, kept for legacy input.
            b'F' | b'B' => {
                self.scanner.consume();
            }
            b'L' => {
                self.scanner.consume();
                self.articulation = 1.0;
            }
            b'N' => {
                self.scanner.consume();
                self.articulation = 7.0 / 8.0;
            }
            b'S' => {
                self.scanner.consume();
                self.articulation = 3.0 / 4.0;
            }
            other => return Err(MmlError::UnknownCommand { found: other as char }),
        }
        Ok(())
    }

    fn set_instrument(&mut self) -> Result<(), MmlError> {
        self.scanner.consume();
        match self.scanner.peek() {
            b'Q' => {
                self.scanner.consume();
                self.instrument = Instrument::square();
            }
            b'T' => {
                self.scanner.consume();
                self.instrument = Instrument::triangle();
            }
            b'S' => {
                self.scanner.consume();
                self.instrument = Instrument::sine();
            }
            b'W' => {
                self.scanner.consume();
                self.instrument = Instrument::saw();
            }
            b'N' => {
                self.scanner.consume();
                self.instrument = Instrument::noise();
            }
            b'X' => {
                self.scanner.consume();
                let key = self.scanner.peek() as char;
                match self.instruments.get(&key) {
                    Some(instrument) => {
                        self.instrument = instrument.clone();
                        self.scanner.consume();
                    }
                    None => return Err(MmlError::UnknownInstrument { key }),
                }
            }
            b'P' => {
                self.scanner.consume();
                let duty = self.scanner.number('P')?;
                if !(1..=99).contains(&duty) {
                    return Err(MmlError::OutOfRange {
                        what: "duty cycle",
                        value: duty as i64,
                    });
                }
                self.instrument = Instrument::rectangular(duty as f64 / 100.0);
            }
            other => return Err(MmlError::UnknownInstrument { key: other as char }),
        }
        Ok(())
    }

    fn set_volume(&mut self) -> Result<(), MmlError> {
        self.scanner.consume();
        match self.scanner.peek() {
            b'0'..=b'9' => {
                let volume = self.scanner.number('V')?;
                if volume > 100 {
                    return Err(MmlError::OutOfRange {
                        what: "volume",
                        value: volume as i64,
                    });
                }
                self.volume = volume as f64 / 100.0;
            }
            b'P' => {
                self.scanner.consume();
                if self.scanner.peek() == b'P' {
                    self.scanner.consume();
                    if self.scanner.peek() == b'P' {
                        self.scanner.consume();
                        self.volume = 0.125; // pianississimo
                    } else {
                        self.volume = 0.25; // pianissimo
                    }
                } else {
                    self.volume = 0.375; // piano
                }
                self.consume_dynamic_terminator();
            }
            b'M' => {
                self.scanner.consume();
                match self.scanner.peek() {
                    b'P' => {
                        self.scanner.consume();
                        self.volume = 0.5; // mezzo-piano
                    }
                    b'F' => {
                        self.scanner.consume();
                        self.volume = 0.625; // mezzo-forte
                    }
                    other => return Err(MmlError::UnknownCommand { found: other as char }),
                }
                self.consume_dynamic_terminator();
            }
            b'F' => {
                self.scanner.consume();
                if self.scanner.peek() != b'F' {
                    self.volume = 0.75; // forte
                } else {
                    self.scanner.consume();
                    if self.scanner.peek() != b'F' {
                        self.volume = 0.875; // fortissimo
                    } else {
                        self.scanner.consume();
                        self.volume = 1.0; // fortississimo
                    }
                }
                self.consume_dynamic_terminator();
            }
            other => return Err(MmlError::UnknownCommand { found: other as char }),
        }
        Ok(())
    }

    /// A `;` may close a named dynamic so that a following P, F, or R
    /// reads as a note or rest instead of more dynamic letters.
    fn consume_dynamic_terminator(&mut self) {
        if self.scanner.peek() == b';' {
            self.scanner.consume();
        }
    }
}
