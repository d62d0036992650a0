//! Music Macro Language compiler for busker.
//!
//! Translates one MML voice string into an ordered schedule of notes
//! with absolute start times. The playback engine consumes the result.

mod compile;
mod scanner;

pub use compile::compile_voice;

use std::fmt;

/// Error type for MML compilation.
///
/// Compilation does not recover: the first failure aborts the voice and
/// surfaces to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MmlError {
    /// A command that requires a numeric argument found none
    MissingArgument { command: char },
    /// A numeric argument fell outside its inclusive bounds
    OutOfRange { what: &'static str, value: i64 },
    /// A sharp or flat stepped off the end of the pitch table
    PitchBoundary { sharp: bool },
    /// `I` named an instrument that does not exist
    UnknownInstrument { key: char },
    /// A character matching no command
    UnknownCommand { found: char },
    /// The caller supplied a bad pitch table or instrument map
    Malconfigured { reason: &'static str },
}

impl fmt::Display for MmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MmlError::MissingArgument { command } => {
                write!(f, "Command '{}' requires a value, none given", command)
            }
            MmlError::OutOfRange { what, value } => write!(f, "Invalid {}: {}", what, value),
            MmlError::PitchBoundary { sharp: true } => {
                write!(f, "Tried to sharp the highest note")
            }
            MmlError::PitchBoundary { sharp: false } => {
                write!(f, "Tried to flat the lowest note")
            }
            MmlError::UnknownInstrument { key } => write!(f, "Unknown instrument '{}'", key),
            MmlError::UnknownCommand { found } => {
                write!(f, "Did not understand command character '{}'", found)
            }
            MmlError::Malconfigured { reason } => f.write_str(reason),
        }
    }
}

impl std::error::Error for MmlError {}
