//! Amplitude envelopes.
//!
//! An envelope maps (seconds since note start, optional release instant)
//! to an amplitude in [0, 1], and reports how long it keeps sounding
//! past the release. Envelopes are immutable values, like oscillators.

use std::fmt;
use std::sync::Arc;

/// Signature for user-supplied envelope functions: (seconds since note
/// start, instant the note was released) → amplitude.
pub type LevelFn = dyn Fn(f64, Option<f64>) -> f64 + Send + Sync;

/// An amplitude shaper.
#[derive(Clone)]
pub enum Envelope {
    /// Linear attack to a peak, hold, linear release.
    Ar(ArEnvelope),
    /// User-supplied envelope with a fixed release tail.
    Custom {
        level: Arc<LevelFn>,
        release_length: f64,
    },
}

impl Envelope {
    /// Wrap an envelope function with the given release tail.
    pub fn custom(
        level: impl Fn(f64, Option<f64>) -> f64 + Send + Sync + 'static,
        release_length: f64,
    ) -> Self {
        Envelope::Custom {
            level: Arc::new(level),
            release_length,
        }
    }

    /// Amplitude `time` seconds into the note. `released_at` is `None`
    /// while the note is still held.
    pub fn level(&self, time: f64, released_at: Option<f64>) -> f64 {
        match self {
            Envelope::Ar(ar) => ar.level(time, released_at),
            Envelope::Custom { level, .. } => level(time, released_at),
        }
    }

    /// Seconds of sound remaining after the note is released.
    pub fn release_length(&self) -> f64 {
        match self {
            Envelope::Ar(ar) => ar.release_length,
            Envelope::Custom { release_length, .. } => *release_length,
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Envelope::Ar(ArEnvelope::default())
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Envelope::Ar(ar) => f.debug_tuple("Ar").field(ar).finish(),
            Envelope::Custom { release_length, .. } => f
                .debug_struct("Custom")
                .field("release_length", release_length)
                .finish(),
        }
    }
}

/// The default attack–release envelope.
///
/// Attack and release both last a tenth of the shortest expressible
/// note (64th note at tempo 256): 240/(64·256)·0.1 s, about 1.5 ms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArEnvelope {
    pub attack_peak: f64,
    pub attack_length: f64,
    pub release_length: f64,
}

impl Default for ArEnvelope {
    fn default() -> Self {
        let edge = 240.0 / (64.0 * 256.0) * 0.1;
        Self {
            attack_peak: 1.0,
            attack_length: edge,
            release_length: edge,
        }
    }
}

impl ArEnvelope {
    /// Amplitude at `time`, with the post-release tail scaled linearly
    /// to zero from whatever level the attack had reached.
    pub fn level(&self, time: f64, released_at: Option<f64>) -> f64 {
        match released_at {
            None => self.attack_level(time),
            Some(released_at) => {
                let reached = self.attack_level(released_at);
                reached * ((released_at + self.release_length - time) / self.release_length)
            }
        }
    }

    fn attack_level(&self, time: f64) -> f64 {
        if time < self.attack_length {
            (time / self.attack_length) * self.attack_peak
        } else {
            self.attack_peak
        }
    }
}
