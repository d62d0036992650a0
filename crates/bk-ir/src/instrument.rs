//! Instruments pair one oscillator with one envelope.

use arrayvec::ArrayString;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::envelope::Envelope;
use crate::osc::Oscillator;

/// Key under which an instrument map must hold its default entry.
pub const DEFAULT_INSTRUMENT_KEY: char = '\0';

/// Instruments available to `I X` lookups, keyed by a single character.
///
/// The MML scanner uppercases its input, so letter keys must be stored
/// uppercase to be reachable.
pub type InstrumentMap = BTreeMap<char, Instrument>;

/// A playable instrument.
#[derive(Clone, Debug)]
pub struct Instrument {
    /// Instrument name
    pub name: ArrayString<26>,
    oscillator: Oscillator,
    envelope: Envelope,
}

impl Instrument {
    /// Create an instrument from parts.
    pub fn new(name: &str, oscillator: Oscillator, envelope: Envelope) -> Self {
        let mut instrument = Self {
            name: ArrayString::new(),
            oscillator,
            envelope,
        };
        let _ = instrument.name.try_push_str(name);
        instrument
    }

    /// Square wave with the default AR envelope.
    pub fn square() -> Self {
        Self::new("square", Oscillator::Square, Envelope::default())
    }

    /// Triangle wave with the default AR envelope.
    pub fn triangle() -> Self {
        Self::new("triangle", Oscillator::Triangle, Envelope::default())
    }

    /// Sine wave with the default AR envelope.
    pub fn sine() -> Self {
        Self::new("sine", Oscillator::Sine, Envelope::default())
    }

    /// Sawtooth wave with the default AR envelope.
    pub fn saw() -> Self {
        Self::new("saw", Oscillator::Saw, Envelope::default())
    }

    /// Noise with the default AR envelope.
    pub fn noise() -> Self {
        Self::new("noise", Oscillator::Noise, Envelope::default())
    }

    /// Rectangular wave at the given duty cycle, default AR envelope.
    pub fn rectangular(duty: f64) -> Self {
        Self::new("rectangular", Oscillator::Rectangular { duty }, Envelope::default())
    }

    /// Evaluate one sample of a note played on this instrument.
    pub fn sample(&self, frequency: f64, time: f64, released_at: Option<f64>) -> f64 {
        self.envelope.level(time, released_at) * self.oscillator.sample(frequency, time)
    }

    /// Seconds the instrument keeps sounding after its note ends.
    pub fn release_length(&self) -> f64 {
        self.envelope.release_length()
    }
}

/// The built-in instrument map: a square wave at the default key.
pub fn default_instruments() -> &'static InstrumentMap {
    static MAP: OnceLock<InstrumentMap> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut map = InstrumentMap::new();
        map.insert(DEFAULT_INSTRUMENT_KEY, Instrument::square());
        map
    })
}
