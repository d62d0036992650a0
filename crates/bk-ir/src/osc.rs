//! Stateless waveform generators.
//!
//! An oscillator maps (frequency in Hz, seconds since note start) to a
//! sample in [-1, 1]. The built-ins form a closed set; user waveforms
//! plug in through the `Custom` variant. Oscillators are immutable
//! values: the same (frequency, time) always yields the same sample.

use std::collections::hash_map::DefaultHasher;
use std::f64::consts::{FRAC_PI_2, TAU};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Signature for user-supplied waveform functions.
pub type WaveFn = dyn Fn(f64, f64) -> f64 + Send + Sync;

/// A waveform generator.
#[derive(Clone)]
pub enum Oscillator {
    /// Pure sine.
    Sine,
    /// Piecewise-linear triangle.
    Triangle,
    /// Sign of the sine; the tie at zero crossing goes to +1.
    Square,
    /// Centered sawtooth.
    Saw,
    /// Deterministic pseudo-random samples.
    Noise,
    /// Pulse wave with the given duty cycle in (0, 1).
    Rectangular { duty: f64 },
    /// User-supplied waveform function.
    Custom(Arc<WaveFn>),
}

impl Oscillator {
    /// Wrap a waveform function as an oscillator.
    pub fn custom(wave: impl Fn(f64, f64) -> f64 + Send + Sync + 'static) -> Self {
        Oscillator::Custom(Arc::new(wave))
    }

    /// Sample the waveform `time` seconds into a note of `frequency` Hz.
    pub fn sample(&self, frequency: f64, time: f64) -> f64 {
        match self {
            Oscillator::Sine => sine_wave(frequency, time),
            Oscillator::Triangle => triangle_wave(frequency, time),
            Oscillator::Square => square_wave(frequency, time),
            Oscillator::Saw => saw_wave(frequency, time),
            Oscillator::Noise => noise_wave(frequency, time),
            Oscillator::Rectangular { duty } => rectangular_wave(frequency, time, *duty),
            Oscillator::Custom(wave) => wave(frequency, time),
        }
    }
}

impl fmt::Debug for Oscillator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Oscillator::Sine => f.write_str("Sine"),
            Oscillator::Triangle => f.write_str("Triangle"),
            Oscillator::Square => f.write_str("Square"),
            Oscillator::Saw => f.write_str("Saw"),
            Oscillator::Noise => f.write_str("Noise"),
            Oscillator::Rectangular { duty } => {
                f.debug_struct("Rectangular").field("duty", duty).finish()
            }
            Oscillator::Custom(_) => f.write_str("Custom"),
        }
    }
}

fn sine_wave(frequency: f64, time: f64) -> f64 {
    (frequency * TAU * time).sin()
}

fn triangle_wave(frequency: f64, time: f64) -> f64 {
    (frequency * TAU * time).sin().asin() / FRAC_PI_2
}

fn square_wave(frequency: f64, time: f64) -> f64 {
    1.0f64.copysign((frequency * TAU * time).sin())
}

fn saw_wave(frequency: f64, time: f64) -> f64 {
    let cycles = frequency * time;
    2.0 * (cycles - (cycles + 0.5).floor())
}

/// The same note sampled at the same time must produce the same noise.
fn noise_wave(frequency: f64, time: f64) -> f64 {
    let mut hasher = DefaultHasher::new();
    (frequency * TAU * time).to_bits().hash(&mut hasher);
    1.0 - 2.0 * (hasher.finish() as f64 / u64::MAX as f64)
}

fn rectangular_wave(frequency: f64, time: f64, duty: f64) -> f64 {
    let angle = frequency * TAU * time;
    let position = angle - (angle / TAU).floor() * TAU;
    if position <= duty * TAU {
        1.0
    } else {
        -1.0
    }
}
