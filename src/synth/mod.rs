//! Synthesis primitives
//!
//! Deterministic building blocks for the layer generators: sine tones with
//! optional pitch sweeps, amplitude envelopes, seeded noise and event
//! placement.

pub mod envelope;
pub mod event;
pub mod noise;
pub mod oscillator;

pub use envelope::{Adsr, Envelope};
pub use event::{burst_len, evenly_spaced, mix_into, place};
pub use noise::{derive_seed, NoiseSource};
pub use oscillator::{bell_partials, modulate, partials, sines, tone, Lfo, Partial, Pitch, Sine};
