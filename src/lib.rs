//! Dirge - Layered Procedural Soundtrack Synthesis
//!
//! Dirge renders a short Halloween soundtrack offline and grades it with an
//! objective quality gate. Three stateless stages, each re-run by hand:
//! 1. Layer generators - bass, melody, atmosphere and effects, each a pure
//!    function of a `RenderSpec` and its parameters
//! 2. Mixer - high-pass, weighted sum, static compression, output stage
//! 3. Quality gate - five independent metrics with a PASS/FAIL verdict
//!
//! # Architecture
//!
//! - `synth`: oscillators, envelopes, seeded noise and event placement
//! - `layers`: the four generators
//! - `dsp`: biquad filter, compressor and output stage used by the mixer
//! - `gate`: spectrum utility, metrics and the report

pub mod cli;
pub mod config;
pub mod dsp;
pub mod engine;
pub mod error;
pub mod gate;
pub mod layers;
pub mod mixer;
pub mod pipeline;
pub mod synth;

pub use error::{DirgeError, Result};
