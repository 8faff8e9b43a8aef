//! DSP Library
//!
//! Offline signal processing used by the generators and the mixer.

mod compressor;
mod filter;
mod gain;

pub use compressor::{CompressorParams, StaticCompressor};
pub use filter::{Biquad, FilterType};
pub use gain::{apply_fades, OutputStage};
