//! Audio Engine Module
//!
//! Core audio plumbing shared by every stage:
//! - Mono audio buffer and level helpers
//! - WAV file I/O

pub mod buffer;
pub mod io;

pub use buffer::{db_to_linear, linear_to_db, AudioBuffer, DEFAULT_SAMPLE_RATE};
pub use io::{file_checksum, load_wav, save_wav, BitDepth};
