//! Audio file I/O for Dirge
//!
//! Reads and writes uncompressed PCM WAV files using the hound crate.
//! Rendered soundtracks are mono; multi-channel input is reduced to its
//! first channel on load.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::engine::buffer::AudioBuffer;
use crate::error::{DirgeError, Result};

/// Sample encoding for written WAV files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BitDepth {
    /// 16-bit signed integer PCM
    #[default]
    Int16,
    /// 24-bit signed integer PCM
    Int24,
    /// 32-bit IEEE float
    Float32,
}

impl BitDepth {
    /// Bits per sample written to the WAV header
    pub fn bits(&self) -> u16 {
        match self {
            BitDepth::Int16 => 16,
            BitDepth::Int24 => 24,
            BitDepth::Float32 => 32,
        }
    }

    fn sample_format(&self) -> SampleFormat {
        match self {
            BitDepth::Float32 => SampleFormat::Float,
            _ => SampleFormat::Int,
        }
    }
}

/// Load a WAV file into a mono AudioBuffer
///
/// Integer samples are scaled by 2^(bits-1). Stereo or multi-channel
/// files keep only the first channel.
///
/// # Errors
/// * `AudioRead` - If the file is missing, unreadable or not a valid WAV file
/// * `UnsupportedFormat` - If the header declares zero channels
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let read_error = |e: hound::Error| DirgeError::AudioRead {
        path: path.display().to_string(),
        source: e,
    };

    let reader = WavReader::open(path).map_err(read_error)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(DirgeError::UnsupportedFormat {
            details: "WAV header declares zero channels".to_string(),
        });
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<f32>, hound::Error>>()
            .map_err(read_error)?,
        SampleFormat::Int => {
            let max_val = (1u64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<f32>, hound::Error>>()
                .map_err(read_error)?
        }
    };

    let samples: Vec<f32> = if channels == 1 {
        interleaved
    } else {
        interleaved.iter().step_by(channels).copied().collect()
    };

    debug!(
        "Loaded {} ({} ch, {} Hz, {} bit, {} frames)",
        path.display(),
        channels,
        spec.sample_rate,
        spec.bits_per_sample,
        samples.len()
    );

    Ok(AudioBuffer::new(samples, spec.sample_rate))
}

/// Save an AudioBuffer to a mono WAV file
///
/// Integer formats clamp to [-1.0, 1.0] before quantizing.
pub fn save_wav<P: AsRef<Path>>(buffer: &AudioBuffer, path: P, bit_depth: BitDepth) -> Result<()> {
    let path = path.as_ref();
    let write_error = |e: hound::Error| DirgeError::AudioWrite {
        path: path.display().to_string(),
        source: e,
    };

    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate(),
        bits_per_sample: bit_depth.bits(),
        sample_format: bit_depth.sample_format(),
    };

    let mut writer = WavWriter::create(path, spec).map_err(write_error)?;

    match bit_depth {
        BitDepth::Float32 => {
            for &sample in buffer.samples() {
                writer.write_sample(sample).map_err(write_error)?;
            }
        }
        BitDepth::Int16 | BitDepth::Int24 => {
            let max_val = ((1u32 << (bit_depth.bits() - 1)) - 1) as f32;
            for &sample in buffer.samples() {
                let quantized = (sample.clamp(-1.0, 1.0) * max_val).round() as i32;
                writer.write_sample(quantized).map_err(write_error)?;
            }
        }
    }

    writer.finalize().map_err(write_error)?;

    debug!(
        "Wrote {} ({} samples, {} bit)",
        path.display(),
        buffer.len(),
        bit_depth.bits()
    );

    Ok(())
}

/// Hex SHA-256 of a file's bytes
pub fn file_checksum<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; 8192];

    loop {
        let bytes_read = file.read(&mut chunk)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&chunk[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_wav_float_preserves_samples() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("float.wav");

        let original = AudioBuffer::sine(440.0, 0.5, 0.25, 44100);
        save_wav(&original, &path, BitDepth::Float32).unwrap();
        let loaded = load_wav(&path).unwrap();

        assert_eq!(loaded.sample_rate(), 44100);
        assert_eq!(loaded.len(), original.len());
        assert_eq!(loaded.samples(), original.samples());
    }

    #[test]
    fn test_wav_16bit_within_quantization() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("int16.wav");

        let original = AudioBuffer::sine(220.0, 0.8, 0.25, 22050);
        save_wav(&original, &path, BitDepth::Int16).unwrap();
        let loaded = load_wav(&path).unwrap();

        assert_eq!(loaded.len(), original.len());
        for (a, b) in original.samples().iter().zip(loaded.samples()) {
            assert!((a - b).abs() < 1e-4, "{} vs {}", a, b);
        }
    }

    #[test]
    fn test_wav_integer_clamps_out_of_range() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hot.wav");

        let hot = AudioBuffer::new(vec![1.5, -2.0, 0.0], 8000);
        save_wav(&hot, &path, BitDepth::Int24).unwrap();
        let loaded = load_wav(&path).unwrap();

        assert!(loaded.samples()[0] <= 1.0 && loaded.samples()[0] > 0.999);
        assert!(loaded.samples()[1] >= -1.0 && loaded.samples()[1] < -0.999);
    }

    #[test]
    fn test_stereo_input_keeps_first_channel() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stereo.wav");

        let spec = WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for (l, r) in [(0.1_f32, 0.9_f32), (0.2, 0.8), (0.3, 0.7)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = load_wav(&path).unwrap();
        assert_eq!(loaded.samples(), &[0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = load_wav("definitely_missing_dirge.wav");
        assert!(matches!(result, Err(DirgeError::AudioRead { .. })));
    }

    #[test]
    fn test_load_garbage_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.wav");
        std::fs::write(&path, b"this is not a riff header").unwrap();
        assert!(matches!(load_wav(&path), Err(DirgeError::AudioRead { .. })));
    }

    #[test]
    fn test_checksum_tracks_content() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        let buffer = AudioBuffer::sine(110.0, 0.5, 0.1, 8000);
        save_wav(&buffer, &a, BitDepth::Int16).unwrap();
        save_wav(&buffer, &b, BitDepth::Int16).unwrap();

        let digest = file_checksum(&a).unwrap();
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, file_checksum(&b).unwrap());

        save_wav(&AudioBuffer::silence(800, 8000), &b, BitDepth::Int16).unwrap();
        assert_ne!(digest, file_checksum(&b).unwrap());
    }
}
