//! Error types for Dirge
//!
//! All errors in Dirge use the DirgeError type. Every variant carries a
//! stable error code and a recovery hint for the CLI.

use thiserror::Error;

/// Result type alias using DirgeError
pub type Result<T> = std::result::Result<T, DirgeError>;

/// All possible errors in Dirge
#[derive(Error, Debug)]
pub enum DirgeError {
    // Audio I/O errors
    #[error("Failed to read audio file: {path}")]
    AudioRead {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Failed to write audio file: {path}")]
    AudioWrite {
        path: String,
        #[source]
        source: hound::Error,
    },

    #[error("Unsupported audio format: {details}")]
    UnsupportedFormat { details: String },

    // Render errors
    #[error("Invalid duration: {duration_secs}s (must be finite, positive and at most 1 hour)")]
    InvalidDuration { duration_secs: f64 },

    #[error("Invalid sample rate: {sample_rate} Hz (supported: 8000..=192000)")]
    InvalidSampleRate { sample_rate: u32 },

    // Analysis errors
    #[error("Audio buffer is empty")]
    EmptyBuffer,

    #[error("Audio buffer is silent: crest factor is undefined for zero RMS")]
    SilentBuffer,

    // Mixer errors
    #[error("Nothing to mix: no layers were supplied")]
    EmptyMix,

    #[error("Layer '{layer}' was supplied more than once")]
    DuplicateLayer { layer: String },

    #[error("Layer '{layer}' has {actual} samples, expected {expected}")]
    LengthMismatch {
        layer: String,
        expected: usize,
        actual: usize,
    },

    #[error("Sample rate mismatch: expected {expected}, got {actual}")]
    SampleRateMismatch { expected: u32, actual: u32 },

    #[error("Invalid parameter: {param} = {value} (expected {expected})")]
    InvalidParameter {
        param: String,
        value: String,
        expected: String,
    },

    // Configuration errors
    #[error("Configuration error in {path}: {reason}")]
    ConfigError { path: String, reason: String },

    // Generic I/O
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DirgeError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::AudioRead { .. } => "AUDIO_READ",
            Self::AudioWrite { .. } => "AUDIO_WRITE",
            Self::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
            Self::InvalidDuration { .. } => "INVALID_DURATION",
            Self::InvalidSampleRate { .. } => "INVALID_SAMPLE_RATE",
            Self::EmptyBuffer => "EMPTY_BUFFER",
            Self::SilentBuffer => "SILENT_BUFFER",
            Self::EmptyMix => "EMPTY_MIX",
            Self::DuplicateLayer { .. } => "DUPLICATE_LAYER",
            Self::LengthMismatch { .. } => "LENGTH_MISMATCH",
            Self::SampleRateMismatch { .. } => "SAMPLE_RATE_MISMATCH",
            Self::InvalidParameter { .. } => "INVALID_PARAMETER",
            Self::ConfigError { .. } => "CONFIG_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Returns a suggested recovery action for this error
    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::AudioRead { .. } => "Check that the file exists and is a valid WAV file",
            Self::AudioWrite { .. } => "Check that the output directory exists and is writable",
            Self::UnsupportedFormat { .. } => "Use 16-bit, 24-bit or 32-bit float WAV",
            Self::InvalidDuration { .. } => "Pick a duration between a few milliseconds and one hour",
            Self::InvalidSampleRate { .. } => "Use a standard rate such as 44100 or 48000 Hz",
            Self::EmptyBuffer => "Render or load audio before analysing it",
            Self::SilentBuffer => "The mix is silent; raise the layer gains",
            Self::EmptyMix => "Generate at least one layer before mixing",
            Self::DuplicateLayer { .. } => "Pass each layer kind once",
            Self::LengthMismatch { .. } | Self::SampleRateMismatch { .. } => {
                "Render every layer with the same duration and sample rate"
            }
            Self::InvalidParameter { .. } => "Adjust the parameter to be within valid range",
            Self::ConfigError { .. } => "Run `dirge config` to see a valid configuration",
            _ => "Check the error details and try again",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DirgeError::LengthMismatch {
            layer: "melody".to_string(),
            expected: 10,
            actual: 9,
        };
        assert_eq!(err.error_code(), "LENGTH_MISMATCH");
        assert!(err.to_string().contains("melody"));
    }

    #[test]
    fn test_silent_buffer_is_distinct_from_read_failure() {
        let silent = DirgeError::SilentBuffer;
        let io = DirgeError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_ne!(silent.error_code(), io.error_code());
        assert!(!silent.recovery_hint().is_empty());
    }
}
