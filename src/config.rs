//! Configuration
//!
//! `RenderSpec` fixes the length, rate and seed of one render.
//! `SoundtrackConfig` bundles every tunable of the pipeline into one JSON
//! document. All fields default, so a partial file only overrides what it
//! names.

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::engine::buffer::{MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
use crate::engine::{BitDepth, DEFAULT_SAMPLE_RATE};
use crate::error::{DirgeError, Result};
use crate::gate::GateConfig;
use crate::layers::{AtmosphereParams, BassParams, EffectsParams, MelodyParams};
use crate::mixer::MixerConfig;

/// Default soundtrack length in seconds
pub const DEFAULT_DURATION_SECS: f64 = 12.0;

/// Default base seed for every noise component
pub const DEFAULT_SEED: u64 = 1031;

/// Longest render accepted
pub const MAX_DURATION_SECS: f64 = 3600.0;

/// Length, sample rate and seed shared by all generators of one render
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSpec {
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub seed: u64,
}

impl Default for RenderSpec {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            sample_rate: DEFAULT_SAMPLE_RATE,
            seed: DEFAULT_SEED,
        }
    }
}

impl RenderSpec {
    pub fn new(duration_secs: f64, sample_rate: u32) -> Self {
        Self {
            duration_secs,
            sample_rate,
            seed: DEFAULT_SEED,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// `round(duration_secs * sample_rate)`
    pub fn num_samples(&self) -> usize {
        (self.duration_secs * self.sample_rate as f64).round() as usize
    }

    pub fn validate(&self) -> Result<()> {
        if !self.duration_secs.is_finite()
            || self.duration_secs <= 0.0
            || self.duration_secs > MAX_DURATION_SECS
        {
            return Err(DirgeError::InvalidDuration {
                duration_secs: self.duration_secs,
            });
        }
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(DirgeError::InvalidSampleRate {
                sample_rate: self.sample_rate,
            });
        }
        if self.num_samples() == 0 {
            return Err(DirgeError::InvalidDuration {
                duration_secs: self.duration_secs,
            });
        }
        Ok(())
    }
}

/// Format of written WAV files
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub bit_depth: BitDepth,
}

/// Every tunable of the pipeline
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundtrackConfig {
    pub render: RenderSpec,
    pub bass: BassParams,
    pub melody: MelodyParams,
    pub atmosphere: AtmosphereParams,
    pub effects: EffectsParams,
    pub mixer: MixerConfig,
    pub gate: GateConfig,
    pub output: OutputConfig,
}

impl SoundtrackConfig {
    /// Load a JSON config, filling unspecified fields with defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| DirgeError::ConfigError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| DirgeError::ConfigError {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        config.validate()?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the config as pretty-printed JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.render.validate()?;
        self.mixer.validate()?;
        self.gate.validate()?;
        Ok(())
    }
}
