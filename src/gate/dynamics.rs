//! Dynamic range
//!
//! Crest factor (peak over RMS, in dB) plus an overall loudness floor.

use serde::{Deserialize, Serialize};

use super::report::{Check, Detail, Metric, MetricReport, Threshold};
use crate::engine::buffer::{energy, peak};
use crate::engine::AudioBuffer;
use crate::error::{DirgeError, Result};

pub const HAS_DYNAMICS: &str = "has_dynamics";
pub const NOT_OVER_DYNAMIC: &str = "not_over_dynamic";
pub const ADEQUATE_VOLUME: &str = "adequate_volume";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicsThresholds {
    /// Crest factor must exceed this (dB)
    pub min_crest_db: f64,
    /// Crest factor must stay below this (dB)
    pub max_crest_db: f64,
    /// Linear RMS must exceed this
    pub min_rms: f64,
}

impl Default for DynamicsThresholds {
    fn default() -> Self {
        Self {
            min_crest_db: 4.0,
            max_crest_db: 15.0,
            min_rms: 0.1,
        }
    }
}

impl DynamicsThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_crest_db < self.max_crest_db) {
            return Err(DirgeError::InvalidParameter {
                param: "gate.dynamics.min_crest_db".to_string(),
                value: self.min_crest_db.to_string(),
                expected: format!("less than max_crest_db ({})", self.max_crest_db),
            });
        }
        if !(self.min_rms >= 0.0) {
            return Err(DirgeError::InvalidParameter {
                param: "gate.dynamics.min_rms".to_string(),
                value: self.min_rms.to_string(),
                expected: ">= 0".to_string(),
            });
        }
        Ok(())
    }
}

/// RMS with f64 precision
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    (energy(samples) / samples.len() as f64).sqrt()
}

/// `20 * log10(peak / rms)`; zero RMS has no crest factor
pub fn crest_factor_db(samples: &[f32]) -> Result<f64> {
    let level = rms(samples);
    if level <= 0.0 {
        return Err(DirgeError::SilentBuffer);
    }
    Ok(20.0 * (peak(samples) as f64 / level).log10())
}

pub fn evaluate(buffer: &AudioBuffer, thresholds: &DynamicsThresholds) -> MetricReport {
    let samples = buffer.samples();
    let level = rms(samples);
    let crest = crest_factor_db(samples).ok();

    let checks = vec![
        Check::measure(
            HAS_DYNAMICS,
            crest,
            Threshold::Above {
                limit: thresholds.min_crest_db,
            },
        ),
        Check::measure(
            NOT_OVER_DYNAMIC,
            crest,
            Threshold::Below {
                limit: thresholds.max_crest_db,
            },
        ),
        Check::measure(
            ADEQUATE_VOLUME,
            Some(level),
            Threshold::Above {
                limit: thresholds.min_rms,
            },
        ),
    ];

    let mut details = Vec::with_capacity(3);
    if let Some(crest) = crest {
        details.push(Detail::new("crest_factor_db", crest));
    }
    details.push(Detail::new("rms_level", level));
    details.push(Detail::new("peak_level", peak(samples) as f64));

    MetricReport::new(Metric::DynamicRange, checks, details)
}
