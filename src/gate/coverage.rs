//! Frequency coverage
//!
//! Share of spectral magnitude falling in each of six fixed bands, as a
//! percentage of the sum over all bands.

use serde::{Deserialize, Serialize};

use super::report::{Check, Detail, Metric, MetricReport, Threshold};
use super::spectrum::Spectrum;
use crate::engine::AudioBuffer;
use crate::error::{DirgeError, Result};

pub const HAS_SUB_BASS: &str = "has_sub_bass";
pub const HAS_BASS: &str = "has_bass";
pub const HAS_MIDS: &str = "has_mids";
pub const HAS_HIGHS: &str = "has_highs";
pub const NOT_TOO_MID_HEAVY: &str = "not_too_mid_heavy";

/// Band name with inclusive edges in Hz
pub const BANDS: [(&str, f64, f64); 6] = [
    ("sub_bass", 20.0, 60.0),
    ("bass", 60.0, 250.0),
    ("low_mid", 250.0, 500.0),
    ("mid", 500.0, 2000.0),
    ("high_mid", 2000.0, 6000.0),
    ("high", 6000.0, 12000.0),
];

/// Minimum and maximum band shares, in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageThresholds {
    pub min_sub_bass: f64,
    pub min_bass: f64,
    pub min_mid: f64,
    pub min_high_mid: f64,
    pub max_mid: f64,
}

impl Default for CoverageThresholds {
    fn default() -> Self {
        Self {
            min_sub_bass: 15.0,
            min_bass: 20.0,
            min_mid: 10.0,
            min_high_mid: 5.0,
            max_mid: 40.0,
        }
    }
}

impl CoverageThresholds {
    pub fn validate(&self) -> Result<()> {
        let all = [
            ("min_sub_bass", self.min_sub_bass),
            ("min_bass", self.min_bass),
            ("min_mid", self.min_mid),
            ("min_high_mid", self.min_high_mid),
            ("max_mid", self.max_mid),
        ];
        for (name, value) in all {
            if !(0.0..=100.0).contains(&value) {
                return Err(DirgeError::InvalidParameter {
                    param: format!("gate.coverage.{}", name),
                    value: value.to_string(),
                    expected: "a percentage in 0..=100".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Percentage share of each band in `BANDS` order, `None` when every band is empty
pub fn band_shares(spectrum: &Spectrum) -> Option<[f64; 6]> {
    let sums = BANDS.map(|(_, low, high)| spectrum.band_sum(low, high));
    let total: f64 = sums.iter().sum();
    if total <= 0.0 {
        return None;
    }
    Some(sums.map(|s| s / total * 100.0))
}

pub fn evaluate(buffer: &AudioBuffer, thresholds: &CoverageThresholds) -> MetricReport {
    let spectrum = Spectrum::compute(buffer.samples(), buffer.sample_rate());
    let shares = band_shares(&spectrum);
    let share = |band: usize| shares.map(|s| s[band]);

    let checks = vec![
        Check::measure(
            HAS_SUB_BASS,
            share(0),
            Threshold::Above {
                limit: thresholds.min_sub_bass,
            },
        ),
        Check::measure(
            HAS_BASS,
            share(1),
            Threshold::Above {
                limit: thresholds.min_bass,
            },
        ),
        Check::measure(
            HAS_MIDS,
            share(3),
            Threshold::Above {
                limit: thresholds.min_mid,
            },
        ),
        Check::measure(
            HAS_HIGHS,
            share(4),
            Threshold::Above {
                limit: thresholds.min_high_mid,
            },
        ),
        Check::measure(
            NOT_TOO_MID_HEAVY,
            share(3),
            Threshold::Below {
                limit: thresholds.max_mid,
            },
        ),
    ];

    let details = match shares {
        Some(shares) => BANDS
            .iter()
            .zip(shares)
            .map(|((name, _, _), share)| Detail::new(*name, share))
            .collect(),
        None => Vec::new(),
    };

    MetricReport::new(Metric::FrequencyCoverage, checks, details)
}
