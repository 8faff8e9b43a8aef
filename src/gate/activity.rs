//! Activity distribution
//!
//! Fraction of non-overlapping windows carrying sound, and how much window
//! energy varies over the timeline.

use serde::{Deserialize, Serialize};

use super::report::{Check, Detail, Metric, MetricReport, Threshold};
use super::{mean_and_std, window_len};
use crate::engine::buffer::energy;
use crate::engine::AudioBuffer;
use crate::error::{DirgeError, Result};

pub const MOSTLY_ACTIVE: &str = "mostly_active";
pub const HAS_VARIATION: &str = "has_variation";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityThresholds {
    pub window_secs: f64,
    /// Window energy (sum of squares) above which a window counts as active
    pub active_energy: f64,
    pub min_active_ratio: f64,
    /// Window energy standard deviation must exceed this
    pub min_energy_std: f64,
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        Self {
            window_secs: 0.5,
            active_energy: 0.001,
            min_active_ratio: 0.85,
            min_energy_std: 0.01,
        }
    }
}

impl ActivityThresholds {
    pub fn validate(&self) -> Result<()> {
        if !(self.window_secs > 0.0 && self.window_secs.is_finite()) {
            return Err(DirgeError::InvalidParameter {
                param: "gate.activity.window_secs".to_string(),
                value: self.window_secs.to_string(),
                expected: "> 0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.min_active_ratio) {
            return Err(DirgeError::InvalidParameter {
                param: "gate.activity.min_active_ratio".to_string(),
                value: self.min_active_ratio.to_string(),
                expected: "0.0..=1.0".to_string(),
            });
        }
        Ok(())
    }
}

pub fn evaluate(buffer: &AudioBuffer, thresholds: &ActivityThresholds) -> MetricReport {
    let window = window_len(thresholds.window_secs, buffer.sample_rate());
    let energies: Vec<f64> = buffer.windows(window, window).map(energy).collect();

    let active = energies
        .iter()
        .filter(|&&e| e > thresholds.active_energy)
        .count();
    let ratio = if energies.is_empty() {
        None
    } else {
        Some(active as f64 / energies.len() as f64)
    };
    let spread = mean_and_std(&energies).map(|(_, std)| std);

    let checks = vec![
        Check::measure(
            MOSTLY_ACTIVE,
            ratio,
            Threshold::Between {
                low: thresholds.min_active_ratio,
                high: 1.0,
            },
        ),
        Check::measure(
            HAS_VARIATION,
            spread,
            Threshold::Above {
                limit: thresholds.min_energy_std,
            },
        ),
    ];

    let mut details = vec![Detail::new("windows", energies.len() as f64)];
    if let Some(ratio) = ratio {
        details.push(Detail::new("activity_ratio", ratio));
    }
    if let Some(spread) = spread {
        details.push(Detail::new("energy_variation", spread));
    }

    MetricReport::new(Metric::ActivityDistribution, checks, details)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_is_inactive() {
        let buffer = AudioBuffer::silence(8000 * 6, 8000);
        let report = evaluate(&buffer, &ActivityThresholds::default());
        assert!(!report.passed);
        assert_eq!(report.check(MOSTLY_ACTIVE).unwrap().measured, Some(0.0));
        assert_eq!(report.check(HAS_VARIATION).unwrap().measured, Some(0.0));
    }

    #[test]
    fn test_steady_tone_is_active_but_flat() {
        let buffer = AudioBuffer::sine(200.0, 0.5, 6.0, 8000);
        let report = evaluate(&buffer, &ActivityThresholds::default());
        assert_eq!(report.detail("windows"), Some(12.0));
        assert!(report.check(MOSTLY_ACTIVE).unwrap().passed);
        assert!(!report.check(HAS_VARIATION).unwrap().passed);
    }

    #[test]
    fn test_swelling_tone_passes() {
        let mut buffer = AudioBuffer::sine(200.0, 1.0, 6.0, 8000);
        let len = buffer.len() as f32;
        for (i, s) in buffer.samples_mut().iter_mut().enumerate() {
            *s *= 0.1 + 0.8 * i as f32 / len;
        }
        let report = evaluate(&buffer, &ActivityThresholds::default());
        assert!(report.passed, "{:?}", report);
    }

    #[test]
    fn test_gap_lowers_ratio() {
        let mut samples = AudioBuffer::sine(200.0, 0.5, 4.0, 8000).into_samples();
        // Silence the middle two seconds
        samples[8000..24000].iter_mut().for_each(|s| *s = 0.0);
        let buffer = AudioBuffer::new(samples, 8000);
        let report = evaluate(&buffer, &ActivityThresholds::default());
        assert_eq!(report.detail("activity_ratio"), Some(0.5));
        assert!(!report.check(MOSTLY_ACTIVE).unwrap().passed);
    }

    #[test]
    fn test_too_short_for_one_window() {
        let buffer = AudioBuffer::sine(200.0, 0.5, 0.25, 8000);
        let report = evaluate(&buffer, &ActivityThresholds::default());
        assert!(!report.passed);
        assert_eq!(report.check(MOSTLY_ACTIVE).unwrap().measured, None);
    }
}
