//! Quality Gate
//!
//! Five independent measurements over a finished soundtrack:
//! - Frequency coverage: band shares of the magnitude spectrum
//! - Dynamic range: crest factor and loudness
//! - Activity distribution: how much of the timeline carries sound
//! - Spectral variety: movement of the spectral centroid
//! - Pacing: count and spread of energy peaks
//!
//! Every metric reads the buffer and nothing else, so the gate is
//! idempotent and the metric order is irrelevant. Aggregate pass means all
//! five pass.

pub mod activity;
pub mod coverage;
pub mod dynamics;
pub mod pacing;
pub mod report;
pub mod spectrum;
pub mod variety;

pub use activity::ActivityThresholds;
pub use coverage::CoverageThresholds;
pub use dynamics::DynamicsThresholds;
pub use pacing::PacingThresholds;
pub use report::{Check, Detail, Metric, MetricReport, QualityReport, Threshold};
pub use spectrum::{Spectrum, SpectrumAnalyzer};
pub use variety::VarietyThresholds;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::engine::AudioBuffer;
use crate::error::Result;

/// Thresholds and window sizes of all five metrics
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub coverage: CoverageThresholds,
    pub dynamics: DynamicsThresholds,
    pub activity: ActivityThresholds,
    pub variety: VarietyThresholds,
    pub pacing: PacingThresholds,
}

impl GateConfig {
    pub fn validate(&self) -> Result<()> {
        self.coverage.validate()?;
        self.dynamics.validate()?;
        self.activity.validate()?;
        self.variety.validate()?;
        self.pacing.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct QualityGate {
    config: GateConfig,
}

impl QualityGate {
    pub fn new(config: GateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Run every metric over `buffer`
    pub fn evaluate(&self, buffer: &AudioBuffer) -> Result<QualityReport> {
        buffer.ensure_not_empty()?;

        let metrics = vec![
            coverage::evaluate(buffer, &self.config.coverage),
            dynamics::evaluate(buffer, &self.config.dynamics),
            activity::evaluate(buffer, &self.config.activity),
            variety::evaluate(buffer, &self.config.variety),
            pacing::evaluate(buffer, &self.config.pacing),
        ];

        for metric in &metrics {
            if metric.passed {
                debug!("{}: pass", metric.metric);
            } else {
                let failed: Vec<&str> = metric
                    .checks
                    .iter()
                    .filter(|c| !c.passed)
                    .map(|c| c.name.as_str())
                    .collect();
                warn!("{}: fail ({})", metric.metric, failed.join(", "));
            }
        }

        Ok(QualityReport::new(metrics))
    }
}

/// Analysis window length in samples, at least one
pub(crate) fn window_len(secs: f64, sample_rate: u32) -> usize {
    ((secs * sample_rate as f64) as usize).max(1)
}

/// Mean and population standard deviation, `None` for an empty slice
pub(crate) fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirgeError;

    #[test]
    fn test_population_std() {
        let (mean, std) = mean_and_std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((mean - 5.0).abs() < 1e-12);
        assert!((std - 2.0).abs() < 1e-12);
        assert_eq!(mean_and_std(&[]), None);
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let gate = QualityGate::default();
        let empty = AudioBuffer::new(Vec::new(), 44100);
        assert!(matches!(gate.evaluate(&empty), Err(DirgeError::EmptyBuffer)));
    }

    #[test]
    fn test_report_lists_metrics_in_order() {
        let gate = QualityGate::default();
        let report = gate
            .evaluate(&AudioBuffer::sine(220.0, 0.5, 2.0, 8000))
            .unwrap();
        let order: Vec<Metric> = report.metrics.iter().map(|m| m.metric).collect();
        assert_eq!(order, Metric::ALL.to_vec());
    }

    #[test]
    fn test_evaluate_does_not_mutate() {
        let buffer = AudioBuffer::sine(220.0, 0.5, 2.0, 8000);
        let before = buffer.clone();
        let gate = QualityGate::default();
        let first = gate.evaluate(&buffer).unwrap();
        let second = gate.evaluate(&buffer).unwrap();
        assert_eq!(buffer, before);
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GateConfig {
            pacing: PacingThresholds {
                segments: 0,
                ..PacingThresholds::default()
            },
            ..GateConfig::default()
        };
        assert!(QualityGate::new(config).is_err());
    }
}
