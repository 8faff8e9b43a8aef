//! Spectral variety
//!
//! How much the spectral centroid moves across overlapping windows. A static
//! timbre keeps the centroid in place.

use serde::{Deserialize, Serialize};

use super::report::{Check, Detail, Metric, MetricReport, Threshold};
use super::spectrum::SpectrumAnalyzer;
use super::{mean_and_std, window_len};
use crate::engine::AudioBuffer;
use crate::error::{DirgeError, Result};

pub const HAS_TIMBRAL_VARIETY: &str = "has_timbral_variety";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VarietyThresholds {
    pub window_secs: f64,
    pub hop_secs: f64,
    /// Centroid standard deviation must exceed this (Hz)
    pub min_centroid_std_hz: f64,
}

impl Default for VarietyThresholds {
    fn default() -> Self {
        Self {
            window_secs: 0.5,
            hop_secs: 0.25,
            min_centroid_std_hz: 200.0,
        }
    }
}

impl VarietyThresholds {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("window_secs", self.window_secs), ("hop_secs", self.hop_secs)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(DirgeError::InvalidParameter {
                    param: format!("gate.variety.{}", name),
                    value: value.to_string(),
                    expected: "> 0".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Centroid of every non-silent analysis window, in time order
pub fn centroids(buffer: &AudioBuffer, thresholds: &VarietyThresholds) -> Vec<f64> {
    let sr = buffer.sample_rate();
    let window = window_len(thresholds.window_secs, sr);
    let hop = window_len(thresholds.hop_secs, sr);
    let mut analyzer = SpectrumAnalyzer::new(window);
    buffer
        .windows(window, hop)
        .filter_map(|frame| analyzer.analyze(frame, sr).centroid())
        .collect()
}

pub fn evaluate(buffer: &AudioBuffer, thresholds: &VarietyThresholds) -> MetricReport {
    let centroids = centroids(buffer, thresholds);
    let spread = mean_and_std(&centroids).map(|(_, std)| std);

    let checks = vec![Check::measure(
        HAS_TIMBRAL_VARIETY,
        spread,
        Threshold::Above {
            limit: thresholds.min_centroid_std_hz,
        },
    )];

    let mut details = vec![Detail::new("windows", centroids.len() as f64)];
    if let Some(spread) = spread {
        details.push(Detail::new("spectral_centroid_std", spread));
    }
    if let Some(min) = centroids.iter().copied().reduce(f64::min) {
        details.push(Detail::new("min_centroid", min));
    }
    if let Some(max) = centroids.iter().copied().reduce(f64::max) {
        details.push(Detail::new("max_centroid", max));
    }

    MetricReport::new(Metric::SpectralVariety, checks, details)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_tone_has_no_variety() {
        let buffer = AudioBuffer::sine(440.0, 0.5, 4.0, 8000);
        let report = evaluate(&buffer, &VarietyThresholds::default());
        assert!(!report.passed);
        // (4.0 - 0.5) / 0.25 + 1 windows
        assert_eq!(report.detail("windows"), Some(15.0));
        let spread = report.detail("spectral_centroid_std").unwrap();
        assert!(spread < 1.0, "spread {}", spread);
    }

    #[test]
    fn test_alternating_tones_pass() {
        let low = AudioBuffer::sine(200.0, 0.5, 1.0, 8000).into_samples();
        let high = AudioBuffer::sine(2000.0, 0.5, 1.0, 8000).into_samples();
        let samples: Vec<f32> = [
            low.as_slice(),
            high.as_slice(),
            low.as_slice(),
            high.as_slice(),
        ]
        .concat();
        let buffer = AudioBuffer::new(samples, 8000);
        let report = evaluate(&buffer, &VarietyThresholds::default());
        assert!(report.passed, "{:?}", report);
        assert!(report.detail("min_centroid").unwrap() < 400.0);
        assert!(report.detail("max_centroid").unwrap() > 1800.0);
    }

    #[test]
    fn test_silent_windows_are_skipped() {
        let mut samples = vec![0.0_f32; 8000];
        samples.extend(AudioBuffer::sine(440.0, 0.5, 1.0, 8000).samples());
        let buffer = AudioBuffer::new(samples, 8000);
        // Windows starting at 0, 0.25 and 0.5 s are silent
        assert_eq!(centroids(&buffer, &VarietyThresholds::default()).len(), 4);
    }

    #[test]
    fn test_silence_has_undefined_spread() {
        let buffer = AudioBuffer::silence(16000, 8000);
        let report = evaluate(&buffer, &VarietyThresholds::default());
        assert!(!report.passed);
        assert_eq!(report.check(HAS_TIMBRAL_VARIETY).unwrap().measured, None);
    }
}
