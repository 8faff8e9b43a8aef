//! Pacing
//!
//! Counts energy peaks ("events") over short overlapping windows and checks
//! that they are spread across the whole timeline.

use serde::{Deserialize, Serialize};

use super::report::{Check, Detail, Metric, MetricReport, Threshold};
use super::{mean_and_std, window_len};
use crate::engine::buffer::energy;
use crate::engine::AudioBuffer;
use crate::error::{DirgeError, Result};

pub const HAS_EVENTS: &str = "has_events";
pub const WELL_DISTRIBUTED: &str = "well_distributed";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingThresholds {
    pub window_secs: f64,
    pub hop_secs: f64,
    /// Events must rise above mean + `sigma` standard deviations
    pub sigma: f64,
    /// Total event count must exceed this
    pub min_events: usize,
    /// Number of equal timeline segments that must each hold an event
    pub segments: usize,
}

impl Default for PacingThresholds {
    fn default() -> Self {
        Self {
            window_secs: 0.1,
            hop_secs: 0.05,
            sigma: 1.5,
            min_events: 5,
            segments: 3,
        }
    }
}

impl PacingThresholds {
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("window_secs", self.window_secs), ("hop_secs", self.hop_secs)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(DirgeError::InvalidParameter {
                    param: format!("gate.pacing.{}", name),
                    value: value.to_string(),
                    expected: "> 0".to_string(),
                });
            }
        }
        if self.segments == 0 {
            return Err(DirgeError::InvalidParameter {
                param: "gate.pacing.segments".to_string(),
                value: "0".to_string(),
                expected: ">= 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Indices of windows above `threshold` that are also local energy maxima
///
/// A plateau counts once, at its first window, and only when the first
/// different window after it is lower (or the plateau runs to the end).
pub fn detect_events(energies: &[f64], threshold: f64) -> Vec<usize> {
    (0..energies.len())
        .filter(|&i| {
            let e = energies[i];
            if e <= threshold || (i > 0 && e <= energies[i - 1]) {
                return false;
            }
            energies[i + 1..]
                .iter()
                .find(|&&next| next != e)
                .map_or(true, |&next| next < e)
        })
        .collect()
}

/// Event counts per segment; the last segment takes any remainder windows
pub fn events_per_segment(events: &[usize], num_windows: usize, segments: usize) -> Vec<usize> {
    let mut counts = vec![0; segments];
    if segments == 0 {
        return counts;
    }
    let segment_len = num_windows / segments;
    for &index in events {
        let segment = if segment_len == 0 {
            index
        } else {
            index / segment_len
        };
        counts[segment.min(segments - 1)] += 1;
    }
    counts
}

pub fn evaluate(buffer: &AudioBuffer, thresholds: &PacingThresholds) -> MetricReport {
    let sr = buffer.sample_rate();
    let window = window_len(thresholds.window_secs, sr);
    let hop = window_len(thresholds.hop_secs, sr);
    let energies: Vec<f64> = buffer.windows(window, hop).map(energy).collect();

    let stats = mean_and_std(&energies);
    let events = match stats {
        Some((mean, std)) => detect_events(&energies, mean + thresholds.sigma * std),
        None => Vec::new(),
    };
    let per_segment = events_per_segment(&events, energies.len(), thresholds.segments);
    let quietest = per_segment.iter().copied().min().unwrap_or(0);

    let checks = vec![
        Check::measure(
            HAS_EVENTS,
            Some(events.len() as f64),
            Threshold::Above {
                limit: thresholds.min_events as f64,
            },
        ),
        Check::measure(
            WELL_DISTRIBUTED,
            Some(quietest as f64),
            Threshold::Above { limit: 0.0 },
        ),
    ];

    let mut details = vec![Detail::new("total_events", events.len() as f64)];
    if let Some((mean, std)) = stats {
        details.push(Detail::new(
            "event_threshold",
            mean + thresholds.sigma * std,
        ));
    }
    for (i, count) in per_segment.iter().enumerate() {
        details.push(Detail::new(format!("segment_{}_events", i + 1), *count as f64));
    }

    MetricReport::new(Metric::Pacing, checks, details)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quiet bed with short loud bursts at the given times
    fn bursts(times: &[f64], duration: f64, sample_rate: u32) -> AudioBuffer {
        let mut samples = AudioBuffer::sine(100.0, 0.05, duration, sample_rate).into_samples();
        let burst = (0.05 * sample_rate as f64) as usize;
        for &time in times {
            let start = (time * sample_rate as f64) as usize;
            for s in &mut samples[start..start + burst] {
                *s *= 15.0;
            }
        }
        AudioBuffer::new(samples, sample_rate)
    }

    #[test]
    fn test_detect_events_local_maxima() {
        let energies = [0.0, 5.0, 3.0, 6.0, 6.0, 1.0, 0.0, 9.0];
        assert_eq!(detect_events(&energies, 2.0), vec![1, 3, 7]);
        assert!(detect_events(&energies, 10.0).is_empty());
    }

    #[test]
    fn test_plateau_before_a_rise_is_not_an_event() {
        assert_eq!(detect_events(&[0.0, 5.0, 5.0, 6.0, 0.0], 1.0), vec![3]);
        assert_eq!(detect_events(&[0.0, 5.0, 5.0, 5.0, 2.0], 1.0), vec![1]);
        assert_eq!(detect_events(&[0.0, 4.0, 4.0], 1.0), vec![1]);
    }

    #[test]
    fn test_segments_take_remainder_at_end() {
        assert_eq!(events_per_segment(&[0, 3, 9, 10], 11, 3), vec![1, 1, 2]);
        assert_eq!(events_per_segment(&[0, 1], 2, 3), vec![1, 1, 0]);
    }

    #[test]
    fn test_well_spread_bursts_pass() {
        let buffer = bursts(&[0.7, 1.9, 3.1, 4.6, 6.2, 7.3, 8.8], 9.0, 8000);
        let report = evaluate(&buffer, &PacingThresholds::default());
        assert!(report.passed, "{:?}", report);
        assert_eq!(report.detail("total_events"), Some(7.0));
    }

    #[test]
    fn test_clustered_bursts_fail_distribution() {
        let buffer = bursts(&[0.5, 0.9, 1.3, 1.7, 2.1, 2.5], 9.0, 8000);
        let report = evaluate(&buffer, &PacingThresholds::default());
        assert!(report.check(HAS_EVENTS).unwrap().passed);
        assert!(!report.check(WELL_DISTRIBUTED).unwrap().passed);
        assert_eq!(report.detail("segment_3_events"), Some(0.0));
    }

    #[test]
    fn test_silence_has_no_events() {
        let buffer = AudioBuffer::silence(8000 * 3, 8000);
        let report = evaluate(&buffer, &PacingThresholds::default());
        assert!(!report.passed);
        assert_eq!(report.detail("total_events"), Some(0.0));
    }
}
