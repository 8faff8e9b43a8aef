//! Static compressor
//!
//! A memoryless, sample-wise dynamics processor. Any sample whose magnitude
//! exceeds the threshold has the excess divided by the ratio; samples at or
//! below the threshold pass through unchanged. The sign is always preserved.

use serde::{Deserialize, Serialize};

use crate::error::{DirgeError, Result};

/// Compressor parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorParams {
    /// Linear threshold (0.0 exclusive to 1.0)
    pub threshold: f32,
    /// Compression ratio (1.0 to 100.0, representing 1:1 to 100:1)
    pub ratio: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            ratio: 3.0,
        }
    }
}

impl CompressorParams {
    /// Validate parameters against their ranges
    pub fn validate(&self) -> Result<()> {
        if !(self.threshold > 0.0 && self.threshold <= 1.0) {
            return Err(DirgeError::InvalidParameter {
                param: "compression.threshold".to_string(),
                value: self.threshold.to_string(),
                expected: "0.0 < threshold <= 1.0".to_string(),
            });
        }
        if !(1.0..=100.0).contains(&self.ratio) {
            return Err(DirgeError::InvalidParameter {
                param: "compression.ratio".to_string(),
                value: self.ratio.to_string(),
                expected: "1.0 to 100.0".to_string(),
            });
        }
        Ok(())
    }
}

/// Sample-wise threshold/ratio compressor
#[derive(Debug, Clone, Copy)]
pub struct StaticCompressor {
    params: CompressorParams,
}

impl StaticCompressor {
    pub fn new(params: CompressorParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &CompressorParams {
        &self.params
    }

    /// Compress a single sample
    #[inline]
    pub fn process(&self, sample: f32) -> f32 {
        let magnitude = sample.abs();
        if magnitude <= self.params.threshold {
            return sample;
        }
        let compressed =
            self.params.threshold + (magnitude - self.params.threshold) / self.params.ratio;
        compressed.copysign(sample)
    }

    /// Compress a slice in place, returning how many samples were reduced
    pub fn process_slice(&self, samples: &mut [f32]) -> usize {
        let mut reduced = 0;
        for sample in samples.iter_mut() {
            if sample.abs() > self.params.threshold {
                reduced += 1;
            }
            *sample = self.process(*sample);
        }
        reduced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_below_threshold_passes_through() {
        let comp = StaticCompressor::new(CompressorParams::default()).unwrap();
        for x in [0.0, 0.1, -0.2, 0.3, -0.3] {
            assert_eq!(comp.process(x), x);
        }
    }

    #[test]
    fn test_excess_divided_by_ratio() {
        let comp = StaticCompressor::new(CompressorParams::default()).unwrap();
        // 0.3 + (0.9 - 0.3) / 3 = 0.5
        assert_abs_diff_eq!(comp.process(0.9), 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(comp.process(-0.9), -0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_ratio_one_is_transparent() {
        let comp = StaticCompressor::new(CompressorParams {
            threshold: 0.3,
            ratio: 1.0,
        })
        .unwrap();
        assert_abs_diff_eq!(comp.process(0.95), 0.95, epsilon = 1e-6);
    }

    #[test]
    fn test_process_slice_counts_reductions() {
        let comp = StaticCompressor::new(CompressorParams::default()).unwrap();
        let mut samples = vec![0.1, 0.6, -0.6, 0.3];
        assert_eq!(comp.process_slice(&mut samples), 2);
        assert_abs_diff_eq!(samples[1], 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(samples[2], -0.4, epsilon = 1e-6);
    }

    #[test]
    fn test_invalid_params_rejected() {
        let bad_threshold = CompressorParams {
            threshold: 0.0,
            ratio: 3.0,
        };
        assert!(matches!(
            StaticCompressor::new(bad_threshold),
            Err(DirgeError::InvalidParameter { .. })
        ));

        let bad_ratio = CompressorParams {
            threshold: 0.3,
            ratio: 0.5,
        };
        assert!(bad_ratio.validate().is_err());
    }
}
