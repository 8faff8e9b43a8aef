//! Magnitude spectrum
//!
//! The one FFT utility shared by the frequency coverage and spectral variety
//! metrics. No window function is applied; the metrics are defined over the
//! raw (rectangular) frame.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Positive-frequency magnitudes of one frame, bins 0 through N/2
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    magnitudes: Vec<f64>,
    bin_hz: f64,
}

impl Spectrum {
    /// One-shot spectrum of `samples`
    pub fn compute(samples: &[f32], sample_rate: u32) -> Self {
        SpectrumAnalyzer::new(samples.len()).analyze(samples, sample_rate)
    }

    pub fn magnitudes(&self) -> &[f64] {
        &self.magnitudes
    }

    /// Width of one bin in Hz
    pub fn bin_hz(&self) -> f64 {
        self.bin_hz
    }

    #[inline]
    pub fn frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_hz
    }

    /// Sum of magnitudes for bins with `low_hz <= f <= high_hz`
    pub fn band_sum(&self, low_hz: f64, high_hz: f64) -> f64 {
        self.magnitudes
            .iter()
            .enumerate()
            .filter(|(bin, _)| {
                let f = self.frequency(*bin);
                f >= low_hz && f <= high_hz
            })
            .map(|(_, m)| m)
            .sum()
    }

    pub fn total(&self) -> f64 {
        self.magnitudes.iter().sum()
    }

    /// Magnitude-weighted mean frequency, `None` for an all-zero frame
    pub fn centroid(&self) -> Option<f64> {
        let total = self.total();
        if total <= 0.0 {
            return None;
        }
        let weighted: f64 = self
            .magnitudes
            .iter()
            .enumerate()
            .map(|(bin, m)| self.frequency(bin) * m)
            .sum();
        Some(weighted / total)
    }
}

/// FFT planned once for a fixed frame size and reused across frames
pub struct SpectrumAnalyzer {
    fft: Option<Arc<dyn Fft<f64>>>,
    size: usize,
    frame: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl SpectrumAnalyzer {
    pub fn new(size: usize) -> Self {
        if size == 0 {
            return Self {
                fft: None,
                size,
                frame: Vec::new(),
                scratch: Vec::new(),
            };
        }
        let fft = FftPlanner::<f64>::new().plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        Self {
            fft: Some(fft),
            size,
            frame: vec![Complex::new(0.0, 0.0); size],
            scratch,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Spectrum of the first `size` samples; short input is zero-padded
    pub fn analyze(&mut self, samples: &[f32], sample_rate: u32) -> Spectrum {
        let Some(fft) = &self.fft else {
            return Spectrum {
                magnitudes: Vec::new(),
                bin_hz: 0.0,
            };
        };

        for (i, slot) in self.frame.iter_mut().enumerate() {
            let sample = samples.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(sample as f64, 0.0);
        }
        fft.process_with_scratch(&mut self.frame, &mut self.scratch);

        Spectrum {
            magnitudes: self.frame[..=self.size / 2].iter().map(|c| c.norm()).collect(),
            bin_hz: sample_rate as f64 / self.size as f64,
        }
    }
}
