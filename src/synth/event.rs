//! Event placement
//!
//! Transient events (tolls, footsteps, chains) are rendered as short bursts
//! and summed into a layer at fixed time offsets.

use log::debug;

/// Add `burst` into `buffer` starting at `start_secs`
///
/// Bursts running past the end are truncated. A burst starting at or after
/// the end of the buffer is dropped. Returns whether anything was added.
pub fn place(buffer: &mut [f32], sample_rate: u32, start_secs: f32, burst: &[f32]) -> bool {
    if start_secs < 0.0 || !start_secs.is_finite() {
        return false;
    }
    let start = (start_secs as f64 * sample_rate as f64) as usize;
    if start >= buffer.len() {
        debug!(
            "Dropping event at {:.2}s: past the end of a {:.2}s buffer",
            start_secs,
            buffer.len() as f64 / sample_rate as f64
        );
        return false;
    }

    let end = (start + burst.len()).min(buffer.len());
    for (dst, src) in buffer[start..end].iter_mut().zip(burst) {
        *dst += *src;
    }
    true
}

/// Add `source * gain` into `buffer` sample by sample
pub fn mix_into(buffer: &mut [f32], source: &[f32], gain: f32) {
    for (dst, src) in buffer.iter_mut().zip(source) {
        *dst += *src * gain;
    }
}

/// Number of samples in a burst of `secs` seconds
pub fn burst_len(secs: f32, sample_rate: u32) -> usize {
    (secs.max(0.0) as f64 * sample_rate as f64) as usize
}

/// `count` offsets starting at `first`, `step` seconds apart
pub fn evenly_spaced(first: f32, step: f32, count: usize) -> Vec<f32> {
    (0..count).map(|i| first + step * i as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_adds_at_offset() {
        let mut buffer = vec![0.0_f32; 10];
        assert!(place(&mut buffer, 10, 0.3, &[1.0, 2.0]));
        assert_eq!(buffer, vec![0.0, 0.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_place_truncates_at_end() {
        let mut buffer = vec![0.0_f32; 5];
        assert!(place(&mut buffer, 10, 0.3, &[1.0, 1.0, 1.0, 1.0]));
        assert_eq!(buffer, vec![0.0, 0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_place_drops_out_of_range() {
        let mut buffer = vec![0.0_f32; 5];
        assert!(!place(&mut buffer, 10, 0.5, &[1.0]));
        assert!(!place(&mut buffer, 10, -0.1, &[1.0]));
        assert!(buffer.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_overlapping_events_sum() {
        let mut buffer = vec![0.0_f32; 4];
        place(&mut buffer, 4, 0.0, &[1.0, 1.0]);
        place(&mut buffer, 4, 0.25, &[1.0, 1.0]);
        assert_eq!(buffer, vec![1.0, 2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_evenly_spaced() {
        let offsets = evenly_spaced(0.8, 1.4, 7);
        assert_eq!(offsets.len(), 7);
        assert!((offsets[6] - 9.2).abs() < 1e-5);
    }

    #[test]
    fn test_mix_into_scales() {
        let mut buffer = vec![1.0_f32, 1.0];
        mix_into(&mut buffer, &[2.0, 4.0], 0.5);
        assert_eq!(buffer, vec![2.0, 3.0]);
    }
}
