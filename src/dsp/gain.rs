//! Output stage and fades
//!
//! The last processing steps before a mix is written: an optional looping
//! fade and a final stage that guarantees every sample lies in [-1.0, 1.0].

use serde::{Deserialize, Serialize};

use crate::engine::AudioBuffer;
use crate::error::{DirgeError, Result};

/// How the mixer bounds its output range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum OutputStage {
    /// Hard clip into [-1.0, 1.0]
    #[default]
    Clip,
    /// Scale so the peak equals `peak`, then clip
    Normalize { peak: f32 },
}

impl OutputStage {
    pub fn validate(&self) -> Result<()> {
        if let OutputStage::Normalize { peak } = self {
            if !(*peak > 0.0 && *peak <= 1.0) {
                return Err(DirgeError::InvalidParameter {
                    param: "output_stage.peak".to_string(),
                    value: peak.to_string(),
                    expected: "0.0 < peak <= 1.0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Apply the stage in place
    pub fn apply(&self, buffer: &mut AudioBuffer) {
        if let OutputStage::Normalize { peak } = self {
            buffer.normalize_peak(*peak);
        }
        buffer.clamp();
    }
}

/// Apply quadratic fade-in and fade-out of `fade_secs` each
///
/// The fade length is capped at half the buffer so the two ramps never
/// overlap. A zero length is a no-op.
pub fn apply_fades(buffer: &mut AudioBuffer, fade_secs: f32) {
    let requested = (fade_secs.max(0.0) as f64 * buffer.sample_rate() as f64) as usize;
    let fade_len = requested.min(buffer.len() / 2);
    if fade_len < 2 {
        return;
    }

    let len = buffer.len();
    let samples = buffer.samples_mut();
    let denom = (fade_len - 1) as f32;
    for i in 0..fade_len {
        let ramp = (i as f32 / denom).powi(2);
        samples[i] *= ramp;
        samples[len - 1 - i] *= ramp;
    }
}
