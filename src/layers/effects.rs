//! Effects layer: wind, creaking wood, bats, footsteps, chains, a distant
//! howl and one big crash
//!
//! Most of the layer's transients live here, so its event schedule drives
//! the pacing of the whole mix.

use serde::{Deserialize, Serialize};

use super::{LayerGenerator, LayerKind};
use crate::config::RenderSpec;
use crate::engine::AudioBuffer;
use crate::synth::{
    burst_len, evenly_spaced, mix_into, modulate, partials, place, sines, tone, Envelope, Lfo,
    NoiseSource, Partial, Pitch, Sine,
};

/// One steady wind component with its own gusting LFO
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindBand {
    pub sine: Sine,
    pub lfo: Lfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wind {
    pub bands: Vec<WindBand>,
    /// Amplitude of the low-passed noise bed
    pub noise: f32,
    pub noise_cutoff_hz: f32,
}

impl Default for Wind {
    fn default() -> Self {
        Self {
            bands: vec![
                WindBand {
                    sine: Sine::new(120.0, 0.12),
                    lfo: Lfo::new(0.5, 0.5, 0.25),
                },
                WindBand {
                    sine: Sine::new(450.0, 0.10),
                    lfo: Lfo::new(0.5, 0.5, 0.35),
                },
                WindBand {
                    sine: Sine::new(2000.0, 0.08),
                    lfo: Lfo::new(0.5, 0.5, 0.45),
                },
            ],
            noise: 0.06,
            noise_cutoff_hz: 3300.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Creaks {
    pub times: Vec<f32>,
    pub length_secs: f32,
    pub pitch: Pitch,
    pub amplitude: f32,
    pub noise: f32,
    pub gain: f32,
}

impl Default for Creaks {
    fn default() -> Self {
        Self {
            times: vec![1.8, 4.2, 5.5, 6.8, 8.0, 9.5, 10.8],
            length_secs: 0.9,
            pitch: Pitch::Wobble {
                center: 180.0,
                depth_hz: 100.0,
                rate_hz: 2.5,
            },
            amplitude: 0.18,
            noise: 0.12,
            gain: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bats {
    pub times: Vec<f32>,
    pub length_secs: f32,
    pub pitch: Pitch,
    pub amplitude: f32,
    pub flutter: Lfo,
}

impl Default for Bats {
    fn default() -> Self {
        Self {
            times: vec![2.0, 3.5, 5.2, 6.5, 7.8, 8.5, 10.2, 11.0],
            length_secs: 0.25,
            pitch: Pitch::Glide {
                start: 4000.0,
                end: 500.0,
                curve: 1.5,
            },
            amplitude: 0.15,
            flutter: Lfo::new(1.0, 0.3, 30.0),
        }
    }
}

/// Evenly paced thuds growing louder as they approach
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Footsteps {
    pub first: f32,
    pub interval: f32,
    pub count: usize,
    pub length_secs: f32,
    pub frequency: f32,
    pub amplitude: f32,
    pub decay: f32,
    /// Volume of the first step
    pub volume: f32,
    /// Volume added over the whole sequence
    pub swell: f32,
}

impl Default for Footsteps {
    fn default() -> Self {
        Self {
            first: 0.8,
            interval: 1.4,
            count: 7,
            length_secs: 0.08,
            frequency: 70.0,
            amplitude: 0.25,
            decay: 35.0,
            volume: 0.6,
            swell: 0.4,
        }
    }
}

/// Bursts of short metallic impacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Chains {
    pub times: Vec<f32>,
    pub length_secs: f32,
    pub impacts: usize,
    pub impact_secs: f32,
    pub voices: Vec<Sine>,
    pub decay: f32,
}

impl Default for Chains {
    fn default() -> Self {
        Self {
            times: vec![4.8, 7.2, 10.2],
            length_secs: 0.7,
            impacts: 12,
            impact_secs: 0.03,
            voices: vec![Sine::new(2200.0, 0.18), Sine::new(3100.0, 0.12)],
            decay: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Howl {
    pub time: f32,
    pub length_secs: f32,
    pub pitch: Pitch,
    pub amplitude: f32,
    pub decay: f32,
}

impl Default for Howl {
    fn default() -> Self {
        Self {
            time: 8.5,
            length_secs: 1.2,
            pitch: Pitch::Arch {
                base: 400.0,
                rise: 200.0,
            },
            amplitude: 0.14,
            decay: 0.5,
        }
    }
}

/// Noise burst with metallic ringing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Crash {
    pub time: f32,
    pub length_secs: f32,
    pub noise: f32,
    pub ring_hz: Vec<f32>,
    pub ring_amplitude: f32,
    pub ring_decay: f32,
    pub decay: f32,
    pub gain: f32,
}

impl Default for Crash {
    fn default() -> Self {
        Self {
            time: 6.0,
            length_secs: 0.5,
            noise: 0.6,
            ring_hz: vec![1200.0, 2400.0, 3600.0, 4800.0],
            ring_amplitude: 0.3,
            ring_decay: 8.0,
            decay: 6.0,
            gain: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectsParams {
    pub wind: Wind,
    pub creaks: Creaks,
    pub bats: Bats,
    pub footsteps: Footsteps,
    pub chains: Chains,
    pub howl: Howl,
    pub crash: Crash,
    pub peak: f32,
}

impl Default for EffectsParams {
    fn default() -> Self {
        Self {
            wind: Wind::default(),
            creaks: Creaks::default(),
            bats: Bats::default(),
            footsteps: Footsteps::default(),
            chains: Chains::default(),
            howl: Howl::default(),
            crash: Crash::default(),
            peak: 0.85,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EffectsGenerator {
    params: EffectsParams,
}

impl EffectsGenerator {
    pub fn new(params: EffectsParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &EffectsParams {
        &self.params
    }

    fn add_wind(&self, out: &mut [f32], sr: u32, noise: &mut NoiseSource) {
        let wind = &self.params.wind;
        let n = out.len();
        for band in &wind.bands {
            let mut gust = sines(n, sr, &[band.sine]);
            modulate(&mut gust, sr, band.lfo, 0.0);
            mix_into(out, &gust, 1.0);
        }
        mix_into(out, &noise.low_passed(n, sr, wind.noise_cutoff_hz), wind.noise);
    }

    fn add_creaks(&self, out: &mut [f32], sr: u32, noise: &mut NoiseSource) {
        let creaks = &self.params.creaks;
        let len = burst_len(creaks.length_secs, sr);
        let envelope = Envelope::HalfSine { power: 1.0 };
        for &time in &creaks.times {
            let mut creak = tone(len, sr, creaks.amplitude, creaks.pitch);
            mix_into(&mut creak, &noise.white(len), creaks.noise);
            envelope.apply(&mut creak, sr);
            creak.iter_mut().for_each(|s| *s *= creaks.gain);
            place(out, sr, time, &creak);
        }
    }

    fn add_bats(&self, out: &mut [f32], sr: u32) {
        let bats = &self.params.bats;
        let mut swoosh = tone(burst_len(bats.length_secs, sr), sr, bats.amplitude, bats.pitch);
        Envelope::HalfSine { power: 0.5 }.apply(&mut swoosh, sr);
        modulate(&mut swoosh, sr, bats.flutter, 0.0);
        for &time in &bats.times {
            place(out, sr, time, &swoosh);
        }
    }

    fn add_footsteps(&self, out: &mut [f32], sr: u32) {
        let steps = &self.params.footsteps;
        let mut thud = tone(
            burst_len(steps.length_secs, sr),
            sr,
            steps.amplitude,
            Pitch::Fixed(steps.frequency),
        );
        Envelope::ExpDecay { rate: steps.decay }.apply(&mut thud, sr);

        let times = evenly_spaced(steps.first, steps.interval, steps.count);
        for (i, &time) in times.iter().enumerate() {
            let volume = steps.volume + steps.swell * (i as f32 / steps.count as f32);
            let step: Vec<f32> = thud.iter().map(|s| s * volume).collect();
            place(out, sr, time, &step);
        }
    }

    fn add_chains(&self, out: &mut [f32], sr: u32) {
        let chains = &self.params.chains;
        let len = burst_len(chains.length_secs, sr);
        let mut impact = sines(burst_len(chains.impact_secs, sr), sr, &chains.voices);
        Envelope::ExpDecay {
            rate: chains.decay,
        }
        .apply(&mut impact, sr);

        let mut rattle = vec![0.0_f32; len];
        let impacts = chains.impacts.max(1);
        for i in 0..impacts {
            let offset = chains.length_secs * i as f32 / impacts as f32;
            place(&mut rattle, sr, offset, &impact);
        }
        for &time in &chains.times {
            place(out, sr, time, &rattle);
        }
    }

    fn add_howl(&self, out: &mut [f32], sr: u32) {
        let howl = &self.params.howl;
        let mut sound = tone(burst_len(howl.length_secs, sr), sr, howl.amplitude, howl.pitch);
        Envelope::HalfSine { power: 1.0 }.apply(&mut sound, sr);
        Envelope::ExpDecay { rate: howl.decay }.apply(&mut sound, sr);
        place(out, sr, howl.time, &sound);
    }

    fn add_crash(&self, out: &mut [f32], sr: u32, noise: &mut NoiseSource) {
        let crash = &self.params.crash;
        let len = burst_len(crash.length_secs, sr);

        let mut burst: Vec<f32> = noise.white(len).iter().map(|s| s * crash.noise).collect();
        let ring: Vec<Partial> = crash
            .ring_hz
            .iter()
            .map(|&hz| Partial::new(hz, crash.ring_amplitude))
            .collect();
        let mut ringing = partials(len, sr, 1.0, &ring);
        Envelope::ExpDecay {
            rate: crash.ring_decay,
        }
        .apply(&mut ringing, sr);
        mix_into(&mut burst, &ringing, 1.0);

        Envelope::ExpDecay { rate: crash.decay }.apply(&mut burst, sr);
        burst.iter_mut().for_each(|s| *s *= crash.gain);
        place(out, sr, crash.time, &burst);
    }
}

impl LayerGenerator for EffectsGenerator {
    fn kind(&self) -> LayerKind {
        LayerKind::Effects
    }

    fn peak(&self) -> f32 {
        self.params.peak
    }

    fn render(&self, spec: &RenderSpec) -> AudioBuffer {
        let sr = spec.sample_rate;
        let mut out = vec![0.0_f32; spec.num_samples()];

        self.add_wind(&mut out, sr, &mut NoiseSource::new(spec.seed, "effects/wind"));
        self.add_creaks(&mut out, sr, &mut NoiseSource::new(spec.seed, "effects/creaks"));
        self.add_bats(&mut out, sr);
        self.add_footsteps(&mut out, sr);
        self.add_chains(&mut out, sr);
        self.add_howl(&mut out, sr);
        self.add_crash(&mut out, sr, &mut NoiseSource::new(spec.seed, "effects/crash"));

        AudioBuffer::new(out, sr)
    }
}
