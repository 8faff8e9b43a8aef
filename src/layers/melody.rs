//! Melody layer: church bells, an eerie music box and theremin swells

use serde::{Deserialize, Serialize};

use super::{LayerGenerator, LayerKind};
use crate::config::RenderSpec;
use crate::engine::AudioBuffer;
use crate::synth::{
    bell_partials, burst_len, partials, place, tone, Envelope, Partial, Pitch,
};

/// Inharmonic bell tolls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bells {
    pub times: Vec<f32>,
    pub frequency: f32,
    /// Partial ratios; amplitudes fall off as 1/(i+1)
    pub ratios: Vec<f32>,
    pub length_secs: f32,
    pub decay: f32,
    pub gain: f32,
}

impl Default for Bells {
    fn default() -> Self {
        Self {
            times: vec![0.5, 3.0, 5.5, 8.0, 10.5],
            frequency: 220.0,
            ratios: vec![1.0, 2.0, 3.0, 4.2, 5.8],
            length_secs: 3.0,
            decay: 1.2,
            gain: 0.25,
        }
    }
}

/// A single pitched note at a time offset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub time: f32,
    pub frequency: f32,
}

/// Descending dissonant music-box line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MusicBox {
    pub notes: Vec<Note>,
    pub partials: Vec<Partial>,
    pub length_secs: f32,
    pub decay: f32,
    pub gain: f32,
}

impl Default for MusicBox {
    fn default() -> Self {
        let note = |time, frequency| Note { time, frequency };
        Self {
            notes: vec![
                note(1.5, 523.25),  // C5
                note(2.5, 493.88),  // B4
                note(4.0, 440.00),  // A4
                note(5.0, 415.30),  // G#4
                note(6.5, 392.00),  // G4
                note(8.5, 329.63),  // E4
                note(10.0, 293.66), // D4
            ],
            partials: vec![
                Partial::new(1.0, 0.5),
                Partial::new(2.0, 0.3),
                Partial::new(3.0, 0.2),
            ],
            length_secs: 0.8,
            decay: 3.0,
            gain: 0.15,
        }
    }
}

/// A start/end window in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: f32,
    pub end: f32,
}

impl Span {
    pub fn length(&self) -> f32 {
        (self.end - self.start).max(0.0)
    }
}

/// Gliding swells that rise and fall in pitch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theremin {
    pub spans: Vec<Span>,
    pub pitch: Pitch,
    pub amplitude: f32,
}

impl Default for Theremin {
    fn default() -> Self {
        Self {
            spans: vec![
                Span {
                    start: 4.0,
                    end: 5.5,
                },
                Span {
                    start: 9.0,
                    end: 10.5,
                },
            ],
            pitch: Pitch::Arch {
                base: 300.0,
                rise: 200.0,
            },
            amplitude: 0.18,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MelodyParams {
    pub bells: Bells,
    pub music_box: MusicBox,
    pub theremin: Theremin,
    pub peak: f32,
}

impl Default for MelodyParams {
    fn default() -> Self {
        Self {
            bells: Bells::default(),
            music_box: MusicBox::default(),
            theremin: Theremin::default(),
            peak: 0.8,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MelodyGenerator {
    params: MelodyParams,
}

impl MelodyGenerator {
    pub fn new(params: MelodyParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &MelodyParams {
        &self.params
    }
}

impl LayerGenerator for MelodyGenerator {
    fn kind(&self) -> LayerKind {
        LayerKind::Melody
    }

    fn peak(&self) -> f32 {
        self.params.peak
    }

    fn render(&self, spec: &RenderSpec) -> AudioBuffer {
        let sr = spec.sample_rate;
        let mut out = vec![0.0_f32; spec.num_samples()];

        // Every toll is identical, so render once
        let bells = &self.params.bells;
        let mut toll = partials(
            burst_len(bells.length_secs, sr),
            sr,
            bells.frequency,
            &bell_partials(&bells.ratios),
        );
        Envelope::ExpDecay { rate: bells.decay }.apply(&mut toll, sr);
        toll.iter_mut().for_each(|s| *s *= bells.gain);
        for &time in &bells.times {
            place(&mut out, sr, time, &toll);
        }

        let music_box = &self.params.music_box;
        let note_len = burst_len(music_box.length_secs, sr);
        for note in &music_box.notes {
            let mut burst = partials(note_len, sr, note.frequency, &music_box.partials);
            Envelope::ExpDecay {
                rate: music_box.decay,
            }
            .apply(&mut burst, sr);
            burst.iter_mut().for_each(|s| *s *= music_box.gain);
            place(&mut out, sr, note.time, &burst);
        }

        let theremin = &self.params.theremin;
        for span in &theremin.spans {
            let mut swell = tone(
                burst_len(span.length(), sr),
                sr,
                theremin.amplitude,
                theremin.pitch,
            );
            Envelope::HalfSine { power: 1.0 }.apply(&mut swell, sr);
            place(&mut out, sr, span.start, &swell);
        }

        AudioBuffer::new(out, sr)
    }
}
