//! Render pipeline
//!
//! Wires the stages together for one render: every generator runs against
//! the same `RenderSpec`, then the mixer combines the four layers.

use log::info;

use crate::config::SoundtrackConfig;
use crate::engine::AudioBuffer;
use crate::error::Result;
use crate::layers::{
    AtmosphereGenerator, BassGenerator, EffectsGenerator, Layer, LayerGenerator, LayerKind,
    MelodyGenerator,
};
use crate::mixer::Mixer;

/// The configured generator for `kind`
pub fn generator(config: &SoundtrackConfig, kind: LayerKind) -> Box<dyn LayerGenerator> {
    match kind {
        LayerKind::Bass => Box::new(BassGenerator::new(config.bass.clone())),
        LayerKind::Melody => Box::new(MelodyGenerator::new(config.melody.clone())),
        LayerKind::Atmosphere => Box::new(AtmosphereGenerator::new(config.atmosphere.clone())),
        LayerKind::Effects => Box::new(EffectsGenerator::new(config.effects.clone())),
    }
}

/// Generate one layer
pub fn render_layer(config: &SoundtrackConfig, kind: LayerKind) -> Result<Layer> {
    generator(config, kind).generate(&config.render)
}

/// Generate all four layers in canonical order
pub fn render_layers(config: &SoundtrackConfig) -> Result<Vec<Layer>> {
    config.render.validate()?;
    LayerKind::ALL
        .into_iter()
        .map(|kind| render_layer(config, kind))
        .collect()
}

/// Generate the layers and mix them into the final soundtrack
pub fn render_soundtrack(config: &SoundtrackConfig) -> Result<(Vec<Layer>, AudioBuffer)> {
    let mixer = Mixer::new(config.mixer.clone())?;
    let layers = render_layers(config)?;
    let mixed = mixer.mix(&layers)?;
    info!(
        "Rendered {:.1}s soundtrack at {} Hz (seed {}): peak {:.3}, rms {:.3}",
        mixed.duration_secs(),
        mixed.sample_rate(),
        config.render.seed,
        mixed.peak(),
        mixed.rms()
    );
    Ok((layers, mixed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSpec;

    fn short_config(seed: u64) -> SoundtrackConfig {
        SoundtrackConfig {
            render: RenderSpec::new(3.0, 8000).with_seed(seed),
            ..SoundtrackConfig::default()
        }
    }

    #[test]
    fn test_all_layers_share_length() {
        let layers = render_layers(&short_config(1)).unwrap();
        let kinds: Vec<LayerKind> = layers.iter().map(|l| l.kind).collect();
        assert_eq!(kinds, LayerKind::ALL.to_vec());
        assert!(layers.iter().all(|l| l.buffer.len() == 24000));
    }

    #[test]
    fn test_soundtrack_is_bounded_and_deterministic() {
        let (_, first) = render_soundtrack(&short_config(5)).unwrap();
        let (_, second) = render_soundtrack(&short_config(5)).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 24000);
        assert!(first.samples().iter().all(|s| (-1.0..=1.0).contains(s)));

        let (_, other) = render_soundtrack(&short_config(6)).unwrap();
        assert_ne!(first, other);
    }

    #[test]
    fn test_invalid_render_rejected_before_generating() {
        let config = SoundtrackConfig {
            render: RenderSpec::new(-1.0, 8000),
            ..SoundtrackConfig::default()
        };
        assert!(render_layers(&config).is_err());
    }
}
