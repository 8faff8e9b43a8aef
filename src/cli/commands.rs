//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::SoundtrackConfig;
use crate::engine::{file_checksum, load_wav, save_wav};
use crate::error::Result;
use crate::gate::QualityGate;
use crate::layers::LayerKind;
use crate::pipeline::{render_layer, render_soundtrack};

/// Load a config file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<SoundtrackConfig> {
    match path {
        Some(path) => {
            info!("Using config: {}", path.display());
            SoundtrackConfig::load(path)
        }
        None => Ok(SoundtrackConfig::default()),
    }
}

/// Default file name of a single layer.
pub fn layer_file_name(kind: LayerKind) -> PathBuf {
    PathBuf::from(format!("{}_layer.wav", kind))
}

/// Render all layers, mix and write the soundtrack.
pub fn render(
    output: &Path,
    layers_dir: Option<&Path>,
    config_path: Option<&Path>,
    seed: Option<u64>,
    duration: Option<f64>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(seed) = seed {
        config.render.seed = seed;
    }
    if let Some(duration) = duration {
        config.render.duration_secs = duration;
    }
    config.validate()?;

    info!(
        "Rendering {}s at {} Hz with seed {}",
        config.render.duration_secs, config.render.sample_rate, config.render.seed
    );
    let (layers, mixed) = render_soundtrack(&config)?;

    if let Some(dir) = layers_dir {
        fs::create_dir_all(dir)?;
        for layer in &layers {
            let path = dir.join(layer_file_name(layer.kind));
            save_wav(&layer.buffer, &path, config.output.bit_depth)?;
            info!("Wrote {} layer: {}", layer.kind, path.display());
        }
    }

    save_wav(&mixed, output, config.output.bit_depth)?;
    let checksum = file_checksum(output)?;
    info!("sha256 {}  {}", checksum, output.display());

    println!("Soundtrack written: {}", output.display());
    println!("Duration: {:.2}s", mixed.duration_secs());
    println!("Peak: {:.3}  RMS: {:.3}", mixed.peak(), mixed.rms());
    Ok(())
}

/// Render and write a single layer.
pub fn layer(kind: LayerKind, output: Option<&Path>, config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| layer_file_name(kind));

    info!("Generating {} layer", kind);
    let layer = render_layer(&config, kind)?;
    save_wav(&layer.buffer, &output, config.output.bit_depth)?;

    println!("{} layer written: {}", kind, output.display());
    println!("Duration: {:.2}s", layer.buffer.duration_secs());
    Ok(())
}

/// Run the quality gate; returns whether the file passed.
pub fn check(file: &Path, json: Option<&Path>, config_path: Option<&Path>) -> Result<bool> {
    let config = load_config(config_path)?;
    let gate = QualityGate::new(config.gate)?;

    info!("Analyzing: {}", file.display());
    let buffer = load_wav(file)?;
    let report = gate.evaluate(&buffer)?;

    print!("{}", report.render());

    if let Some(path) = json {
        fs::write(path, report.to_json()?)?;
        info!("Report saved: {}", path.display());
    }

    if !report.passed() {
        warn!("Quality gate failed: {}", report.score_label());
    }
    Ok(report.passed())
}

/// Print the default configuration, or write it to a file.
pub fn print_config(output: Option<&Path>) -> Result<()> {
    let config = SoundtrackConfig::default();
    match output {
        Some(path) => {
            config.save(path)?;
            println!("Config written: {}", path.display());
        }
        None => println!("{}", config.to_json()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenderSpec;
    use tempfile::tempdir;

    fn short_config(dir: &Path) -> PathBuf {
        let config = SoundtrackConfig {
            render: RenderSpec::new(2.0, 8000),
            ..SoundtrackConfig::default()
        };
        let path = dir.join("short.json");
        config.save(&path).unwrap();
        path
    }

    #[test]
    fn test_render_writes_mix_and_layers() {
        let dir = tempdir().unwrap();
        let config = short_config(dir.path());
        let output = dir.path().join("mix.wav");
        let layers = dir.path().join("layers");

        render(&output, Some(&layers), Some(&config), Some(3), None).unwrap();

        let mixed = load_wav(&output).unwrap();
        assert_eq!(mixed.len(), 16000);
        for kind in LayerKind::ALL {
            assert!(layers.join(layer_file_name(kind)).exists());
        }
    }

    #[test]
    fn test_duration_override_validated() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("mix.wav");
        assert!(render(&output, None, None, None, Some(-2.0)).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn test_check_writes_json_report() {
        let dir = tempdir().unwrap();
        let config = short_config(dir.path());
        let wav = dir.path().join("bass.wav");
        layer(LayerKind::Bass, Some(&wav), Some(&config)).unwrap();

        let json = dir.path().join("report.json");
        let passed = check(&wav, Some(&json), None).unwrap();
        assert!(!passed);
        let text = fs::read_to_string(&json).unwrap();
        assert!(text.contains("\"overall\": \"FAIL\""));
    }

    #[test]
    fn test_check_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(check(&dir.path().join("nope.wav"), None, None).is_err());
    }

    #[test]
    fn test_config_written_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("default.json");
        print_config(Some(&path)).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), SoundtrackConfig::default());
    }
}
