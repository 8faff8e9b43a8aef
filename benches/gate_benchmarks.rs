//! Gate and Mixer Benchmarks
//!
//! Performance benchmarks for mixing and grading a full-length soundtrack.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dirge::config::SoundtrackConfig;
use dirge::gate::QualityGate;
use dirge::mixer::Mixer;
use dirge::pipeline::{render_layers, render_soundtrack};

fn benchmark_mix(c: &mut Criterion) {
    let config = SoundtrackConfig::default();
    let layers = render_layers(&config).unwrap();
    let mixer = Mixer::new(config.mixer.clone()).unwrap();

    c.bench_function("mix_4_layers_12s", |b| {
        b.iter(|| mixer.mix(black_box(&layers)).unwrap())
    });
}

fn benchmark_gate(c: &mut Criterion) {
    let (_, mixed) = render_soundtrack(&SoundtrackConfig::default()).unwrap();
    let gate = QualityGate::default();

    c.bench_function("gate_12s", |b| {
        b.iter(|| gate.evaluate(black_box(&mixed)).unwrap())
    });
}

criterion_group!(benches, benchmark_mix, benchmark_gate);
criterion_main!(benches);
