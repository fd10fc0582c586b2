// ─────────────────────────────────────────────────────────────────────
// Hexabank — Bank Generation Benchmarks
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Criterion benchmarks for the metric, the boundary curve and full
//! bank generation.

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use hexabank_core::{generate_bank, GridParams, LatticeEngine};
use hexabank_physics::{boundary_t3, ChirpScale, MetricOracle, PnMetric};
use hexabank_types::{BankConfig, LatticeShape};

// ── PnMetric.evaluate() ─────────────────────────────────────────────

fn bench_pn_metric(c: &mut Criterion) {
    let config = BankConfig::default();
    let metric = PnMetric::from_config(&config).unwrap();
    let (t0, t3) = ChirpScale::new(config.f_lower).chirp_times(2.0, 1.4);
    c.bench_function("pn_metric_evaluate", |b| {
        b.iter(|| metric.evaluate(black_box(t0), black_box(t3)))
    });
}

fn bench_noise_moments(c: &mut Criterion) {
    let config = BankConfig::default();
    c.bench_function("pn_metric_from_config", |b| {
        b.iter(|| PnMetric::from_config(black_box(&config)))
    });
}

// ── boundary_t3() ───────────────────────────────────────────────────

fn bench_boundary(c: &mut Criterion) {
    c.bench_function("boundary_t3", |b| {
        b.iter(|| boundary_t3(black_box(20.0), 40.0, 1.0, 3.0))
    });
}

// ── LatticeEngine.propagate() ───────────────────────────────────────

fn bench_propagate(c: &mut Criterion) {
    let config = BankConfig::default();
    let oracle = Arc::new(PnMetric::from_config(&config).unwrap());
    let mut group = c.benchmark_group("propagate");
    group.sample_size(10);
    group.bench_function("hexagonal_mm097", |b| {
        b.iter(|| {
            let grid = GridParams::from_config(&config).unwrap();
            let mut engine = LatticeEngine::new(grid, oracle.clone()).unwrap();
            engine.propagate().unwrap();
            engine.registry().len()
        })
    });
    group.finish();
}

// ── generate_bank() ─────────────────────────────────────────────────

fn bench_generate_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_bank");
    group.sample_size(10);
    for (name, lattice) in [("hexagonal", LatticeShape::Hexagonal), ("square", LatticeShape::Square)] {
        let config = BankConfig {
            lattice,
            ..Default::default()
        };
        group.bench_function(name, |b| b.iter(|| generate_bank(black_box(&config))));
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_pn_metric,
    bench_noise_moments,
    bench_boundary,
    bench_propagate,
    bench_generate_bank,
);
criterion_main!(benches);
