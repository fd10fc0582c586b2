// ─────────────────────────────────────────────────────────────────────
// Hexabank — Analytic Noise Curves
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One-sided power spectral densities, in 1/Hz.

use hexabank_types::NoiseModel;

/// Initial LIGO design fit, `x = f / 150 Hz`.
pub fn initial_ligo(f: f64) -> f64 {
    let x = f / 150.0;
    9.0e-46 * ((4.49 * x).powf(-56.0) + 0.16 * x.powf(-4.52) + 0.52 + 0.32 * x * x)
}

/// Advanced LIGO zero-detuned fit, `x = f / 215 Hz`.
pub fn advanced_ligo(f: f64) -> f64 {
    let x = f / 215.0;
    let x2 = x * x;
    1.0e-49 * (x.powf(-4.14) - 5.0 * x.powi(-2) + 111.0 * (1.0 - x2 + 0.5 * x2 * x2) / (1.0 + 0.5 * x2))
}

pub fn power_spectral_density(model: NoiseModel, f: f64) -> f64 {
    match model {
        NoiseModel::InitialLigo => initial_ligo(f),
        NoiseModel::AdvancedLigo => advanced_ligo(f),
        NoiseModel::White => 1.0,
    }
}
