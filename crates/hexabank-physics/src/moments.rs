// ─────────────────────────────────────────────────────────────────────
// Hexabank — Noise Moments
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Normalised moments of the inspiral noise weight
//!
//! ```text
//! J(n) = ∫ x^{n/3} w(x) dx / ∫ w(x) dx,   w(x) = x^{-7/3} / S(x fL)
//! ```
//! over `x ∈ [1, fU/fL]`, for `n ∈ [-10, 6]`.

use hexabank_types::{BankError, BankResult, NoiseModel};

use crate::psd::power_spectral_density;

pub const MIN_ORDER: i32 = -10;
pub const MAX_ORDER: i32 = 6;
const N_ORDERS: usize = (MAX_ORDER - MIN_ORDER + 1) as usize;

/// Simpson intervals on the logarithmic frequency grid (even).
const N_INTERVALS: usize = 4000;

/// Moments computed once per run; read-only afterwards.
#[derive(Debug, Clone)]
pub struct NoiseMoments {
    pub f_lower: f64,
    pub f_upper: f64,
    values: [f64; N_ORDERS],
}

impl NoiseMoments {
    pub fn compute(model: NoiseModel, f_lower: f64, f_upper: f64) -> BankResult<Self> {
        if !(f_lower > 0.0 && f_upper > f_lower) {
            return Err(BankError::Config(format!(
                "moment band must satisfy 0 < f_lower < f_upper, got [{f_lower}, {f_upper}]"
            )));
        }
        let span = (f_upper / f_lower).ln();
        let h = span / N_INTERVALS as f64;
        let s_ref = power_spectral_density(model, f_lower);

        let mut norm = 0.0;
        let mut values = [0.0; N_ORDERS];
        for i in 0..=N_INTERVALS {
            let x = (i as f64 * h).exp();
            let simpson = if i == 0 || i == N_INTERVALS {
                1.0
            } else if i % 2 == 1 {
                4.0
            } else {
                2.0
            };
            // dx = x d(ln x)
            let w = simpson * h / 3.0 * x.powf(-4.0 / 3.0) * s_ref
                / power_spectral_density(model, f_lower * x);
            norm += w;
            for (k, value) in values.iter_mut().enumerate() {
                let order = MIN_ORDER + k as i32;
                *value += w * x.powf(order as f64 / 3.0);
            }
        }
        if !(norm.is_finite() && norm > 0.0) {
            return Err(BankError::Numerical(format!(
                "noise moment normalisation is {norm}"
            )));
        }
        for value in values.iter_mut() {
            *value /= norm;
        }
        Ok(Self {
            f_lower,
            f_upper,
            values,
        })
    }

    /// `J(order)`; orders outside the tabulated range read as zero.
    pub fn get(&self, order: i32) -> f64 {
        if (MIN_ORDER..=MAX_ORDER).contains(&order) {
            self.values[(order - MIN_ORDER) as usize]
        } else {
            0.0
        }
    }
}
