// ─────────────────────────────────────────────────────────────────────
// Hexabank — Chirp Times
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Newtonian (`t0`) and 1.5PN tail (`t3`) chirp times.
//!
//! ```text
//! t0 = A0 / (eta M^{5/3})      A0 = 5 / (256 (π fL)^{8/3})
//! t3 = A3 / (eta M^{2/3})      A3 = π / (8 (π fL)^{5/3})
//! ```
//! with the total mass `M` expressed in seconds.

use std::f64::consts::PI;

use hexabank_types::{BankError, BankResult, TemplateParams};

/// G M_sun / c^3 in seconds.
pub const MT_SUN: f64 = 4.925_490_95e-6;

/// Chirp-time prefactors for one lower frequency cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChirpScale {
    pub f_lower: f64,
    pub a0: f64,
    pub a3: f64,
}

impl ChirpScale {
    pub fn new(f_lower: f64) -> Self {
        let pf = PI * f_lower;
        Self {
            f_lower,
            a0: 5.0 / (256.0 * pf.powf(8.0 / 3.0)),
            a3: PI / (8.0 * pf.powf(5.0 / 3.0)),
        }
    }

    /// `(t0, t3)` of a binary with component masses in solar masses.
    pub fn chirp_times(&self, m1: f64, m2: f64) -> (f64, f64) {
        let total = m1 + m2;
        let eta = m1 * m2 / (total * total);
        let m_sec = total * MT_SUN;
        (
            self.a0 / (eta * m_sec.powf(5.0 / 3.0)),
            self.a3 / (eta * m_sec.powf(2.0 / 3.0)),
        )
    }

    /// Total mass (solar masses) and symmetric mass ratio at `(t0, t3)`.
    ///
    /// `eta` is not clamped: points below the equal-mass line return
    /// `eta > 1/4`.
    pub fn total_mass_eta(&self, t0: f64, t3: f64) -> (f64, f64) {
        let m_sec = self.a0 * t3 / (self.a3 * t0);
        let eta = self.a0 / (t0 * m_sec.powf(5.0 / 3.0));
        (m_sec / MT_SUN, eta)
    }

    /// Component masses `(m1 >= m2)`, or `None` below the equal-mass line.
    pub fn component_masses(&self, t0: f64, t3: f64) -> Option<(f64, f64)> {
        let (total, eta) = self.total_mass_eta(t0, t3);
        if !(eta.is_finite() && eta > 0.0 && eta <= 0.25) {
            return None;
        }
        let spread = (1.0 - 4.0 * eta).max(0.0).sqrt();
        Some((0.5 * total * (1.0 + spread), 0.5 * total * (1.0 - spread)))
    }

    /// Closed-form inversion of `(t0, t3)` into template parameters.
    ///
    /// Points that land a hair below the equal-mass line are projected
    /// onto it.
    pub fn template_params(&self, t0: f64, t3: f64) -> BankResult<TemplateParams> {
        if !(t0 > 0.0 && t3 > 0.0) {
            return Err(BankError::Numerical(format!(
                "chirp times must be positive, got ({t0}, {t3})"
            )));
        }
        let (total, raw_eta) = self.total_mass_eta(t0, t3);
        if !(total.is_finite() && raw_eta.is_finite()) {
            return Err(BankError::Numerical(format!(
                "mass inversion failed at ({t0}, {t3})"
            )));
        }
        let eta = raw_eta.min(0.25);
        let spread = (1.0 - 4.0 * eta).sqrt();
        Ok(TemplateParams {
            mass1: 0.5 * total * (1.0 + spread),
            mass2: 0.5 * total * (1.0 - spread),
            total_mass: total,
            eta,
            chirp_mass: total * eta.powf(0.6),
            t0,
            t3,
            f_lower: self.f_lower,
        })
    }
}
