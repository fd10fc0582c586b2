// ─────────────────────────────────────────────────────────────────────
// Hexabank — Cell and Template Value Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use crate::error::{BankError, BankResult};

/// Where a point or cell sits relative to the target region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    In,
    Out,
    /// Physical (`eta <= 1/4`) but outside the mass constraints.
    Above,
    /// Non-physical side of the equal-mass line (`eta > 1/4`).
    Below,
}

/// Lifecycle of a cell during propagation.
///
/// Allowed transitions: Fertile→Sterile, Fertile→Edge, Edge→Sterile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellStatus {
    Fertile,
    Sterile,
    Edge,
}

/// Local quadratic mismatch form at one point of the (t0, t3) plane,
/// stored in its eigenframe.
///
/// `theta` is the orientation of the major axis (smallest eigenvalue
/// `g00`) measured from the t0 axis, in (-π/2, π/2].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalMetric {
    pub theta: f64,
    pub g00: f64,
    pub g11: f64,
}

impl LocalMetric {
    pub fn new(theta: f64, g00: f64, g11: f64) -> Self {
        Self { theta, g00, g11 }
    }

    /// Diagonalise the symmetric matrix `[[g_00, g_03], [g_03, g_33]]`.
    pub fn from_matrix(g_00: f64, g_03: f64, g_33: f64) -> BankResult<Self> {
        if !(g_00.is_finite() && g_03.is_finite() && g_33.is_finite()) {
            return Err(BankError::Numerical(format!(
                "non-finite metric components ({g_00}, {g_03}, {g_33})"
            )));
        }
        let mean = 0.5 * (g_00 + g_33);
        let radius = (0.25 * (g_00 - g_33).powi(2) + g_03 * g_03).sqrt();
        let mut theta = 0.5 * (2.0 * g_03).atan2(g_00 - g_33) + FRAC_PI_2;
        while theta > FRAC_PI_2 {
            theta -= PI;
        }
        while theta <= -FRAC_PI_2 {
            theta += PI;
        }
        let metric = Self::new(theta, mean - radius, mean + radius);
        metric.check()?;
        Ok(metric)
    }

    /// Reject indefinite or degenerate forms.
    pub fn check(&self) -> BankResult<()> {
        if !(self.theta.is_finite() && self.g00 > 0.0 && self.g11 > 0.0 && self.g11.is_finite()) {
            return Err(BankError::Numerical(format!(
                "metric not positive definite: theta={}, g00={}, g11={}",
                self.theta, self.g00, self.g11
            )));
        }
        Ok(())
    }

    /// Semi-axes `(major, minor)` of the ellipse of constant match `mm`.
    pub fn semi_axes(&self, minimal_match: f64) -> BankResult<(f64, f64)> {
        self.check()?;
        let ds2 = 1.0 - minimal_match;
        Ok(((ds2 / self.g00).sqrt(), (ds2 / self.g11).sqrt()))
    }

    /// Rotate an eigenframe offset into a (t0, t3) offset.
    pub fn to_global(&self, u: f64, v: f64) -> (f64, f64) {
        let (s, c) = self.theta.sin_cos();
        (u * c - v * s, u * s + v * c)
    }

    /// Rotate a (t0, t3) offset into the eigenframe.
    pub fn to_local(&self, d0: f64, d3: f64) -> (f64, f64) {
        let (s, c) = self.theta.sin_cos();
        (d0 * c + d3 * s, -d0 * s + d3 * c)
    }

    /// Mismatch `1 - match` to a point at offset `(d0, d3)`.
    pub fn mismatch(&self, d0: f64, d3: f64) -> f64 {
        let (u, v) = self.to_local(d0, d3);
        self.g00 * u * u + self.g11 * v * v
    }
}

/// Physical parameters of one template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemplateParams {
    pub mass1: f64,
    pub mass2: f64,
    pub total_mass: f64,
    pub eta: f64,
    pub chirp_mass: f64,
    pub t0: f64,
    pub t3: f64,
    pub f_lower: f64,
}

/// One accepted template with its local metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: usize,
    pub params: TemplateParams,
    pub metric: LocalMetric,
    /// Major semi-axis of the coverage ellipse.
    pub dx0: f64,
    /// Minor semi-axis of the coverage ellipse.
    pub dx1: f64,
}
