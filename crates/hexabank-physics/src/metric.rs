// ─────────────────────────────────────────────────────────────────────
// Hexabank — Metric Oracle
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Metric oracle trait and implementations.
//!
//! Bank placement only needs the local quadratic mismatch form at a
//! point. `PnMetric` provides a self-contained reference: the Fisher
//! metric of the 2PN stationary-phase inspiral phase with coalescence
//! time and phase projected out. Production callers can plug in their
//! own oracle through `ExternalMetric`.

use std::f64::consts::PI;

use hexabank_types::{BankConfig, BankError, BankResult, LocalMetric};

use crate::chirp::{ChirpScale, MT_SUN};
use crate::moments::NoiseMoments;

/// Trait for metric oracles.
///
/// Returns the metric in its eigenframe at `(t0, t3)`.
pub trait MetricOracle: Send + Sync {
    fn evaluate(&self, t0: f64, t3: f64) -> BankResult<LocalMetric>;
}

// ---- Reference 2PN metric ----

/// Relative step of the central differences in t0 and t3.
const FD_STEP: f64 = 1e-6;

/// A phase term: coefficient of `x^{power/3}`, `x = f / fL`.
type PhaseTerm = (i32, f64);

/// Fisher metric of the restricted 2PN inspiral in chirp-time coordinates.
pub struct PnMetric {
    scale: ChirpScale,
    moments: NoiseMoments,
}

impl PnMetric {
    pub fn new(scale: ChirpScale, moments: NoiseMoments) -> Self {
        Self { scale, moments }
    }

    pub fn from_config(config: &BankConfig) -> BankResult<Self> {
        let moments = NoiseMoments::compute(config.noise, config.f_lower, config.f_upper)?;
        Ok(Self::new(ChirpScale::new(config.f_lower), moments))
    }

    /// Phase coefficients of `x^{-5/3}, x^{-1}, x^{-2/3}, x^{-1/3}`.
    fn phase_terms(&self, t0: f64, t3: f64) -> [PhaseTerm; 4] {
        let (total, eta) = self.scale.total_mass_eta(t0, t3);
        let v = PI * total * MT_SUN * self.scale.f_lower;
        let pre = 3.0 / (128.0 * eta);
        let p2 = 3715.0 / 756.0 + 55.0 * eta / 9.0;
        let p3 = -16.0 * PI;
        let p4 = 15_293_365.0 / 508_032.0 + 27_145.0 * eta / 504.0 + 3085.0 * eta * eta / 72.0;
        [
            (-5, pre * v.powf(-5.0 / 3.0)),
            (-3, pre * p2 / v),
            (-2, pre * p3 * v.powf(-2.0 / 3.0)),
            (-1, pre * p4 * v.powf(-1.0 / 3.0)),
        ]
    }

    fn phase_derivative(&self, t0: f64, t3: f64, along_t0: bool) -> [PhaseTerm; 4] {
        let (h, plus, minus) = if along_t0 {
            let h = t0 * FD_STEP;
            (h, self.phase_terms(t0 + h, t3), self.phase_terms(t0 - h, t3))
        } else {
            let h = t3 * FD_STEP;
            (h, self.phase_terms(t0, t3 + h), self.phase_terms(t0, t3 - h))
        };
        let mut out = plus;
        for (term, (_, lo)) in out.iter_mut().zip(minus.iter()) {
            term.1 = (term.1 - lo) / (2.0 * h);
        }
        out
    }

    /// Noise-weighted covariance of two phase derivatives.
    fn gamma(&self, a: &[PhaseTerm], b: &[PhaseTerm]) -> f64 {
        let mut cross = 0.0;
        for &(p, ca) in a {
            for &(q, cb) in b {
                cross += ca * cb * self.moments.get(p + q);
            }
        }
        let mean = |terms: &[PhaseTerm]| -> f64 {
            terms.iter().map(|&(p, c)| c * self.moments.get(p)).sum()
        };
        0.5 * (cross - mean(a) * mean(b))
    }
}

impl MetricOracle for PnMetric {
    fn evaluate(&self, t0: f64, t3: f64) -> BankResult<LocalMetric> {
        if !(t0 > 0.0 && t3 > 0.0) {
            return Err(BankError::Numerical(format!(
                "metric requested at non-positive chirp times ({t0}, {t3})"
            )));
        }
        let d_tc = [(3, 2.0 * PI * self.scale.f_lower)];
        let d_t0 = self.phase_derivative(t0, t3, true);
        let d_t3 = self.phase_derivative(t0, t3, false);

        let g_cc = self.gamma(&d_tc, &d_tc);
        let g_c0 = self.gamma(&d_tc, &d_t0);
        let g_c3 = self.gamma(&d_tc, &d_t3);
        let g_00 = self.gamma(&d_t0, &d_t0) - g_c0 * g_c0 / g_cc;
        let g_03 = self.gamma(&d_t0, &d_t3) - g_c0 * g_c3 / g_cc;
        let g_33 = self.gamma(&d_t3, &d_t3) - g_c3 * g_c3 / g_cc;
        LocalMetric::from_matrix(g_00, g_03, g_33)
    }
}

// ---- Fixed and caller-supplied oracles ----

/// Same metric everywhere. Useful for flat-space placement and tests.
pub struct UniformMetric {
    metric: LocalMetric,
}

impl UniformMetric {
    pub fn new(metric: LocalMetric) -> BankResult<Self> {
        metric.check()?;
        Ok(Self { metric })
    }
}

impl MetricOracle for UniformMetric {
    fn evaluate(&self, _t0: f64, _t3: f64) -> BankResult<LocalMetric> {
        Ok(self.metric)
    }
}

type MetricFn = Box<dyn Fn(f64, f64) -> BankResult<LocalMetric> + Send + Sync>;

/// Oracle that delegates to a caller-supplied function.
///
/// Used by the PyO3 layer to evaluate the metric in Python.
pub struct ExternalMetric {
    metric_fn: MetricFn,
}

impl ExternalMetric {
    pub fn new(
        metric_fn: impl Fn(f64, f64) -> BankResult<LocalMetric> + Send + Sync + 'static,
    ) -> Self {
        Self {
            metric_fn: Box::new(metric_fn),
        }
    }
}

impl MetricOracle for ExternalMetric {
    fn evaluate(&self, t0: f64, t3: f64) -> BankResult<LocalMetric> {
        let metric = (self.metric_fn)(t0, t3)?;
        metric.check()?;
        Ok(metric)
    }
}
