// ─────────────────────────────────────────────────────────────────────
// Hexabank — Chirp-Time Physics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Geometry of the (t0, t3) chirp-time plane.
//!
//! - `chirp` — forward mass → chirp-time map and its closed-form inverse
//! - `psd` — analytic detector noise curves
//! - `moments` — normalised noise moments feeding the reference metric
//! - `metric` — the `MetricOracle` trait and its implementations
//! - `roots` — bracketing bisection root finder
//! - `boundary` — equal-mass line, mass-extremal branch and search limits

pub mod boundary;
pub mod chirp;
pub mod metric;
pub mod moments;
pub mod psd;
pub mod roots;

pub use boundary::{
    boundary_t3, checked_boundary_t3, equal_mass_t3, extremal_t3, fixed_total_mass_t3,
    solve_for_m, SearchLimits,
};
pub use chirp::{ChirpScale, MT_SUN};
pub use metric::{ExternalMetric, MetricOracle, PnMetric, UniformMetric};
pub use moments::NoiseMoments;
pub use roots::bisect;
