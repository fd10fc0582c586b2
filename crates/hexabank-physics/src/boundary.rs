// ─────────────────────────────────────────────────────────────────────
// Hexabank — Region Boundary Curves
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Lower boundary of the covering region in the (t0, t3) plane.
//!
//! The region is bounded below by two curves that meet at both ends:
//! the equal-mass line `eta = 1/4` and the mass-extremal branch where
//! one component sits at `m_min` (light side) or `m_max` (heavy side).
//! Edge refinement walks the average of the two.

use serde::{Deserialize, Serialize};

use hexabank_types::{BankConfig, BankError, BankResult, MassRange};

use crate::chirp::{ChirpScale, MT_SUN};

/// `t3` on the equal-mass line at `t0`.
pub fn equal_mass_t3(scale: &ChirpScale, t0: f64) -> f64 {
    4.0 * scale.a3 * (t0 / (4.0 * scale.a0)).powf(0.4)
}

/// Total mass (solar masses) of the binary with one component fixed
/// at `q` and Newtonian chirp time `x`.
///
/// `p` is the solar mass in seconds and `a` the `A0` prefactor. This is
/// the real root of `a (M - q)^{-1} q^{-1} M^{1/3} = x p^{5/3}` in
/// closed form. A negative discriminant is clamped to zero.
pub fn solve_for_m(x: f64, p: f64, q: f64, a: f64) -> f64 {
    let a3 = a.powi(3);
    let discriminant = -4.0 * a.powi(9) * p.powi(15) * q.powi(9) * x.powi(9)
        + 27.0 * a.powi(6) * p.powi(20) * q.powi(14) * x.powi(12);
    let root = if discriminant < 0.0 {
        0.0
    } else {
        discriminant.sqrt()
    };
    let inner = 9.0 * a3 * p.powi(10) * q.powi(7) * x.powi(6) + 3f64.sqrt() * root;
    let cbrt = inner.cbrt();
    q + ((2.0f64 / 3.0).cbrt() * a3) / cbrt
        + cbrt / (2f64.cbrt() * 9f64.cbrt() * p.powi(5) * q.powi(3) * x.powi(3))
}

/// `t3` of the mass-extremal branch at `t0`.
///
/// The fixed companion is `m_min` above the crossover `t0(m_min, m_max)`
/// and `m_max` below it.
pub fn extremal_t3(t0: f64, f_lower: f64, m_min: f64, m_max: f64) -> f64 {
    let scale = ChirpScale::new(f_lower);
    let total = m_min + m_max;
    let eta = m_min * m_max / (total * total);
    let crossover = scale.a0 * (total * MT_SUN).powf(-5.0 / 3.0) / eta;
    let q = if t0 >= crossover { m_min } else { m_max };

    let total = solve_for_m(t0, MT_SUN, q, scale.a0);
    let eta = q * (total - q) / (total * total);
    scale.a3 * (total * MT_SUN).powf(-2.0 / 3.0) / eta
}

/// `t3` on the line of fixed total mass `total` at `t0`.
///
/// Along `M = const` both chirp times scale as `1 / eta`, so the line
/// is straight through the origin.
pub fn fixed_total_mass_t3(scale: &ChirpScale, t0: f64, total: f64) -> f64 {
    scale.a3 / scale.a0 * t0 * total * MT_SUN
}

/// `t3` of the covering-region boundary at `t0`.
///
/// Average of the equal-mass line and the mass-extremal branch.
pub fn boundary_t3(t0: f64, f_lower: f64, m_min: f64, m_max: f64) -> f64 {
    let scale = ChirpScale::new(f_lower);
    0.5 * (equal_mass_t3(&scale, t0) + extremal_t3(t0, f_lower, m_min, m_max))
}

/// [`boundary_t3`] for caller-supplied arguments, which must all be
/// positive.
pub fn checked_boundary_t3(t0: f64, f_lower: f64, m_min: f64, m_max: f64) -> BankResult<f64> {
    if !(t0 > 0.0 && f_lower > 0.0 && m_min > 0.0 && m_max > 0.0) {
        return Err(BankError::Numerical(format!(
            "t0, masses and f_lower must be > 0, got t0={t0}, masses=({m_min}, {m_max}), f_lower={f_lower}"
        )));
    }
    Ok(boundary_t3(t0, f_lower, m_min, m_max))
}

/// Axis-aligned search rectangle and boundary crossover for one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchLimits {
    pub x0_min: f64,
    /// `t0` of the lightest corner of the region.
    pub x0_max: f64,
    pub x1_min: f64,
    pub x1_max: f64,
    /// `t0` where the mass-extremal branch switches companion.
    pub x_bndry: f64,
    /// `t0` of the lightest equal-mass binary in the region. Equal to
    /// `x0_max` unless a total-mass floor cuts the equal-mass tip off.
    pub x0_equal_max: f64,
}

impl SearchLimits {
    pub fn from_config(config: &BankConfig) -> Self {
        let scale = ChirpScale::new(config.f_lower);
        let heavy = match config.mass_range {
            MassRange::MinMaxComponentMass => config.max_mass,
            _ => 0.5 * config.max_total_mass,
        };
        let light = config.light_equal_mass();
        let (m1, m2) = config.light_corner();
        let m_hi = config.boundary_max_mass();

        let (x0_min, x1_min) = scale.chirp_times(heavy, heavy);
        let (x0_equal_max, t3_equal) = scale.chirp_times(light, light);
        let (x0_max, t3_light) = scale.chirp_times(m1, m2);
        let (x_bndry, t3_corner) = scale.chirp_times(m_hi, config.min_mass);
        Self {
            x0_min,
            x0_max: x0_max.max(x0_equal_max),
            x1_min,
            x1_max: t3_light.max(t3_equal).max(t3_corner),
            x_bndry,
            x0_equal_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_for_m_recovers_total_mass() {
        let scale = ChirpScale::new(40.0);
        for &(q, other) in &[(1.0, 2.5), (1.0, 1.0), (3.0, 1.0), (3.0, 2.9), (1.0, 3.0)] {
            let (x, _) = scale.chirp_times(q, other);
            let m = solve_for_m(x, MT_SUN, q, scale.a0);
            assert!((m - (q + other)).abs() < 1e-9, "q={q}, other={other}: M={m}");
        }
    }

    #[test]
    fn test_equal_mass_line() {
        let scale = ChirpScale::new(40.0);
        let (t0, t3) = scale.chirp_times(2.2, 2.2);
        assert!((equal_mass_t3(&scale, t0) - t3).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_meets_corners() {
        let limits = SearchLimits::from_config(&BankConfig::default());
        let scale = ChirpScale::new(40.0);
        let (_, light) = scale.chirp_times(1.0, 1.0);
        let (_, heavy) = scale.chirp_times(3.0, 3.0);
        let lo = boundary_t3(limits.x0_min, 40.0, 1.0, 3.0);
        let hi = boundary_t3(limits.x0_max, 40.0, 1.0, 3.0);
        assert!((lo - heavy).abs() < 1e-9, "lo={lo} vs {heavy}");
        assert!((hi - light).abs() < 1e-9, "hi={hi} vs {light}");
    }

    #[test]
    fn test_boundary_continuous_over_range() {
        let limits = SearchLimits::from_config(&BankConfig::default());
        let n = 2000;
        let step = (limits.x0_max - limits.x0_min) / n as f64;
        let mut prev = boundary_t3(limits.x0_min, 40.0, 1.0, 3.0);
        for i in 1..=n {
            let y = boundary_t3(limits.x0_min + i as f64 * step, 40.0, 1.0, 3.0);
            assert!(y.is_finite());
            assert!((y - prev).abs() < 1e-3, "jump {} at step {i}", (y - prev).abs());
            prev = y;
        }
        let left = boundary_t3(limits.x_bndry - 1e-9, 40.0, 1.0, 3.0);
        let right = boundary_t3(limits.x_bndry + 1e-9, 40.0, 1.0, 3.0);
        assert!((left - right).abs() < 1e-8, "crossover gap {}", (left - right).abs());
    }

    #[test]
    fn test_checked_boundary_rejects_non_positive() {
        for (t0, m_min, m_max, f) in [
            (0.0, 1.0, 3.0, 40.0),
            (-5.0, 1.0, 3.0, 40.0),
            (20.0, 0.0, 3.0, 40.0),
            (20.0, 1.0, -3.0, 40.0),
            (20.0, 1.0, 3.0, 0.0),
            (f64::NAN, 1.0, 3.0, 40.0),
        ] {
            let err = checked_boundary_t3(t0, f, m_min, m_max).unwrap_err();
            assert!(matches!(err, BankError::Numerical(_)), "{err}");
        }
        let y = checked_boundary_t3(20.0, 40.0, 1.0, 3.0).unwrap();
        assert_eq!(y, boundary_t3(20.0, 40.0, 1.0, 3.0));
    }

    #[test]
    fn test_boundary_above_equal_mass_line() {
        let limits = SearchLimits::from_config(&BankConfig::default());
        let scale = ChirpScale::new(40.0);
        let mid = 0.5 * (limits.x0_min + limits.x0_max);
        assert!(boundary_t3(mid, 40.0, 1.0, 3.0) > equal_mass_t3(&scale, mid));
    }

    #[test]
    fn test_limits_default() {
        let l = SearchLimits::from_config(&BankConfig::default());
        assert!((l.x0_min - 6.9806).abs() < 1e-3, "x0_min={}", l.x0_min);
        assert!((l.x0_max - 43.561).abs() < 1e-2, "x0_max={}", l.x0_max);
        assert!((l.x1_min - 0.52124).abs() < 1e-4);
        assert!(l.x0_min < l.x_bndry && l.x_bndry < l.x0_max);
        assert!(l.x1_max > l.x1_min);
    }

    fn total_mass_window() -> BankConfig {
        BankConfig {
            mass_range: MassRange::MinMaxComponentTotalMass,
            min_total_mass: 3.0,
            max_total_mass: 5.0,
            max_mass: 4.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_limits_light_corner_on_total_mass_floor() {
        let l = SearchLimits::from_config(&total_mass_window());
        let scale = ChirpScale::new(40.0);
        let (corner, corner_t3) = scale.chirp_times(2.0, 1.0);
        let (equal, _) = scale.chirp_times(1.5, 1.5);
        assert!((l.x0_max - corner).abs() < 1e-12, "x0_max={}", l.x0_max);
        assert!((l.x0_equal_max - equal).abs() < 1e-12);
        assert!(l.x0_equal_max < l.x0_max);
        assert!(l.x1_max >= corner_t3);
    }

    #[test]
    fn test_limits_component_range_tip_is_equal_mass() {
        let l = SearchLimits::from_config(&BankConfig::default());
        assert_eq!(l.x0_max, l.x0_equal_max);
    }

    #[test]
    fn test_fixed_total_mass_line() {
        let scale = ChirpScale::new(40.0);
        for &(m1, m2) in &[(2.0, 1.0), (1.5, 1.5), (2.6, 0.4)] {
            let (t0, t3) = scale.chirp_times(m1, m2);
            let y = fixed_total_mass_t3(&scale, t0, m1 + m2);
            assert!((y - t3).abs() < 1e-12 * t3.max(1.0), "({m1}, {m2}): {y} vs {t3}");
        }
    }

    #[test]
    fn test_extremal_branch_hits_corner() {
        let scale = ChirpScale::new(40.0);
        let (t0, t3) = scale.chirp_times(4.0, 1.0);
        assert!((extremal_t3(t0, 40.0, 1.0, 4.0) - t3).abs() < 1e-9);
        let (t0, t3) = scale.chirp_times(2.0, 1.0);
        assert!((extremal_t3(t0, 40.0, 1.0, 4.0) - t3).abs() < 1e-9);
    }

    #[test]
    fn test_limits_total_mass_range() {
        let cfg = BankConfig {
            mass_range: MassRange::MinComponentMassMaxTotalMass,
            ..Default::default()
        };
        let l = SearchLimits::from_config(&cfg);
        let (t0, _) = ChirpScale::new(40.0).chirp_times(5.0, 1.0);
        assert!((l.x_bndry - t0).abs() < 1e-12);
    }
}
