// ─────────────────────────────────────────────────────────────────────
// Hexabank — Grid Parameters
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Immutable per-run geometry: configuration, chirp-time scale, search
//! rectangle, and the target-region predicate on (t0, t3).

use hexabank_physics::boundary::{self, SearchLimits};
use hexabank_physics::ChirpScale;
use hexabank_types::{BankConfig, BankResult, LatticeShape, MassRange, Position};

/// Everything a bank run needs to know about its region.
#[derive(Debug, Clone)]
pub struct GridParams {
    pub config: BankConfig,
    pub scale: ChirpScale,
    pub limits: SearchLimits,
}

impl GridParams {
    pub fn from_config(config: &BankConfig) -> BankResult<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
            scale: ChirpScale::new(config.f_lower),
            limits: SearchLimits::from_config(config),
        })
    }

    pub fn minimal_match(&self) -> f64 {
        self.config.minimal_match
    }

    pub fn lattice(&self) -> LatticeShape {
        self.config.lattice
    }

    /// Classify a single point against the target region.
    pub fn classify_point(&self, t0: f64, t3: f64) -> Position {
        if !(t0 > 0.0 && t3 > 0.0) {
            return Position::Out;
        }
        let (total, eta) = self.scale.total_mass_eta(t0, t3);
        if !(total.is_finite() && eta.is_finite()) {
            return Position::Out;
        }
        if eta > 0.25 {
            return Position::Below;
        }
        let spread = (1.0 - 4.0 * eta).sqrt();
        let m1 = 0.5 * total * (1.0 + spread);
        let m2 = 0.5 * total * (1.0 - spread);
        let cfg = &self.config;
        let inside = m2 >= cfg.min_mass
            && eta >= cfg.eta_min
            && match cfg.mass_range {
                MassRange::MinMaxComponentMass => m1 <= cfg.max_mass,
                MassRange::MinComponentMassMaxTotalMass => total <= cfg.max_total_mass,
                MassRange::MinMaxComponentTotalMass => {
                    total >= cfg.min_total_mass && total <= cfg.max_total_mass
                }
            };
        if inside {
            Position::In
        } else {
            Position::Above
        }
    }

    /// Whether `(t0, t3)` lies in the search rectangle padded by the
    /// axis-aligned extents `(e0, e3)` of a cell.
    pub fn in_bounds(&self, t0: f64, t3: f64, e0: f64, e3: f64) -> bool {
        let l = &self.limits;
        t0 > 0.0
            && t3 > 0.0
            && t0 >= l.x0_min - e0
            && t0 <= l.x0_max + e0
            && t3 >= l.x1_min - e3
            && t3 <= l.x1_max + e3
    }

    /// `t3` of the curve edge refinement walks at `t0`.
    ///
    /// Midway between the lower boundary and the mass-extremal branch.
    /// Past the lightest equal-mass binary the lower boundary is the
    /// `M = min_total_mass` line instead of the equal-mass line.
    pub fn boundary_t3(&self, t0: f64) -> f64 {
        let cfg = &self.config;
        let m_hi = cfg.boundary_max_mass();
        if self.light_tip_on_equal_mass() || t0 <= self.limits.x0_equal_max {
            return boundary::boundary_t3(t0, cfg.f_lower, cfg.min_mass, m_hi);
        }
        let floor = boundary::fixed_total_mass_t3(&self.scale, t0, cfg.min_total_mass);
        0.5 * (floor + boundary::extremal_t3(t0, cfg.f_lower, cfg.min_mass, m_hi))
    }

    /// The region's light tip is the equal-mass binary rather than a
    /// corner on the total-mass floor.
    pub fn light_tip_on_equal_mass(&self) -> bool {
        self.limits.x0_equal_max >= self.limits.x0_max
    }

    pub fn equal_mass_t3(&self, t0: f64) -> f64 {
        boundary::equal_mass_t3(&self.scale, t0)
    }
}
