// ─────────────────────────────────────────────────────────────────────
// Hexabank — Bank Configuration
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{BankError, BankResult};

/// Which mass constraints carve the target region out of the
/// equal-mass-bounded chirp-time plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MassRange {
    /// `min_mass <= m2 <= m1 <= max_mass`.
    MinMaxComponentMass,
    /// `m2 >= min_mass` and `m1 + m2 <= max_total_mass`.
    MinComponentMassMaxTotalMass,
    /// `m2 >= min_mass` and `min_total_mass <= m1 + m2 <= max_total_mass`.
    MinMaxComponentTotalMass,
}

/// Placement lattice used to derive neighbours of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatticeShape {
    /// Four neighbours along the ellipse axes.
    Square,
    /// Six neighbours at 60° steps on the √3-scaled ellipse.
    Hexagonal,
}

impl LatticeShape {
    /// Number of neighbour slots a cell carries.
    pub fn slots(self) -> usize {
        match self {
            LatticeShape::Square => 4,
            LatticeShape::Hexagonal => 6,
        }
    }

    /// Distance of a neighbour site in units of the parent ellipse.
    pub fn spacing(self) -> f64 {
        match self {
            LatticeShape::Square => 2f64.sqrt(),
            LatticeShape::Hexagonal => 3f64.sqrt(),
        }
    }
}

/// Detector noise curve used by the reference metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseModel {
    InitialLigo,
    AdvancedLigo,
    White,
}

/// Parameters of one bank-generation run.
///
/// Masses are in solar masses, frequencies in Hz.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    /// Smallest component mass. Default: 1.0.
    pub min_mass: f64,

    /// Largest component mass. Default: 3.0.
    pub max_mass: f64,

    /// Smallest total mass, only used by `MinMaxComponentTotalMass`.
    /// Default: 2.0.
    pub min_total_mass: f64,

    /// Largest total mass, used by the total-mass ranges. Default: 6.0.
    pub max_total_mass: f64,

    /// Lower bound on the symmetric mass ratio. Default: 0.0.
    pub eta_min: f64,

    /// Lower frequency cutoff defining the chirp times. Default: 40.0.
    pub f_lower: f64,

    /// Upper integration limit of the noise moments. Default: 2048.0.
    pub f_upper: f64,

    /// Minimal match between any signal and its nearest template.
    /// Default: 0.97.
    pub minimal_match: f64,

    pub mass_range: MassRange,
    pub lattice: LatticeShape,
    pub noise: NoiseModel,
}

impl Default for BankConfig {
    fn default() -> Self {
        Self {
            min_mass: 1.0,
            max_mass: 3.0,
            min_total_mass: 2.0,
            max_total_mass: 6.0,
            eta_min: 0.0,
            f_lower: 40.0,
            f_upper: 2048.0,
            minimal_match: 0.97,
            mass_range: MassRange::MinMaxComponentMass,
            lattice: LatticeShape::Hexagonal,
            noise: NoiseModel::InitialLigo,
        }
    }
}

impl BankConfig {
    /// Validate configuration parameters.
    ///
    /// Mass bounds are only checked for the mass range that reads them.
    pub fn validate(&self) -> BankResult<()> {
        positive("min_mass", self.min_mass)?;
        match self.mass_range {
            MassRange::MinMaxComponentMass => {
                positive("max_mass", self.max_mass)?;
                if self.max_mass <= self.min_mass {
                    return Err(BankError::Config(format!(
                        "max_mass must be > min_mass, got {} <= {}",
                        self.max_mass, self.min_mass
                    )));
                }
            }
            MassRange::MinComponentMassMaxTotalMass => self.check_max_total_mass()?,
            MassRange::MinMaxComponentTotalMass => {
                positive("min_total_mass", self.min_total_mass)?;
                self.check_max_total_mass()?;
                if self.min_total_mass >= self.max_total_mass {
                    return Err(BankError::Config(format!(
                        "min_total_mass must be < max_total_mass, got {} >= {}",
                        self.min_total_mass, self.max_total_mass
                    )));
                }
            }
        }
        if !(0.0..=0.25).contains(&self.eta_min) {
            return Err(BankError::Config(format!(
                "eta_min must be in [0, 0.25], got {}",
                self.eta_min
            )));
        }
        if !(self.f_lower.is_finite() && self.f_lower > 0.0) {
            return Err(BankError::Config(format!(
                "f_lower must be > 0, got {}",
                self.f_lower
            )));
        }
        if !(self.f_upper.is_finite() && self.f_upper > self.f_lower) {
            return Err(BankError::Config(format!(
                "f_upper must be > f_lower, got {} <= {}",
                self.f_upper, self.f_lower
            )));
        }
        if !(self.minimal_match > 0.0 && self.minimal_match < 1.0) {
            return Err(BankError::Config(format!(
                "minimal_match must be in (0, 1), got {}",
                self.minimal_match
            )));
        }
        Ok(())
    }

    fn check_max_total_mass(&self) -> BankResult<()> {
        positive("max_total_mass", self.max_total_mass)?;
        if self.max_total_mass < 2.0 * self.min_mass {
            return Err(BankError::Config(format!(
                "max_total_mass must be >= 2 * min_mass, got {} < {}",
                self.max_total_mass,
                2.0 * self.min_mass
            )));
        }
        Ok(())
    }

    /// Load from JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> BankResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| BankError::Config(format!("JSON parse error: {e}")))
    }

    /// Heaviest companion along the mass-extremal boundary branch.
    pub fn boundary_max_mass(&self) -> f64 {
        match self.mass_range {
            MassRange::MinMaxComponentMass => self.max_mass,
            _ => self.max_total_mass - self.min_mass,
        }
    }

    /// Component masses `(m1, m2)` of the lightest corner of the region,
    /// the one with the largest `t0`.
    ///
    /// A total-mass floor above `2 * min_mass` cuts the equal-mass tip
    /// off; the corner then sits on `M = min_total_mass` at `m2 = min_mass`.
    pub fn light_corner(&self) -> (f64, f64) {
        match self.mass_range {
            MassRange::MinMaxComponentTotalMass => (
                (self.min_total_mass - self.min_mass).max(self.min_mass),
                self.min_mass,
            ),
            _ => (self.min_mass, self.min_mass),
        }
    }

    /// Lightest equal-mass component inside the region.
    pub fn light_equal_mass(&self) -> f64 {
        match self.mass_range {
            MassRange::MinMaxComponentTotalMass => {
                self.min_mass.max(0.5 * self.min_total_mass)
            }
            _ => self.min_mass,
        }
    }
}

fn positive(name: &str, value: f64) -> BankResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BankError::Config(format!("{name} must be > 0, got {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(BankConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_mass() {
        let cfg = BankConfig {
            min_mass: 0.0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(BankError::Config(_))));
    }

    #[test]
    fn test_rejects_small_total_mass() {
        let cfg = BankConfig {
            mass_range: MassRange::MinComponentMassMaxTotalMass,
            max_total_mass: 1.5,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_total_mass"), "{err}");
    }

    #[test]
    fn test_component_range_ignores_total_mass() {
        let cfg = BankConfig {
            min_mass: 4.0,
            max_mass: 10.0,
            ..Default::default()
        };
        assert!(cfg.max_total_mass < 2.0 * cfg.min_mass);
        assert!(cfg.validate().is_ok());

        let cfg = BankConfig {
            max_total_mass: -1.0,
            min_total_mass: f64::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_total_range_ignores_max_mass() {
        let cfg = BankConfig {
            mass_range: MassRange::MinComponentMassMaxTotalMass,
            max_mass: 0.5,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_inverted_total_masses() {
        let cfg = BankConfig {
            mass_range: MassRange::MinMaxComponentTotalMass,
            min_total_mass: 6.0,
            max_total_mass: 5.0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("min_total_mass"), "{err}");
    }

    #[test]
    fn test_rejects_inverted_component_masses() {
        let cfg = BankConfig {
            min_mass: 3.0,
            max_mass: 2.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_minimal_match() {
        for mm in [0.0, 1.0, 1.2, f64::NAN] {
            let cfg = BankConfig {
                minimal_match: mm,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "minimal_match={mm} should fail");
        }
    }

    #[test]
    fn test_from_json_partial() {
        let cfg = BankConfig::from_json(
            r#"{"min_mass": 2.0, "max_mass": 5.0, "lattice": "square"}"#,
        )
        .unwrap();
        assert_eq!(cfg.lattice, LatticeShape::Square);
        assert!((cfg.max_mass - 5.0).abs() < 1e-12);
        assert!((cfg.f_lower - 40.0).abs() < 1e-12);
    }

    #[test]
    fn test_from_json_garbage() {
        let err = BankConfig::from_json("{not json").unwrap_err();
        assert!(err.to_string().contains("JSON parse error"));
    }

    #[test]
    fn test_boundary_max_mass() {
        let mut cfg = BankConfig::default();
        assert!((cfg.boundary_max_mass() - 3.0).abs() < 1e-12);
        cfg.mass_range = MassRange::MinComponentMassMaxTotalMass;
        assert!((cfg.boundary_max_mass() - 5.0).abs() < 1e-12);
    }
}
