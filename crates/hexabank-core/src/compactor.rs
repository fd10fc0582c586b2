// ─────────────────────────────────────────────────────────────────────
// Hexabank — Output Compactor
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Turns the settled lattice into the final template list.
//!
//! Cells whose centre fell below the equal-mass line are first slid
//! along their major axis onto the line and reclassified, then every
//! `In` cell is inverted back to masses and numbered in id order.

use serde::{Deserialize, Serialize};

use hexabank_physics::bisect;
use hexabank_physics::roots::MAX_BISECTIONS;
use hexabank_types::{BankError, BankResult, Position, TemplateRecord};

use crate::lattice::LatticeEngine;
use crate::registry::CellId;

/// Root tolerance in t0 when intersecting with the equal-mass line.
pub const T0_ACCURACY: f64 = 1e-6;

/// Counters of the below-line correction pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrectionStats {
    pub corrected: usize,
    /// Corrected cells that were not `In` before the move and are after.
    pub promoted: usize,
    pub no_crossing: usize,
    pub non_positive: usize,
    pub suppressed_children: usize,
}

impl LatticeEngine {
    /// Move every cell with a below-line centre onto the equal-mass line,
    /// reclassify it, and drop the redundant child of corrected cells
    /// that still touch two `Above` corners.
    pub fn correct_below_line(&mut self) -> BankResult<CorrectionStats> {
        if !self.queue.is_empty() {
            return Err(BankError::QueueNotEmpty {
                remaining: self.queue.len(),
            });
        }
        let mut stats = CorrectionStats::default();
        for id in 0..self.registry.len() {
            let cell = &self.registry[id];
            if cell.rect_position[0] != Position::Below {
                continue;
            }
            let accepted = cell.position == Position::In;
            let Some((t0, t3)) = self.equal_mass_crossing(id)? else {
                if accepted {
                    log::warn!(
                        "cell #{id} at ({:.6}, {:.6}) has no equal-mass crossing on its major axis",
                        cell.t0,
                        cell.t3
                    );
                } else {
                    log::debug!("rejected cell #{id} has no equal-mass crossing");
                }
                stats.no_crossing += 1;
                continue;
            };
            if t0 <= 0.0 {
                log::warn!("cell #{id}: corrected t0={t0:.6} is not positive, left unmodified");
                stats.non_positive += 1;
                continue;
            }

            self.registry.relocate(id, t0, t3);
            let position = self.registry.classify(id, &self.grid);
            stats.corrected += 1;
            if !accepted && position == Position::In {
                stats.promoted += 1;
            }

            let cell = &self.registry[id];
            if cell.corner_count(Position::Above) == 2 && position == Position::In {
                if let Some(child) = cell.child[0] {
                    self.registry[child].position = Position::Out;
                    stats.suppressed_children += 1;
                }
            }
        }
        log::debug!(
            "below-line correction: {} moved, {} promoted, {} children suppressed",
            stats.corrected,
            stats.promoted,
            stats.suppressed_children
        );
        Ok(stats)
    }

    /// Nearest point where the major axis of `id` meets the equal-mass
    /// line, nudged onto the physical side.
    fn equal_mass_crossing(&self, id: CellId) -> BankResult<Option<(f64, f64)>> {
        let cell = &self.registry[id];
        let slope = cell.metric.theta.tan();
        let intercept = cell.t3 - slope * cell.t0;
        let gap = |x: f64| slope * x + intercept - self.grid.equal_mass_t3(x);
        let reach = 2.0 * cell.dx0 * cell.metric.theta.cos().abs();

        let mut best: Option<f64> = None;
        for dir in [1.0, -1.0] {
            let far = cell.t0 + dir * reach;
            if !(far > 0.0 && gap(far) > 0.0) {
                continue;
            }
            let root = match bisect(gap, cell.t0, far, T0_ACCURACY, MAX_BISECTIONS) {
                Ok(root) => root + dir * T0_ACCURACY,
                Err(BankError::Bracket { .. }) => continue,
                Err(e) => return Err(e),
            };
            if best.map_or(true, |b| (root - cell.t0).abs() < (b - cell.t0).abs()) {
                best = Some(root);
            }
        }
        Ok(best.map(|t0| (t0, slope * t0 + intercept)))
    }

    /// Number every accepted cell in id order and invert it to masses.
    pub fn compact(&self) -> BankResult<Vec<TemplateRecord>> {
        let scale = self.grid.scale;
        let mut templates = Vec::new();
        for cell in self.registry.iter() {
            if !(cell.position == Position::In && cell.t0 > 0.0) {
                continue;
            }
            templates.push(TemplateRecord {
                id: templates.len(),
                params: scale.template_params(cell.t0, cell.t3)?,
                metric: cell.metric,
                dx0: cell.dx0,
                dx1: cell.dx1,
            });
        }
        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hexabank_physics::{PnMetric, UniformMetric};
    use hexabank_types::{BankConfig, CellStatus, LocalMetric};

    use crate::grid::GridParams;

    fn settled_engine() -> LatticeEngine {
        let config = BankConfig::default();
        let grid = GridParams::from_config(&config).unwrap();
        let oracle = Arc::new(PnMetric::from_config(&config).unwrap());
        let mut e = LatticeEngine::new(grid, oracle).unwrap();
        e.propagate().unwrap();
        let edges = e.terminal_edges().unwrap();
        e.refine_edges(edges).unwrap();
        e
    }

    #[test]
    fn test_correction_moves_cells_onto_physical_side() {
        let mut e = settled_engine();
        let before: Vec<(CellId, f64, f64)> = e
            .registry
            .iter()
            .filter(|c| c.rect_position[0] == Position::Below)
            .map(|c| (c.id, c.t0, c.t3))
            .collect();
        assert!(!before.is_empty());
        let stats = e.correct_below_line().unwrap();
        assert_eq!(stats.corrected + stats.no_crossing + stats.non_positive, before.len());
        assert!(stats.corrected > 0);

        let mut moved = 0;
        for (id, t0, t3) in before {
            let cell = &e.registry[id];
            if cell.t0 == t0 && cell.t3 == t3 {
                continue;
            }
            moved += 1;
            let (_, eta) = e.grid.scale.total_mass_eta(cell.t0, cell.t3);
            assert!(eta <= 0.25, "cell #{id} still below: eta={eta}");
            assert!((cell.t0 - t0).abs() <= 2.0 * cell.dx0, "cell #{id} moved too far");
        }
        assert_eq!(moved, stats.corrected);
    }

    #[test]
    fn test_rejected_below_cell_corrected_into_region() {
        let config = BankConfig::default();
        let grid = GridParams::from_config(&config).unwrap();
        let oracle = Arc::new(UniformMetric::new(LocalMetric::new(0.7, 10.0, 400.0)).unwrap());
        let mut e = LatticeEngine::new(grid, oracle).unwrap();
        let t0 = 20.0;
        let t3 = e.grid.equal_mass_t3(t0) - 0.06;
        let seed = e.seed();
        let id = e.spawn(seed, t0, t3).unwrap();
        {
            let cell = &e.registry[id];
            assert!(cell.rect_position.iter().all(|&p| p == Position::Below));
            assert_eq!(cell.position, Position::Below);
            assert_eq!(cell.status, CellStatus::Sterile);
        }
        e.queue.remove(seed);

        let stats = e.correct_below_line().unwrap();
        assert!(stats.promoted >= 1);
        let cell = &e.registry[id];
        assert_eq!(cell.position, Position::In);
        assert!(cell.t0 > t0 && cell.t0 - t0 < 2.0 * cell.dx0, "t0={}", cell.t0);
        let (_, eta) = e.grid.scale.total_mass_eta(cell.t0, cell.t3);
        assert!(eta <= 0.25);

        let (m1, m2) = e.grid.scale.component_masses(cell.t0, cell.t3).unwrap();
        let templates = e.compact().unwrap();
        assert!(templates
            .iter()
            .any(|t| (t.params.mass1 - m1).abs() < 1e-9 && (t.params.mass2 - m2).abs() < 1e-9));
    }

    #[test]
    fn test_correction_requires_empty_queue() {
        let config = BankConfig::default();
        let grid = GridParams::from_config(&config).unwrap();
        let oracle = Arc::new(PnMetric::from_config(&config).unwrap());
        let mut e = LatticeEngine::new(grid, oracle).unwrap();
        assert!(matches!(
            e.correct_below_line(),
            Err(BankError::QueueNotEmpty { .. })
        ));
    }

    #[test]
    fn test_crossing_on_major_axis() {
        let config = BankConfig::default();
        let grid = GridParams::from_config(&config).unwrap();
        let oracle = Arc::new(UniformMetric::new(LocalMetric::new(0.7, 10.0, 400.0)).unwrap());
        let mut e = LatticeEngine::new(grid, oracle).unwrap();
        let t0 = 20.0;
        let t3 = e.grid.equal_mass_t3(t0) - 0.004;
        let seed = e.seed();
        let id = e.spawn(seed, t0, t3).unwrap();
        let (x, y) = e.equal_mass_crossing(id).unwrap().unwrap();
        // On the axis line, just above the equal-mass line.
        assert!((y - (t3 + 0.7f64.tan() * (x - t0))).abs() < 1e-12);
        let gap = y - e.grid.equal_mass_t3(x);
        assert!(gap > 0.0 && gap < 1e-5, "gap={gap}");
        assert!(x > t0);
    }

    #[test]
    fn test_compact_numbers_in_cells_only() {
        let mut e = settled_engine();
        e.correct_below_line().unwrap();
        let templates = e.compact().unwrap();
        let n_in = e
            .registry
            .iter()
            .filter(|c| c.position == Position::In && c.t0 > 0.0)
            .count();
        assert_eq!(templates.len(), n_in);
        for (i, t) in templates.iter().enumerate() {
            assert_eq!(t.id, i);
            assert!(t.params.t0 > 0.0);
            assert!(t.params.mass1 >= t.params.mass2);
            assert!(t.params.eta <= 0.25);
        }
        assert!(e.registry.iter().all(|c| c.status != CellStatus::Fertile));
    }
}
