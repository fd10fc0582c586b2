// ─────────────────────────────────────────────────────────────────────
// Hexabank — Lattice Propagation Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Breadth-first growth of the lattice from a seed cell.
//!
//! ```text
//! Initial ──seed──► Growing ──queue empty──► Terminal (two Edge cells)
//! ```
//!
//! Every pass processes the fertile cells present at pass entry. A cell
//! derives its neighbours once, then becomes Sterile, unless it is the
//! current best candidate for one of the two edges.
//!
//! Edge candidates are tip cells, where the region is narrower than
//! the inner half of the cell rectangle. On each side of the crossover
//! the candidate closest to the middle of the region wins, so the edge
//! walks start where the lattice stops resolving the region. Tip cells
//! on the light side stop spawning once the region closes there.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use hexabank_physics::MetricOracle;
use hexabank_types::{BankError, BankResult, CellStatus, Position};

use crate::fertility::FertilityQueue;
use crate::grid::GridParams;
use crate::registry::{CellId, CellRegistry};

/// Existing cells closer than this (in parent ellipse units) to a
/// lattice site are linked instead of duplicated. Lattice neighbours sit
/// at √3 (hexagonal) or √2 (square).
pub const MERGE_RADIUS: f64 = 0.75;

/// Counters collected while the lattice grows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropagationStats {
    pub passes: usize,
    pub cells_created: usize,
    pub links_reused: usize,
    /// Lattice sites pulled towards their parent to keep the spacing
    /// within the neighbour's own ellipse.
    pub sites_tightened: usize,
    pub edge_replacements: usize,
}

/// The two terminal Edge cells, ordered by `t0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgePair {
    pub upper: CellId,
    pub lower: CellId,
}

/// Owns the registry and worklist for one bank-generation run.
pub struct LatticeEngine {
    pub(crate) grid: GridParams,
    pub(crate) oracle: Arc<dyn MetricOracle>,
    pub(crate) registry: CellRegistry,
    pub(crate) queue: FertilityQueue,
    seed: CellId,
    lower_edge: Option<CellId>,
    upper_edge: Option<CellId>,
    stats: PropagationStats,
}

impl LatticeEngine {
    /// Place the seed at the heavy equal-mass corner and queue it.
    pub fn new(grid: GridParams, oracle: Arc<dyn MetricOracle>) -> BankResult<Self> {
        let (t0, t3) = (grid.limits.x0_min, grid.limits.x1_min);

        // Index buckets are sized from the seed ellipse.
        let seed_metric = oracle.evaluate(t0, t3)?;
        let (dx0, dx1) = seed_metric.semi_axes(grid.minimal_match())?;
        let (s, c) = seed_metric.theta.sin_cos();
        let bucket = (
            2.0 * (dx0 * c.abs() + dx1 * s.abs()),
            2.0 * (dx0 * s.abs() + dx1 * c.abs()),
        );

        let mut registry = CellRegistry::new(bucket)?;
        let seed = registry.allocate(None, t0, t3)?;
        let position = registry.initialize(seed, oracle.as_ref(), &grid)?;
        if position != Position::In {
            log::warn!("seed cell at ({t0:.4}, {t3:.4}) classified {position:?}");
        }
        let mut queue = FertilityQueue::new();
        queue.insert(seed);

        Ok(Self {
            grid,
            oracle,
            registry,
            queue,
            seed,
            lower_edge: None,
            upper_edge: None,
            stats: PropagationStats {
                cells_created: 1,
                ..Default::default()
            },
        })
    }

    pub fn grid(&self) -> &GridParams {
        &self.grid
    }

    pub fn registry(&self) -> &CellRegistry {
        &self.registry
    }

    pub fn queue(&self) -> &FertilityQueue {
        &self.queue
    }

    pub fn seed(&self) -> CellId {
        self.seed
    }

    pub fn stats(&self) -> &PropagationStats {
        &self.stats
    }

    /// Allocate and initialise a cell; queue it when it lies `In`,
    /// otherwise retire it at once.
    pub(crate) fn spawn(&mut self, parent: CellId, t0: f64, t3: f64) -> BankResult<CellId> {
        let id = self.registry.allocate(Some(parent), t0, t3)?;
        let position = self
            .registry
            .initialize(id, self.oracle.as_ref(), &self.grid)?;
        if position == Position::In {
            self.queue.insert(id);
        } else {
            self.registry[id].status = CellStatus::Sterile;
        }
        self.stats.cells_created += 1;
        Ok(id)
    }

    /// Retire a cell and drop it from the worklist.
    pub(crate) fn sterilize(&mut self, id: CellId) {
        self.registry[id].status = CellStatus::Sterile;
        self.queue.remove(id);
    }

    /// Run passes until the fertility queue drains.
    pub fn propagate(&mut self) -> BankResult<()> {
        while !self.queue.is_empty() {
            let snapshot = self.queue.snapshot();
            self.stats.passes += 1;
            for id in snapshot {
                if self.registry[id].status == CellStatus::Fertile && self.queue.contains(id) {
                    self.populate(id)?;
                }
            }
            log::debug!(
                "pass {}: {} cells, {} fertile",
                self.stats.passes,
                self.registry.len(),
                self.queue.len()
            );
        }
        log::info!(
            "lattice grown: {} cells in {} passes ({} links reused)",
            self.registry.len(),
            self.stats.passes,
            self.stats.links_reused
        );
        Ok(())
    }

    /// Derive and link the free neighbours of `parent`, then settle its
    /// status.
    fn populate(&mut self, parent: CellId) -> BankResult<()> {
        let limits = self.grid.limits;
        let t0 = self.registry[parent].t0;
        let tip = t0 >= limits.x0_min
            && t0 <= limits.x0_max
            && self.registry.spans_tip(parent, &self.grid);
        let closed = tip && t0 >= limits.x_bndry && self.grid.light_tip_on_equal_mass();
        if !closed {
            self.spawn_neighbors(parent)?;
        }
        self.settle(parent, tip || parent == self.seed);
        Ok(())
    }

    fn spawn_neighbors(&mut self, parent: CellId) -> BankResult<()> {
        let slots = self.grid.lattice().slots();
        for site in self.registry.derive_neighbors(parent, &self.grid) {
            let (t0, t3) = self.tighten(parent, site.t0, site.t3)?;
            let child = match self.registry.find_near(parent, t0, t3, MERGE_RADIUS) {
                Some(existing) => {
                    self.stats.links_reused += 1;
                    existing
                }
                None => self.spawn(parent, t0, t3)?,
            };
            self.registry.link(parent, site.slot, child, slots);
        }
        Ok(())
    }

    /// Pull a lattice site towards `parent` until the parent sits no
    /// further than one lattice step inside the site's own ellipse.
    ///
    /// Where the metric shrinks along the step, an unscaled site would
    /// leave a gap between the two ellipses.
    fn tighten(&mut self, parent: CellId, t0: f64, t3: f64) -> BankResult<(f64, f64)> {
        if !(t0 > 0.0 && t3 > 0.0) {
            return Ok((t0, t3));
        }
        let (p0, p3) = (self.registry[parent].t0, self.registry[parent].t3);
        let metric = self.oracle.evaluate(t0, t3)?;
        let (dx0, dx1) = metric.semi_axes(self.grid.minimal_match())?;
        let (u, v) = metric.to_local(t0 - p0, t3 - p3);
        let reach = (u / dx0).hypot(v / dx1);
        let spacing = self.grid.lattice().spacing();
        if reach <= spacing {
            return Ok((t0, t3));
        }
        self.stats.sites_tightened += 1;
        let f = spacing / reach;
        Ok((p0 + (t0 - p0) * f, p3 + (t3 - p3) * f))
    }

    /// Drop a processed cell from the worklist. It stays as an Edge when
    /// `candidate` wins its side, otherwise it becomes Sterile.
    fn settle(&mut self, id: CellId, candidate: bool) {
        self.queue.remove(id);
        if !(candidate && self.nominate_edge(id)) {
            self.registry[id].status = CellStatus::Sterile;
        }
    }

    /// Make fertile `id` the Edge of its side of the crossover if it lies
    /// further inside the region than the current holder, who is retired.
    fn nominate_edge(&mut self, id: CellId) -> bool {
        if self.registry[id].status != CellStatus::Fertile {
            return false;
        }
        let t0 = self.registry[id].t0;
        let lower_side = t0 < self.grid.limits.x_bndry;
        let current = if lower_side {
            self.lower_edge
        } else {
            self.upper_edge
        };
        let better = match current {
            None => true,
            Some(holder) if lower_side => t0 > self.registry[holder].t0,
            Some(holder) => t0 < self.registry[holder].t0,
        };
        if !better {
            return false;
        }
        if let Some(holder) = current {
            self.registry[holder].status = CellStatus::Sterile;
            self.stats.edge_replacements += 1;
        }
        self.registry[id].status = CellStatus::Edge;
        if lower_side {
            self.lower_edge = Some(id);
        } else {
            self.upper_edge = Some(id);
        }
        true
    }

    /// Check the termination invariant and order the two Edge cells.
    pub fn terminal_edges(&self) -> BankResult<EdgePair> {
        if !self.queue.is_empty() {
            return Err(BankError::QueueNotEmpty {
                remaining: self.queue.len(),
            });
        }
        let edges: Vec<CellId> = self
            .registry
            .iter()
            .filter(|c| c.status == CellStatus::Edge)
            .map(|c| c.id)
            .collect();
        let &[a, b] = edges.as_slice() else {
            return Err(BankError::EdgeCount { found: edges.len() });
        };
        let pair = if self.registry[a].t0 > self.registry[b].t0 {
            EdgePair { upper: a, lower: b }
        } else {
            EdgePair { upper: b, lower: a }
        };
        log::debug!(
            "edges: upper #{} at t0={:.4}, lower #{} at t0={:.4}",
            pair.upper,
            self.registry[pair.upper].t0,
            pair.lower,
            self.registry[pair.lower].t0
        );
        Ok(pair)
    }
}
