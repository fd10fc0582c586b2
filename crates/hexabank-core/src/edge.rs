// ─────────────────────────────────────────────────────────────────────
// Hexabank — Edge Refinement
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Walks along the lower region boundary from the two terminal Edge
//! cells, placing one cell per step where the √3-scaled ellipse of the
//! current head meets the boundary curve.

use std::f64::consts::{FRAC_PI_2, PI};

use serde::{Deserialize, Serialize};

use hexabank_types::{BankError, BankResult};

use crate::lattice::{EdgePair, LatticeEngine};
use crate::registry::CellId;

/// Angular tolerance of the boundary search (0.1°).
pub const ANGLE_TOLERANCE: f64 = 0.1 * PI / 180.0;

/// Iteration cap of the boundary search.
pub const MAX_ANGLE_BISECTIONS: usize = 20;

/// Extra steps allowed on top of the geometric walk budget.
const WALK_SLACK: usize = 16;

/// Side of the ellipse searched for the next boundary point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkDirection {
    /// Flag 0: angles in [-π/2, π/2], ahead along the major axis.
    Forward,
    /// Flag 1: angles in [π/2, 3π/2], behind along the major axis.
    Backward,
}

impl WalkDirection {
    pub fn flag(self) -> u8 {
        match self {
            WalkDirection::Forward => 0,
            WalkDirection::Backward => 1,
        }
    }

    fn bracket(self) -> (f64, f64) {
        match self {
            WalkDirection::Forward => (-FRAC_PI_2, FRAC_PI_2),
            WalkDirection::Backward => (FRAC_PI_2, 3.0 * FRAC_PI_2),
        }
    }
}

/// Cells placed by one edge walk, in walk order.
#[derive(Debug, Clone)]
pub struct EdgeWalk {
    pub start: CellId,
    pub direction: WalkDirection,
    pub cells: Vec<CellId>,
}

impl LatticeEngine {
    /// Walk from both terminal edges: the upper one forward, the lower
    /// one backward.
    pub fn refine_edges(&mut self, edges: EdgePair) -> BankResult<(EdgeWalk, EdgeWalk)> {
        let upper = self.walk_edge(edges.upper, WalkDirection::Forward)?;
        let lower = self.walk_edge(edges.lower, WalkDirection::Backward)?;
        Ok((upper, lower))
    }

    /// Place boundary cells from `start` until the head leaves the open
    /// interval `(x0_min, x0_max)`.
    pub fn walk_edge(&mut self, start: CellId, direction: WalkDirection) -> BankResult<EdgeWalk> {
        let limits = self.grid.limits;
        let budget = {
            let cell = &self.registry[start];
            let step = cell.dx0.min(cell.dx1);
            if !(step > 0.0) {
                return Err(BankError::Numerical(format!(
                    "edge cell #{start} has degenerate semi-axes ({}, {})",
                    cell.dx0, cell.dx1
                )));
            }
            (2.0 * (limits.x0_max - limits.x0_min) / step).ceil() as usize + WALK_SLACK
        };

        let mut head = start;
        let mut cells = Vec::new();
        while self.registry[head].t0 > limits.x0_min && self.registry[head].t0 < limits.x0_max {
            if cells.len() >= budget {
                return Err(BankError::EdgeWalk { steps: cells.len() });
            }
            let (t0, t3) = self.next_boundary_point(head, direction);
            let next = self.spawn(head, t0, t3)?;
            self.sterilize(head);
            cells.push(next);
            head = next;
        }
        self.sterilize(head);

        log::debug!(
            "edge walk from #{start} (flag {}): {} cells",
            direction.flag(),
            cells.len()
        );
        Ok(EdgeWalk {
            start,
            direction,
            cells,
        })
    }

    /// Point of the √3-scaled ellipse around `head` that sits on the
    /// boundary, clamped into the search rectangle.
    fn next_boundary_point(&self, head: CellId, direction: WalkDirection) -> (f64, f64) {
        let cell = &self.registry[head];
        let a = 3f64.sqrt() * cell.dx0;
        let b = 3f64.sqrt() * cell.dx1;
        let on_ellipse = |angle: f64| cell.offset(a * angle.cos(), b * angle.sin());

        let (mut lo, mut hi) = direction.bracket();
        let mut iterations = 0;
        while (hi - lo).abs() > ANGLE_TOLERANCE && iterations < MAX_ANGLE_BISECTIONS {
            let mid = 0.5 * (lo + hi);
            let (x, y) = on_ellipse(mid);
            let above = y - self.grid.boundary_t3(x) > 0.0;
            match (direction, above) {
                (WalkDirection::Forward, true) | (WalkDirection::Backward, false) => hi = mid,
                (WalkDirection::Forward, false) | (WalkDirection::Backward, true) => lo = mid,
            }
            iterations += 1;
        }
        let (mut x, mut y) = on_ellipse(0.5 * (lo + hi));

        let limits = self.grid.limits;
        if x > limits.x0_max || y > limits.x1_max {
            x = limits.x0_max;
            y = self.grid.boundary_t3(x);
        }
        if x < limits.x0_min {
            x = limits.x0_min;
            y = self.grid.boundary_t3(x);
        }
        (x, y)
    }
}
