// ─────────────────────────────────────────────────────────────────────
// Hexabank — Cell Registry
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Arena of placement cells addressed by dense integer ids.
//!
//! The backing `Vec` grows in fixed batches. Cells reference each other
//! only by id, so growth never invalidates a reference. Cells are never
//! removed; retirement is a status change.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI};
use std::ops::{Index, IndexMut};

use hexabank_physics::MetricOracle;
use hexabank_types::{BankError, BankResult, CellStatus, LatticeShape, LocalMetric, Position};

use crate::grid::GridParams;

pub type CellId = usize;

/// Cells reserved per growth event.
pub const GROWTH_BATCH: usize = 1000;

/// Neighbour slots of the widest lattice.
pub const MAX_NEIGHBOURS: usize = 6;

/// Rectangle sample points in the eigenframe, in units of the semi-axes:
/// centre, then the four corners counter-clockwise from `(+a, +b)`.
const RECT_POINTS: [(f64, f64); 5] = [(0.0, 0.0), (1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)];

/// Corner scale of the inner rectangle that marks a tip cell. An edge
/// walk covers about half an ellipse to either side of its path.
pub const TIP_SCALE: f64 = 0.5;

/// One candidate template.
#[derive(Debug, Clone)]
pub struct Cell {
    pub id: CellId,
    /// Cell this one was derived from; `None` for the seed.
    pub parent: Option<CellId>,
    pub t0: f64,
    pub t3: f64,
    pub metric: LocalMetric,
    /// Major semi-axis of the coverage ellipse.
    pub dx0: f64,
    /// Minor semi-axis of the coverage ellipse.
    pub dx1: f64,
    pub status: CellStatus,
    pub position: Position,
    /// Classification of the centre (slot 0) and the four rectangle corners.
    pub rect_position: [Position; 5],
    pub child: [Option<CellId>; MAX_NEIGHBOURS],
}

impl Cell {
    fn new(id: CellId, parent: Option<CellId>, t0: f64, t3: f64) -> Self {
        Self {
            id,
            parent,
            t0,
            t3,
            metric: LocalMetric::new(0.0, 1.0, 1.0),
            dx0: 0.0,
            dx1: 0.0,
            status: CellStatus::Fertile,
            position: Position::Out,
            rect_position: [Position::Out; 5],
            child: [None; MAX_NEIGHBOURS],
        }
    }

    /// Half-widths of the axis-aligned box enclosing the ellipse.
    pub fn extents(&self) -> (f64, f64) {
        let (s, c) = self.metric.theta.sin_cos();
        (
            self.dx0 * c.abs() + self.dx1 * s.abs(),
            self.dx0 * s.abs() + self.dx1 * c.abs(),
        )
    }

    /// Global coordinates of an eigenframe offset `(u, v)`.
    pub fn offset(&self, u: f64, v: f64) -> (f64, f64) {
        let (d0, d3) = self.metric.to_global(u, v);
        (self.t0 + d0, self.t3 + d3)
    }

    /// Distance to `(t0, t3)` in units of this cell's ellipse; 1.0 is
    /// the minimal-match contour.
    pub fn normalized_distance(&self, t0: f64, t3: f64) -> f64 {
        let (u, v) = self.metric.to_local(t0 - self.t0, t3 - self.t3);
        (u / self.dx0).hypot(v / self.dx1)
    }

    /// Number of rectangle corners classified as `position`.
    pub fn corner_count(&self, position: Position) -> usize {
        self.rect_position[1..].iter().filter(|&&p| p == position).count()
    }

    /// The sample points lie on both sides of the target region.
    pub fn straddles(&self) -> bool {
        self.rect_position.contains(&Position::Above) && self.rect_position.contains(&Position::Below)
    }
}

/// A lattice site proposed by [`CellRegistry::derive_neighbors`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub slot: usize,
    pub t0: f64,
    pub t3: f64,
}

/// Eigenframe offsets of the lattice neighbours of a cell.
pub fn neighbor_offsets(shape: LatticeShape, dx0: f64, dx1: f64) -> Vec<(f64, f64)> {
    let (n, step) = match shape {
        LatticeShape::Hexagonal => (6, PI / 3.0),
        LatticeShape::Square => (4, FRAC_PI_2),
    };
    let scale = shape.spacing();
    (0..n)
        .map(|k| {
            let (s, c) = (k as f64 * step).sin_cos();
            (scale * dx0 * c, scale * dx1 * s)
        })
        .collect()
}

/// Growable store of cells with a coarse spatial index.
pub struct CellRegistry {
    cells: Vec<Cell>,
    growth_events: usize,
    bucket: (f64, f64),
    index: HashMap<(i64, i64), Vec<CellId>>,
}

impl CellRegistry {
    /// `bucket` is the `(t0, t3)` size of a spatial-index bucket.
    pub fn new(bucket: (f64, f64)) -> BankResult<Self> {
        if !(bucket.0 > 0.0 && bucket.1 > 0.0 && bucket.0.is_finite() && bucket.1.is_finite()) {
            return Err(BankError::Numerical(format!(
                "spatial index bucket must be positive, got {bucket:?}"
            )));
        }
        Ok(Self {
            cells: Vec::new(),
            growth_events: 0,
            bucket,
            index: HashMap::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cells.capacity()
    }

    /// Number of batch reallocations so far.
    pub fn growth_events(&self) -> usize {
        self.growth_events
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Append a blank cell at `(t0, t3)` and return its id.
    pub fn allocate(&mut self, parent: Option<CellId>, t0: f64, t3: f64) -> BankResult<CellId> {
        if self.cells.len() == self.cells.capacity() {
            self.cells
                .try_reserve_exact(GROWTH_BATCH)
                .map_err(|_| BankError::Allocation {
                    requested: self.cells.len() + GROWTH_BATCH,
                })?;
            self.growth_events += 1;
        }
        let id = self.cells.len();
        self.cells.push(Cell::new(id, parent, t0, t3));
        Ok(id)
    }

    /// Evaluate the metric, classify, and index a freshly allocated cell.
    pub fn initialize(
        &mut self,
        id: CellId,
        oracle: &dyn MetricOracle,
        grid: &GridParams,
    ) -> BankResult<Position> {
        let (t0, t3) = (self[id].t0, self[id].t3);
        let position = if t0 > 0.0 && t3 > 0.0 {
            let metric = oracle.evaluate(t0, t3)?;
            let (dx0, dx1) = metric.semi_axes(grid.minimal_match())?;
            let cell = &mut self[id];
            cell.metric = metric;
            cell.dx0 = dx0;
            cell.dx1 = dx1;
            self.classify(id, grid)
        } else {
            let cell = &mut self[id];
            cell.position = Position::Out;
            cell.rect_position = [Position::Out; 5];
            Position::Out
        };
        self.index_insert(id);
        Ok(position)
    }

    /// Classify the centre and rectangle corners of a cell and set its
    /// `position`.
    ///
    /// A cell is `In` when any sample point is inside or when the points
    /// straddle the region; otherwise it takes the centre's class.
    pub fn classify(&mut self, id: CellId, grid: &GridParams) -> Position {
        let cell = &self[id];
        let (e0, e3) = cell.extents();
        let rect = if grid.in_bounds(cell.t0, cell.t3, e0, e3) {
            RECT_POINTS.map(|(u, v)| {
                let (t0, t3) = cell.offset(u * cell.dx0, v * cell.dx1);
                grid.classify_point(t0, t3)
            })
        } else {
            [Position::Out; 5]
        };

        let cell = &mut self[id];
        cell.rect_position = rect;
        cell.position = if rect.contains(&Position::In) || cell.straddles() {
            Position::In
        } else {
            rect[0]
        };
        cell.position
    }

    /// Whether the region narrows to less than the inner rectangle of
    /// `id`: its corners, scaled by [`TIP_SCALE`], fall both above and
    /// below the region.
    pub fn spans_tip(&self, id: CellId, grid: &GridParams) -> bool {
        let cell = &self[id];
        let mut above = false;
        let mut below = false;
        for &(u, v) in &RECT_POINTS[1..] {
            let (t0, t3) = cell.offset(TIP_SCALE * u * cell.dx0, TIP_SCALE * v * cell.dx1);
            match grid.classify_point(t0, t3) {
                Position::Above => above = true,
                Position::Below => below = true,
                _ => {}
            }
        }
        above && below
    }

    /// Lattice sites around `id` whose slots are still free and which
    /// fall inside the padded search rectangle.
    pub fn derive_neighbors(&self, id: CellId, grid: &GridParams) -> Vec<Neighbor> {
        let cell = &self[id];
        let (e0, e3) = cell.extents();
        neighbor_offsets(grid.lattice(), cell.dx0, cell.dx1)
            .into_iter()
            .enumerate()
            .filter(|&(slot, _)| cell.child[slot].is_none())
            .filter_map(|(slot, (u, v))| {
                let (t0, t3) = cell.offset(u, v);
                grid.in_bounds(t0, t3, e0, e3).then_some(Neighbor { slot, t0, t3 })
            })
            .collect()
    }

    /// Closest existing cell within `radius` of `(t0, t3)`, measured in
    /// the metric of `near`.
    pub fn find_near(&self, near: CellId, t0: f64, t3: f64, radius: f64) -> Option<CellId> {
        let cell = &self[near];
        let (e0, e3) = cell.extents();
        let (lo0, hi0) = (self.key0(t0 - radius * e0), self.key0(t0 + radius * e0));
        let (lo3, hi3) = (self.key3(t3 - radius * e3), self.key3(t3 + radius * e3));

        let mut best: Option<(CellId, f64)> = None;
        for k0 in lo0..=hi0 {
            for k3 in lo3..=hi3 {
                let Some(ids) = self.index.get(&(k0, k3)) else {
                    continue;
                };
                for &other in ids {
                    let candidate = &self[other];
                    let (u, v) = cell.metric.to_local(candidate.t0 - t0, candidate.t3 - t3);
                    let d = (u / cell.dx0).hypot(v / cell.dx1);
                    if d < best.map_or(radius, |(_, bd)| bd) {
                        best = Some((other, d));
                    }
                }
            }
        }
        best.map(|(other, _)| other)
    }

    /// Record `child` in `parent`'s `slot` and the back-link in the
    /// opposite slot of `child` when that slot is free.
    pub fn link(&mut self, parent: CellId, slot: usize, child: CellId, slots: usize) {
        self[parent].child[slot] = Some(child);
        let opposite = (slot + slots / 2) % slots;
        let back = &mut self[child].child[opposite];
        if back.is_none() {
            *back = Some(parent);
        }
    }

    /// Move a cell, keeping the spatial index consistent.
    pub fn relocate(&mut self, id: CellId, t0: f64, t3: f64) {
        self.index_remove(id);
        let cell = &mut self[id];
        cell.t0 = t0;
        cell.t3 = t3;
        self.index_insert(id);
    }

    // ---- Spatial index ----

    fn key0(&self, t0: f64) -> i64 {
        (t0 / self.bucket.0).floor() as i64
    }

    fn key3(&self, t3: f64) -> i64 {
        (t3 / self.bucket.1).floor() as i64
    }

    fn index_insert(&mut self, id: CellId) {
        let key = (self.key0(self[id].t0), self.key3(self[id].t3));
        self.index.entry(key).or_default().push(id);
    }

    fn index_remove(&mut self, id: CellId) {
        let key = (self.key0(self[id].t0), self.key3(self[id].t3));
        if let Some(ids) = self.index.get_mut(&key) {
            ids.retain(|&other| other != id);
        }
    }
}

impl Index<CellId> for CellRegistry {
    type Output = Cell;

    fn index(&self, id: CellId) -> &Cell {
        &self.cells[id]
    }
}

impl IndexMut<CellId> for CellRegistry {
    fn index_mut(&mut self, id: CellId) -> &mut Cell {
        &mut self.cells[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexabank_physics::UniformMetric;
    use hexabank_types::BankConfig;

    fn setup() -> (CellRegistry, GridParams, UniformMetric) {
        let grid = GridParams::from_config(&BankConfig::default()).unwrap();
        let oracle = UniformMetric::new(LocalMetric::new(0.7, 10.0, 400.0)).unwrap();
        (CellRegistry::new((0.1, 0.02)).unwrap(), grid, oracle)
    }

    fn interior(grid: &GridParams) -> (f64, f64) {
        grid.scale.chirp_times(2.5, 1.3)
    }

    #[test]
    fn test_ids_stable_across_growth() {
        let (mut reg, _, _) = setup();
        let first = reg.allocate(None, 1.25, 0.5).unwrap();
        reg[first].status = CellStatus::Sterile;
        for i in 0..(3 * GROWTH_BATCH + 7) {
            reg.allocate(Some(first), i as f64, 1.0).unwrap();
        }
        assert_eq!(reg.growth_events(), 4);
        assert_eq!(reg[first].id, first);
        assert!((reg[first].t0 - 1.25).abs() < 1e-15);
        assert_eq!(reg[first].status, CellStatus::Sterile);
        assert_eq!(reg.len(), 3 * GROWTH_BATCH + 8);
        assert!(reg.capacity() >= 4 * GROWTH_BATCH);
    }

    #[test]
    fn test_allocate_does_not_copy_parent() {
        let (mut reg, grid, oracle) = setup();
        let (t0, t3) = interior(&grid);
        let p = reg.allocate(None, t0, t3).unwrap();
        reg.initialize(p, &oracle, &grid).unwrap();
        let c = reg.allocate(Some(p), t0 + 0.1, t3).unwrap();
        assert_eq!(reg[c].parent, Some(p));
        assert_eq!(reg[c].dx0, 0.0);
        assert_eq!(reg[c].position, Position::Out);
        assert!(reg[c].child.iter().all(Option::is_none));
    }

    #[test]
    fn test_initialize_interior_cell() {
        let (mut reg, grid, oracle) = setup();
        let (t0, t3) = interior(&grid);
        let id = reg.allocate(None, t0, t3).unwrap();
        assert_eq!(reg.initialize(id, &oracle, &grid).unwrap(), Position::In);
        let cell = &reg[id];
        assert!((cell.dx0 - (0.03f64 / 10.0).sqrt()).abs() < 1e-12);
        assert!(cell.rect_position.iter().all(|&p| p == Position::In));
    }

    #[test]
    fn test_classify_far_outside() {
        let (mut reg, grid, oracle) = setup();
        let id = reg.allocate(None, 200.0, 5.0).unwrap();
        assert_eq!(reg.initialize(id, &oracle, &grid).unwrap(), Position::Out);
        assert!(reg[id].rect_position.iter().all(|&p| p == Position::Out));
    }

    #[test]
    fn test_classify_straddling_cell_is_in() {
        let (mut reg, grid, _) = setup();
        // Centre just below the equal-mass line, upper corners past the
        // light-mass edge.
        let wide = UniformMetric::new(LocalMetric::new(0.0, 3.0, 3.0)).unwrap();
        let t0 = 30.0;
        let t3 = grid.equal_mass_t3(t0) - 0.005;
        let id = reg.allocate(None, t0, t3).unwrap();
        reg.initialize(id, &wide, &grid).unwrap();
        let cell = &reg[id];
        assert_eq!(cell.rect_position[0], Position::Below);
        assert!(cell.straddles());
        assert_eq!(cell.corner_count(Position::In), 0);
        assert_eq!(cell.position, Position::In);
    }

    #[test]
    fn test_tip_needs_narrow_region() {
        let (mut reg, grid, _) = setup();
        let wide = UniformMetric::new(LocalMetric::new(0.0, 1.2, 1.2)).unwrap();
        // Near the light tip the region is thinner than half the ellipse.
        let t0 = grid.limits.x0_max - 0.5;
        let tip = reg.allocate(None, t0, grid.boundary_t3(t0)).unwrap();
        reg.initialize(tip, &wide, &grid).unwrap();
        assert!(reg[tip].straddles());
        assert!(reg.spans_tip(tip, &grid));

        // Where the region is widest the full rectangle still straddles,
        // the inner one does not.
        let t0 = 18.0;
        let mid = reg.allocate(None, t0, grid.equal_mass_t3(t0) + 0.01).unwrap();
        reg.initialize(mid, &wide, &grid).unwrap();
        assert_eq!(reg[mid].rect_position[0], Position::In);
        assert!(reg[mid].straddles());
        assert!(!reg.spans_tip(mid, &grid));
    }

    #[test]
    fn test_hexagonal_offsets_lie_on_scaled_ellipse() {
        let offs = neighbor_offsets(LatticeShape::Hexagonal, 2.0, 0.5);
        assert_eq!(offs.len(), 6);
        for (u, v) in offs {
            let r = (u / 2.0).hypot(v / 0.5);
            assert!((r - 3f64.sqrt()).abs() < 1e-12, "r={r}");
        }
        assert_eq!(neighbor_offsets(LatticeShape::Square, 1.0, 1.0).len(), 4);
    }

    #[test]
    fn test_derive_neighbors_skips_linked_slots() {
        let (mut reg, grid, oracle) = setup();
        let (t0, t3) = interior(&grid);
        let p = reg.allocate(None, t0, t3).unwrap();
        reg.initialize(p, &oracle, &grid).unwrap();
        assert_eq!(reg.derive_neighbors(p, &grid).len(), 6);
        let c = reg.allocate(Some(p), t0, t3).unwrap();
        reg.link(p, 2, c, 6);
        let slots: Vec<usize> = reg.derive_neighbors(p, &grid).iter().map(|n| n.slot).collect();
        assert_eq!(slots, vec![0, 1, 3, 4, 5]);
        assert_eq!(reg[c].child[5], Some(p));
    }

    #[test]
    fn test_find_near_and_relocate() {
        let (mut reg, grid, oracle) = setup();
        let (t0, t3) = interior(&grid);
        let a = reg.allocate(None, t0, t3).unwrap();
        reg.initialize(a, &oracle, &grid).unwrap();
        let (nt0, nt3) = reg[a].offset(reg[a].dx0 * 0.5, 0.0);
        let b = reg.allocate(Some(a), nt0, nt3).unwrap();
        reg.initialize(b, &oracle, &grid).unwrap();

        let (q0, q3) = reg[a].offset(reg[a].dx0 * 0.6, 0.0);
        assert_eq!(reg.find_near(a, q0, q3, 0.75), Some(b));
        let (far0, far3) = reg[a].offset(reg[a].dx0 * 3.0, 0.0);
        assert_eq!(reg.find_near(a, far0, far3, 0.75), None);

        reg.relocate(b, far0, far3);
        assert_eq!(reg.find_near(a, far0, far3, 0.75), Some(b));
        assert_eq!(reg.find_near(a, q0, q3, 0.75), Some(a));
    }

    #[test]
    fn test_corner_tally() {
        let mut cell = Cell::new(0, None, 1.0, 1.0);
        cell.rect_position = [
            Position::Below,
            Position::Above,
            Position::In,
            Position::Above,
            Position::Below,
        ];
        assert_eq!(cell.corner_count(Position::Above), 2);
        assert_eq!(cell.corner_count(Position::Below), 1);
        assert!(cell.straddles());
    }

    #[test]
    fn test_bad_bucket() {
        assert!(CellRegistry::new((0.0, 1.0)).is_err());
    }
}
