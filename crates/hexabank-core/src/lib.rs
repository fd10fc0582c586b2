// ─────────────────────────────────────────────────────────────────────
// Hexabank — Template Bank Placement
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Hexagonal template-bank placement in the (t0, t3) chirp-time plane.
//!
//! Components:
//! - `GridParams` — per-run geometry and the region predicate
//! - `CellRegistry` — id-addressed arena of placement cells
//! - `FertilityQueue` — worklist of cells still able to spawn
//! - `LatticeEngine` — breadth-first lattice growth, edge walks and
//!   compaction
//! - `generate_bank` — the whole pipeline in one call

pub mod bank;
pub mod compactor;
pub mod edge;
pub mod fertility;
pub mod grid;
pub mod lattice;
pub mod registry;

pub use bank::{generate_bank, generate_bank_with, BankStats, TemplateBank};
pub use compactor::CorrectionStats;
pub use edge::{EdgeWalk, WalkDirection};
pub use fertility::FertilityQueue;
pub use grid::GridParams;
pub use lattice::{EdgePair, LatticeEngine, PropagationStats};
pub use registry::{Cell, CellId, CellRegistry};
