// ─────────────────────────────────────────────────────────────────────
// Hexabank — Bank Generation
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! One-call entry point: configuration in, ordered template list out.
//!
//! Pipeline: seed → propagate → terminal edges → edge walks →
//! below-line correction → compaction. Any fatal error aborts the run;
//! no partial bank is returned.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use hexabank_physics::{MetricOracle, PnMetric};
use hexabank_types::{BankConfig, BankResult, TemplateRecord};

use crate::grid::GridParams;
use crate::lattice::LatticeEngine;

/// Run summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BankStats {
    pub cells_allocated: usize,
    pub growth_events: usize,
    pub passes: usize,
    pub links_reused: usize,
    pub sites_tightened: usize,
    pub upper_walk_cells: usize,
    pub lower_walk_cells: usize,
    pub corrected_cells: usize,
    pub promoted_cells: usize,
    pub suppressed_children: usize,
    pub templates: usize,
}

/// Final template bank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateBank {
    pub config: BankConfig,
    pub templates: Vec<TemplateRecord>,
    pub stats: BankStats,
}

impl TemplateBank {
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// Generate a bank using the built-in 2PN metric for `config.noise`.
pub fn generate_bank(config: &BankConfig) -> BankResult<TemplateBank> {
    config.validate()?;
    let oracle = Arc::new(PnMetric::from_config(config)?);
    generate_bank_with(config, oracle)
}

/// Generate a bank with a caller-supplied metric oracle.
pub fn generate_bank_with(
    config: &BankConfig,
    oracle: Arc<dyn MetricOracle>,
) -> BankResult<TemplateBank> {
    let grid = GridParams::from_config(config)?;
    log::info!(
        "bank: t0 in [{:.4}, {:.4}], t3 in [{:.4}, {:.4}], mm={}",
        grid.limits.x0_min,
        grid.limits.x0_max,
        grid.limits.x1_min,
        grid.limits.x1_max,
        config.minimal_match
    );

    let mut engine = LatticeEngine::new(grid, oracle)?;
    engine.propagate()?;
    let edges = engine.terminal_edges()?;
    let (upper, lower) = engine.refine_edges(edges)?;
    let correction = engine.correct_below_line()?;
    let templates = engine.compact()?;

    let propagation = engine.stats();
    let stats = BankStats {
        cells_allocated: engine.registry().len(),
        growth_events: engine.registry().growth_events(),
        passes: propagation.passes,
        links_reused: propagation.links_reused,
        sites_tightened: propagation.sites_tightened,
        upper_walk_cells: upper.cells.len(),
        lower_walk_cells: lower.cells.len(),
        corrected_cells: correction.corrected,
        promoted_cells: correction.promoted,
        suppressed_children: correction.suppressed_children,
        templates: templates.len(),
    };
    log::info!(
        "bank: {} templates from {} cells",
        stats.templates,
        stats.cells_allocated
    );
    Ok(TemplateBank {
        config: config.clone(),
        templates,
        stats,
    })
}
