// ─────────────────────────────────────────────────────────────────────
// Hexabank — Error Hierarchy
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all template-bank failures.
#[derive(Error, Debug)]
pub enum BankError {
    /// Malformed run configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The cell registry could not grow its backing store.
    #[error("allocation error: could not reserve {requested} cells")]
    Allocation { requested: usize },

    /// Propagation ended with the wrong number of Edge cells.
    #[error("edge invariant violated: expected 2 edge cells, found {found}")]
    EdgeCount { found: usize },

    /// A post-propagation pass ran while fertile cells were still queued.
    #[error("fertility queue not empty: {remaining} cells remain")]
    QueueNotEmpty { remaining: usize },

    /// Edge refinement did not leave the t0 range within its step budget.
    #[error("edge walk did not terminate after {steps} steps")]
    EdgeWalk { steps: usize },

    /// Root finder was handed an interval without a sign change.
    #[error("root not bracketed in [{xmin}, {xmax}]")]
    Bracket { xmin: f64, xmax: f64 },

    /// Numerical error (NaN/Inf, indefinite metric).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// A caller-supplied metric oracle failed.
    #[error("metric oracle error: {0}")]
    Oracle(String),
}

pub type BankResult<T> = Result<T, BankError>;
