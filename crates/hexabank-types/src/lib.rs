// ─────────────────────────────────────────────────────────────────────
// Hexabank — Template Bank Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Configuration, error hierarchy and shared value types for the
//! hexabank template-bank generator.

pub mod config;
pub mod error;
pub mod template;

pub use config::{BankConfig, LatticeShape, MassRange, NoiseModel};
pub use error::{BankError, BankResult};
pub use template::{CellStatus, LocalMetric, Position, TemplateParams, TemplateRecord};
