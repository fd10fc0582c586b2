// ─────────────────────────────────────────────────────────────────────
// Hexabank — PyO3 FFI Bindings
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
// Note: #[deny(unsafe_code)] not applied. PyO3 proc macros generate
// unsafe blocks internally. All hand-written code in this crate is safe.
//! Python-callable wrappers around the hexabank generator.
//!
//! # FFI Safety
//!
//! - Bank generation runs with the GIL released; a Python metric
//!   callback re-acquires it via `Python::with_gil` per evaluation.
//! - A failing or malformed callback aborts the run with `ValueError`.
//! - All config validated before storage (`BankConfig::validate()`).
//!
//! Install: `pip install -e crates/hexabank-ffi` (requires maturin).
//!
//! Usage from Python:
//! ```python
//! from hexabank import BankConfig, generate_bank
//!
//! bank = generate_bank(BankConfig(min_mass=1.0, max_mass=3.0, minimal_match=0.97))
//! print(len(bank), bank[0]["mass1"], bank[0]["t0"])
//! ```

use std::sync::Arc;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;

use hexabank_core::generate_bank_with;
use hexabank_physics::{checked_boundary_t3, ChirpScale, ExternalMetric, MetricOracle, PnMetric};
use hexabank_types::{BankConfig, BankError, LatticeShape, LocalMetric, MassRange, NoiseModel};

fn to_py_err(e: BankError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn parse_mass_range(name: &str) -> PyResult<MassRange> {
    match name {
        "min_max_component_mass" => Ok(MassRange::MinMaxComponentMass),
        "min_component_mass_max_total_mass" => Ok(MassRange::MinComponentMassMaxTotalMass),
        "min_max_component_total_mass" => Ok(MassRange::MinMaxComponentTotalMass),
        other => Err(PyValueError::new_err(format!("unknown mass_range '{other}'"))),
    }
}

fn parse_lattice(name: &str) -> PyResult<LatticeShape> {
    match name {
        "hexagonal" => Ok(LatticeShape::Hexagonal),
        "square" => Ok(LatticeShape::Square),
        other => Err(PyValueError::new_err(format!("unknown lattice '{other}'"))),
    }
}

fn parse_noise(name: &str) -> PyResult<NoiseModel> {
    match name {
        "initial_ligo" => Ok(NoiseModel::InitialLigo),
        "advanced_ligo" => Ok(NoiseModel::AdvancedLigo),
        "white" => Ok(NoiseModel::White),
        other => Err(PyValueError::new_err(format!("unknown noise model '{other}'"))),
    }
}

// ─── PyBankConfig ───────────────────────────────────────────────────

/// Python-visible bank configuration.
#[pyclass(name = "BankConfig")]
#[derive(Clone)]
struct PyBankConfig {
    inner: BankConfig,
}

#[pymethods]
impl PyBankConfig {
    #[new]
    #[pyo3(signature = (
        min_mass = 1.0,
        max_mass = 3.0,
        min_total_mass = 2.0,
        max_total_mass = 6.0,
        eta_min = 0.0,
        f_lower = 40.0,
        f_upper = 2048.0,
        minimal_match = 0.97,
        mass_range = "min_max_component_mass",
        lattice = "hexagonal",
        noise = "initial_ligo",
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        min_mass: f64,
        max_mass: f64,
        min_total_mass: f64,
        max_total_mass: f64,
        eta_min: f64,
        f_lower: f64,
        f_upper: f64,
        minimal_match: f64,
        mass_range: &str,
        lattice: &str,
        noise: &str,
    ) -> PyResult<Self> {
        let config = BankConfig {
            min_mass,
            max_mass,
            min_total_mass,
            max_total_mass,
            eta_min,
            f_lower,
            f_upper,
            minimal_match,
            mass_range: parse_mass_range(mass_range)?,
            lattice: parse_lattice(lattice)?,
            noise: parse_noise(noise)?,
        };
        config.validate().map_err(to_py_err)?;
        Ok(Self { inner: config })
    }

    /// Construct from JSON string.
    #[staticmethod]
    fn from_json(json: &str) -> PyResult<Self> {
        let config = BankConfig::from_json(json).map_err(to_py_err)?;
        config.validate().map_err(to_py_err)?;
        Ok(Self { inner: config })
    }

    #[getter]
    fn minimal_match(&self) -> f64 {
        self.inner.minimal_match
    }

    #[getter]
    fn f_lower(&self) -> f64 {
        self.inner.f_lower
    }

    fn __repr__(&self) -> String {
        format!(
            "BankConfig(min_mass={}, max_mass={}, f_lower={}, minimal_match={}, lattice={:?})",
            self.inner.min_mass,
            self.inner.max_mass,
            self.inner.f_lower,
            self.inner.minimal_match,
            self.inner.lattice
        )
    }
}

// ─── Bank generation ────────────────────────────────────────────────

/// Generate a template bank.
///
/// Args:
///     config: BankConfig; defaults are used when omitted.
///     metric: Optional Callable[[float, float], tuple[float, float, float]]
///             mapping (t0, t3) to (theta, g00, g11). If None, the
///             built-in 2PN metric for `config.noise` is used.
///
/// Returns:
///     List of template dicts, ordered by id.
#[pyfunction]
#[pyo3(signature = (config = None, metric = None))]
fn generate_bank<'py>(
    py: Python<'py>,
    config: Option<PyBankConfig>,
    metric: Option<PyObject>,
) -> PyResult<Vec<Bound<'py, PyDict>>> {
    let cfg = config.map(|c| c.inner).unwrap_or_default();

    let oracle: Arc<dyn MetricOracle> = match metric {
        Some(cb) => Arc::new(ExternalMetric::new(move |t0: f64, t3: f64| {
            Python::with_gil(|py| {
                cb.call1(py, (t0, t3))
                    .and_then(|result| result.extract::<(f64, f64, f64)>(py))
                    .map(|(theta, g00, g11)| LocalMetric::new(theta, g00, g11))
                    .map_err(|e| BankError::Oracle(e.to_string()))
            })
        })),
        None => Arc::new(PnMetric::from_config(&cfg).map_err(to_py_err)?),
    };

    let bank = py
        .allow_threads(|| generate_bank_with(&cfg, oracle))
        .map_err(to_py_err)?;

    bank.templates
        .iter()
        .map(|t| -> PyResult<Bound<'py, PyDict>> {
            let dict = PyDict::new(py);
            dict.set_item("id", t.id)?;
            dict.set_item("mass1", t.params.mass1)?;
            dict.set_item("mass2", t.params.mass2)?;
            dict.set_item("total_mass", t.params.total_mass)?;
            dict.set_item("eta", t.params.eta)?;
            dict.set_item("chirp_mass", t.params.chirp_mass)?;
            dict.set_item("t0", t.params.t0)?;
            dict.set_item("t3", t.params.t3)?;
            dict.set_item("f_lower", t.params.f_lower)?;
            dict.set_item("theta", t.metric.theta)?;
            dict.set_item("g00", t.metric.g00)?;
            dict.set_item("g11", t.metric.g11)?;
            dict.set_item("dx0", t.dx0)?;
            dict.set_item("dx1", t.dx1)?;
            Ok(dict)
        })
        .collect()
}

/// Chirp times `(t0, t3)` of a binary.
#[pyfunction]
#[pyo3(signature = (mass1, mass2, f_lower = 40.0))]
fn chirp_times(mass1: f64, mass2: f64, f_lower: f64) -> PyResult<(f64, f64)> {
    if !(mass1 > 0.0 && mass2 > 0.0 && f_lower > 0.0) {
        return Err(PyValueError::new_err("masses and f_lower must be > 0"));
    }
    Ok(ChirpScale::new(f_lower).chirp_times(mass1, mass2))
}

/// `t3` of the covering-region lower boundary at `t0`.
#[pyfunction]
#[pyo3(signature = (t0, min_mass, max_mass, f_lower = 40.0))]
fn boundary_t3(t0: f64, min_mass: f64, max_mass: f64, f_lower: f64) -> PyResult<f64> {
    checked_boundary_t3(t0, f_lower, min_mass, max_mass).map_err(to_py_err)
}

// ─── Module Registration ────────────────────────────────────────────

/// Hexabank — hexagonal template-bank placement in chirp-time space.
///
/// - `BankConfig` — configuration
/// - `generate_bank` — full bank generation
/// - `chirp_times`, `boundary_t3` — geometry helpers
#[pymodule]
fn hexabank(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyBankConfig>()?;
    m.add_function(wrap_pyfunction!(generate_bank, m)?)?;
    m.add_function(wrap_pyfunction!(chirp_times, m)?)?;
    m.add_function(wrap_pyfunction!(boundary_t3, m)?)?;
    Ok(())
}
