//! Python FFI bindings via PyO3.
//!
//! Exposes the trigger processor to offline analysis scripts. Hits cross the boundary
//! as `(subtype, energy, cal_energy, time, location)` tuples, one list per family.
//!
//! # Building the Python extension
//!
//! ```bash
//! pip install maturin
//! maturin develop --features python-ffi
//! ```
//!
//! # Usage
//!
//! ```python
//! from mtas_core import ProcessorConfig, TriggerProcessor
//!
//! proc = TriggerProcessor(ProcessorConfig(beta_threshold=2.0))
//! central = [(f"C{i}", 120.0, 120.0, 1.0, i) for i in range(1, 13)]
//! r1 = proc.process(calorimeter=central, silicon=[("T1", 2500.0, 2500.0, 1.0, 1)])
//! r2 = proc.process(calorimeter=[("I1", 200.0, 200.0, 1.0 + 4e-6, 13)])
//! print(r2.coincidences)   # [("beta-non-beta", 400.0, [...], [...])]
//! print(proc.cycle_number)
//! ```

#![allow(non_snake_case)]

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::channel::{ChannelEvent, Family};
use crate::coincidence::ClassifierKind;
use crate::config::ProcessorConfig as RustProcessorConfig;
use crate::processor::{Trigger, TriggerOutcome, TriggerProcessor as RustTriggerProcessor};
use crate::sink::NullSink;

/// `(subtype, energy, cal_energy, time, location)` as passed from Python.
type PyHit = (String, f64, f64, f64, i32);

fn kind_name(kind: ClassifierKind) -> &'static str {
    match kind {
        ClassifierKind::BetaBeta => "beta-beta",
        ClassifierKind::BetaNonBeta => "beta-non-beta",
        ClassifierKind::AnyAny => "any-any",
        ClassifierKind::FirstBetaOnly => "first-beta-only",
    }
}

// ── ProcessorConfig ──────────────────────────────────────────────────────────

/// Processor thresholds. Unset arguments keep the production defaults.
#[pyclass(name = "ProcessorConfig")]
#[derive(Clone)]
pub struct PyProcessorConfig {
    inner: RustProcessorConfig,
}

#[pymethods]
impl PyProcessorConfig {
    /// Create a configuration.
    ///
    /// Args:
    ///     energy_ceiling:       upper raw-energy bound for every filtered family (default 30000)
    ///     silicon_energy_floor: lower raw-energy bound for silicon (default 200)
    ///     beta_threshold:       calibrated silicon energy for a beta tag (default 2.0)
    ///     logic_threshold:      raw energy a logic pulse must exceed (default 1.0)
    #[new]
    #[pyo3(signature = (energy_ceiling=30000.0, silicon_energy_floor=200.0, beta_threshold=2.0, logic_threshold=1.0))]
    pub fn new(energy_ceiling: f64, silicon_energy_floor: f64, beta_threshold: f64, logic_threshold: f64) -> Self {
        Self {
            inner: RustProcessorConfig {
                energy_ceiling,
                silicon_energy_floor,
                beta_threshold,
                logic_threshold,
                ..RustProcessorConfig::default()
            },
        }
    }

    /// Beta-tag threshold.
    #[getter]
    pub fn beta_threshold(&self) -> f64 {
        self.inner.beta_threshold
    }

    /// Number of calorimeter modules.
    #[getter]
    pub fn module_count(&self) -> usize {
        self.inner.module_count
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "ProcessorConfig(energy_ceiling={}, silicon_energy_floor={}, beta_threshold={}, logic_threshold={})",
            self.inner.energy_ceiling,
            self.inner.silicon_energy_floor,
            self.inner.beta_threshold,
            self.inner.logic_threshold,
        )
    }
}

// ── TriggerResult ────────────────────────────────────────────────────────────

/// Result of one processed trigger, in sink-facing encoding.
#[pyclass(name = "TriggerResult")]
pub struct PyTriggerResult {
    outcome: TriggerOutcome,
}

#[pymethods]
impl PyTriggerResult {
    /// Ring totals `[All, Central, Inner, Middle, Outer]`, −1 for no data.
    #[getter]
    pub fn ring_totals(&self) -> [f64; 5] {
        self.outcome.rings.totals.to_array()
    }

    /// Module sums, 0 for no signal and −1 for a lone readout.
    #[getter]
    pub fn module_sums(&self) -> Vec<f64> {
        self.outcome.rings.modules.values()
    }

    /// Whether the silicon tagged a beta.
    #[getter]
    pub fn beta_tagged(&self) -> bool {
        self.outcome.beta.is_tagged()
    }

    /// Beta time, −100 when untagged.
    #[getter]
    pub fn beta_time(&self) -> f64 {
        self.outcome.beta.time_or_untagged()
    }

    /// Composite logic word.
    #[getter]
    pub fn logic_mask(&self) -> u16 {
        self.outcome.logic.bits()
    }

    /// Emitted pairs as `(classifier, gap_ns, first_totals, second_totals)`.
    #[getter]
    pub fn coincidences(&self) -> Vec<(&'static str, f64, [f64; 5], [f64; 5])> {
        self.outcome
            .coincidences
            .coincidences
            .iter()
            .map(|c| (kind_name(c.kind), c.gap_ns, c.first.to_array(), c.second.to_array()))
            .collect()
    }

    /// Data-quality warnings as messages.
    #[getter]
    pub fn warnings(&self) -> Vec<String> {
        self.outcome.warnings.iter().map(|w| w.to_string()).collect()
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!(
            "TriggerResult(index={}, beta_tagged={}, coincidences={})",
            self.outcome.index,
            self.outcome.beta.is_tagged(),
            self.outcome.coincidences.coincidences.len(),
        )
    }
}

// ── TriggerProcessor ─────────────────────────────────────────────────────────

/// Stateful per-run trigger processor.
///
/// Triggers must be fed one at a time in acquisition order.
#[pyclass(name = "TriggerProcessor")]
pub struct PyTriggerProcessor {
    inner: RustTriggerProcessor,
}

#[pymethods]
impl PyTriggerProcessor {
    /// Start a run. Raises ValueError for an invalid configuration.
    #[new]
    #[pyo3(signature = (config=None))]
    pub fn new(config: Option<&PyProcessorConfig>) -> PyResult<Self> {
        let cfg = config.map(|c| c.inner.clone()).unwrap_or_default();
        let inner = RustTriggerProcessor::new(cfg).map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(Self { inner })
    }

    /// Process one trigger.
    ///
    /// Args:
    ///     calorimeter, silicon, germanium, sipm, reference, logic:
    ///         lists of (subtype, energy, cal_energy, time, location) tuples
    #[pyo3(signature = (calorimeter=Vec::new(), silicon=Vec::new(), germanium=Vec::new(), sipm=Vec::new(), reference=Vec::new(), logic=Vec::new()))]
    pub fn process(
        &mut self,
        calorimeter: Vec<PyHit>,
        silicon: Vec<PyHit>,
        germanium: Vec<PyHit>,
        sipm: Vec<PyHit>,
        reference: Vec<PyHit>,
        logic: Vec<PyHit>,
    ) -> PyTriggerResult {
        let mut trigger = Trigger::new();
        for (family, hits) in [
            (Family::Calorimeter, calorimeter),
            (Family::Silicon, silicon),
            (Family::Germanium, germanium),
            (Family::Sipm, sipm),
            (Family::Reference, reference),
            (Family::Logic, logic),
        ] {
            for (subtype, energy, cal_energy, time, location) in hits {
                trigger.push(family, ChannelEvent::new(subtype, energy, time, location).with_cal_energy(cal_energy));
            }
        }
        PyTriggerResult { outcome: self.inner.process(&trigger.input(), NullSink) }
    }

    /// Cycle triggers seen so far.
    #[getter]
    pub fn cycle_number(&self) -> u32 {
        self.inner.context().phase.cycle_number
    }

    /// Phase flags `(tape_move, measure, background, light_pulser, irradiation)`.
    #[getter]
    pub fn phase(&self) -> (bool, bool, bool, bool, bool) {
        let p = &self.inner.context().phase;
        (p.tape_move, p.measure, p.background, p.light_pulser, p.irradiation)
    }

    /// Triggers processed in this run.
    #[getter]
    pub fn triggers_processed(&self) -> u64 {
        self.inner.context().triggers_processed
    }

    /// Drop all run state.
    pub fn reset_run(&mut self) {
        self.inner.reset_run();
    }

    /// Python repr string.
    pub fn __repr__(&self) -> String {
        format!("TriggerProcessor(triggers_processed={})", self.inner.context().triggers_processed)
    }
}

// ── Module entry point ────────────────────────────────────────────────────────

/// MTAS trigger-processing core Python bindings.
#[pymodule]
pub fn mtas_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyProcessorConfig>()?;
    m.add_class::<PyTriggerResult>()?;
    m.add_class::<PyTriggerProcessor>()?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
