//! Flat, serialisable record of one processed trigger, for export and transport.
//!
//! A [`TriggerOutcome`] holds maps and run-state clones that are awkward to ship across
//! a process boundary. [`TriggerRecord`] keeps only what offline tools consume, with
//! every optional value in the sink-facing sentinel encoding:
//!
//! ```text
//! ring_totals     [All, Central, Inner, Middle, Outer], −1 = no data
//! module_sums     24 values, 0 = no signal, −1 = lone readout
//! beta_time       −100 when untagged
//! time            −1 when the calorimeter was empty
//! ```
//!
//! # no_std
//!
//! This module requires the `serde` feature and only uses `alloc`.
//!
//! [`TriggerOutcome`]: crate::processor::TriggerOutcome

use alloc::vec::Vec;

use crate::coincidence::Coincidence;
use crate::processor::TriggerOutcome;
use crate::ring::NO_DATA;
use crate::warning::DataQualityWarning;

/// Current record layout version.
pub const TRIGGER_RECORD_VERSION: u16 = 1;

/// Phase flags as they stood after the trigger.
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseFlags {
    /// Tape moving.
    pub tape_move: bool,
    /// Measuring.
    pub measure: bool,
    /// Background window.
    pub background: bool,
    /// Light pulser firing.
    pub light_pulser: bool,
    /// Irradiating.
    pub irradiation: bool,
}

/// One processed trigger in flat form.
///
/// # Example
///
/// ```rust,ignore
/// use mtas_core::record::TriggerRecord;
///
/// let record = TriggerRecord::from(&outcome);
/// let json = serde_json::to_string(&record).unwrap();
/// let restored: TriggerRecord = serde_json::from_str(&json).unwrap();
/// ```
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct TriggerRecord {
    /// Layout version, [`TRIGGER_RECORD_VERSION`] for new records.
    pub version: u16,
    /// Position of the trigger in its run.
    pub index: u64,
    /// Trigger time in seconds.
    pub time: f64,
    /// Cycle counter after the trigger.
    pub cycle_number: u32,
    /// Composite logic word.
    pub logic_mask: u16,
    /// Phase after the trigger.
    pub phase: PhaseFlags,
    /// Beta tag.
    pub beta_tagged: bool,
    /// Beta time in seconds.
    pub beta_time: f64,
    /// Ring totals.
    pub ring_totals: [f64; 5],
    /// Module sums.
    pub module_sums: Vec<f64>,
    /// Central readouts seen.
    pub central_multiplicity: usize,
    /// Pairs emitted by the classifiers.
    pub coincidences: Vec<Coincidence>,
    /// Data-quality warnings raised.
    pub warnings: Vec<DataQualityWarning>,
}

impl From<&TriggerOutcome> for TriggerRecord {
    fn from(outcome: &TriggerOutcome) -> Self {
        let phase = &outcome.phase;
        Self {
            version: TRIGGER_RECORD_VERSION,
            index: outcome.index,
            time: outcome.timing.time.unwrap_or(NO_DATA),
            cycle_number: phase.cycle_number,
            logic_mask: outcome.logic.bits(),
            phase: PhaseFlags {
                tape_move: phase.tape_move,
                measure: phase.measure,
                background: phase.background,
                light_pulser: phase.light_pulser,
                irradiation: phase.irradiation,
            },
            beta_tagged: outcome.beta.is_tagged(),
            beta_time: outcome.beta.time_or_untagged(),
            ring_totals: outcome.rings.totals.to_array(),
            module_sums: outcome.rings.modules.values(),
            central_multiplicity: outcome.rings.central_multiplicity,
            coincidences: outcome.coincidences.coincidences.iter().copied().collect(),
            warnings: outcome.warnings.clone(),
        }
    }
}

impl TriggerRecord {
    /// Whether any classifier fired.
    pub fn has_coincidence(&self) -> bool {
        !self.coincidences.is_empty()
    }
}
