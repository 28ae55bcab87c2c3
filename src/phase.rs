/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Acquisition phase driven by logic pulses.
//!
//! - [`LogicPulse`]: the eleven named pulses on the logic lines.
//! - [`LogicMask`]: composite diagnostic word of the pulses seen in one trigger.
//! - [`AcquisitionPhase`]: five run-long phase flags, cycle counter and cycle reference time.
//! - [`PhaseStateMachine`]: applies one trigger's pulses to the phase.
//!
//! # Transition rule
//!
//! Categories are updated in the fixed order tape, measurement, background, light pulser,
//! irradiation. For each one:
//!
//! ```text
//! on && off seen      → SameEventConflict (logged)
//! on seen && already on → MissingOffSignal (logged)
//! on seen             → phase = true
//! off seen            → phase = false      (evaluated last: off wins)
//! ```
//!
//! # Invariants
//!
//! - The phase lives for the whole run and is only mutated here.
//! - The cycle counter is monotonic; every accepted `TRU` adds exactly one.

use alloc::vec::Vec;
use core::fmt;

use crate::config::ProcessorConfig;
use crate::signal_map::SignalMap;
use crate::warning::{raise, DataQualityWarning};

// ─── LogicPulse ──────────────────────────────────────────────────────────────

/// Named pulse on the logic lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicPulse {
    /// `TRU`: cycle trigger.
    Trigger,
    /// `IRU`: irradiation starts.
    IrradiationOn,
    /// `IRD`: irradiation ends.
    IrradiationOff,
    /// `LPU`: light pulser starts.
    LightPulserOn,
    /// `LPD`: light pulser ends.
    LightPulserOff,
    /// `TMU`: tape starts moving.
    TapeMoveOn,
    /// `TMD`: tape stops.
    TapeMoveOff,
    /// `BGU`: background window starts.
    BackgroundOn,
    /// `BGD`: background window ends.
    BackgroundOff,
    /// `MSU`: measurement window starts.
    MeasureOn,
    /// `MSD`: measurement window ends.
    MeasureOff,
}

impl LogicPulse {
    /// Every pulse in mask-bit order.
    pub const ALL: [LogicPulse; 11] = [
        LogicPulse::Trigger,
        LogicPulse::IrradiationOn,
        LogicPulse::IrradiationOff,
        LogicPulse::LightPulserOn,
        LogicPulse::LightPulserOff,
        LogicPulse::TapeMoveOn,
        LogicPulse::TapeMoveOff,
        LogicPulse::BackgroundOn,
        LogicPulse::BackgroundOff,
        LogicPulse::MeasureOn,
        LogicPulse::MeasureOff,
    ];

    /// Pulse named by a logic subtype.
    pub fn from_subtype(subtype: &str) -> Option<LogicPulse> {
        LogicPulse::ALL.iter().copied().find(|p| p.subtype() == subtype)
    }

    /// Subtype key of this pulse.
    pub fn subtype(&self) -> &'static str {
        match self {
            LogicPulse::Trigger => "TRU",
            LogicPulse::IrradiationOn => "IRU",
            LogicPulse::IrradiationOff => "IRD",
            LogicPulse::LightPulserOn => "LPU",
            LogicPulse::LightPulserOff => "LPD",
            LogicPulse::TapeMoveOn => "TMU",
            LogicPulse::TapeMoveOff => "TMD",
            LogicPulse::BackgroundOn => "BGU",
            LogicPulse::BackgroundOff => "BGD",
            LogicPulse::MeasureOn => "MSU",
            LogicPulse::MeasureOff => "MSD",
        }
    }

    /// Diagnostic bit: `TRU` = 1, `IRU` = 2, … `MSD` = 1024.
    pub fn bit(&self) -> u16 {
        let pos = LogicPulse::ALL.iter().position(|p| p == self).unwrap_or(0);
        1 << pos
    }
}

/// Pulses seen in one trigger, as the composite diagnostic word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LogicMask(u16);

impl LogicMask {
    /// No pulse seen.
    pub const EMPTY: LogicMask = LogicMask(0);

    /// Raw diagnostic word.
    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Whether `pulse` was seen.
    pub fn contains(&self, pulse: LogicPulse) -> bool {
        self.0 & pulse.bit() != 0
    }

    /// Record `pulse`.
    pub fn insert(&mut self, pulse: LogicPulse) {
        self.0 |= pulse.bit();
    }

    /// `true` when no pulse was seen.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

// ─── PhaseCategory ───────────────────────────────────────────────────────────

/// One on/off phase tracked by the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhaseCategory {
    /// Tape movement.
    TapeMove,
    /// Global measurement window.
    Measure,
    /// Background window.
    Background,
    /// Light-pulser calibration.
    LightPulser,
    /// Beam irradiation.
    Irradiation,
}

impl PhaseCategory {
    /// Categories in the order their transitions are applied.
    pub const ORDER: [PhaseCategory; 5] = [
        PhaseCategory::TapeMove,
        PhaseCategory::Measure,
        PhaseCategory::Background,
        PhaseCategory::LightPulser,
        PhaseCategory::Irradiation,
    ];

    /// Pulse that switches this category on.
    pub fn on_pulse(&self) -> LogicPulse {
        match self {
            PhaseCategory::TapeMove => LogicPulse::TapeMoveOn,
            PhaseCategory::Measure => LogicPulse::MeasureOn,
            PhaseCategory::Background => LogicPulse::BackgroundOn,
            PhaseCategory::LightPulser => LogicPulse::LightPulserOn,
            PhaseCategory::Irradiation => LogicPulse::IrradiationOn,
        }
    }

    /// Pulse that switches this category off.
    pub fn off_pulse(&self) -> LogicPulse {
        match self {
            PhaseCategory::TapeMove => LogicPulse::TapeMoveOff,
            PhaseCategory::Measure => LogicPulse::MeasureOff,
            PhaseCategory::Background => LogicPulse::BackgroundOff,
            PhaseCategory::LightPulser => LogicPulse::LightPulserOff,
            PhaseCategory::Irradiation => LogicPulse::IrradiationOff,
        }
    }
}

impl fmt::Display for PhaseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PhaseCategory::TapeMove => "tape movement",
            PhaseCategory::Measure => "measurement",
            PhaseCategory::Background => "background",
            PhaseCategory::LightPulser => "light pulser",
            PhaseCategory::Irradiation => "irradiation",
        })
    }
}

// ─── AcquisitionPhase ────────────────────────────────────────────────────────

/// Run-long acquisition state.
///
/// A fresh run starts measuring with every other category off and the cycle counter
/// at zero.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AcquisitionPhase {
    /// Tape is moving.
    pub tape_move: bool,
    /// Inside the measurement window.
    pub measure: bool,
    /// Inside the background window.
    pub background: bool,
    /// Light pulser is firing.
    pub light_pulser: bool,
    /// Beam is on target.
    pub irradiation: bool,
    /// Cycle triggers seen so far.
    pub cycle_number: u32,
    /// Timestamp of the most recent cycle trigger.
    pub cycle_reference_time: Option<f64>,
}

impl AcquisitionPhase {
    /// State at the start of a run.
    pub fn new() -> Self {
        Self {
            tape_move: false,
            measure: true,
            background: false,
            light_pulser: false,
            irradiation: false,
            cycle_number: 0,
            cycle_reference_time: None,
        }
    }

    /// Flag for `category`.
    pub fn is_on(&self, category: PhaseCategory) -> bool {
        match category {
            PhaseCategory::TapeMove => self.tape_move,
            PhaseCategory::Measure => self.measure,
            PhaseCategory::Background => self.background,
            PhaseCategory::LightPulser => self.light_pulser,
            PhaseCategory::Irradiation => self.irradiation,
        }
    }

    fn set(&mut self, category: PhaseCategory, on: bool) {
        match category {
            PhaseCategory::TapeMove => self.tape_move = on,
            PhaseCategory::Measure => self.measure = on,
            PhaseCategory::Background => self.background = on,
            PhaseCategory::LightPulser => self.light_pulser = on,
            PhaseCategory::Irradiation => self.irradiation = on,
        }
    }

    /// Measuring with the tape at rest and no light pulser.
    pub fn is_counting(&self) -> bool {
        self.measure && !self.light_pulser && !self.tape_move
    }

    /// Regular decay measurement: counting and outside the background window.
    pub fn is_regular_measurement(&self) -> bool {
        self.is_counting() && !self.background
    }

    /// Background measurement: counting inside the background window.
    pub fn is_background_measurement(&self) -> bool {
        self.is_counting() && self.background
    }

    /// Time since the latest cycle trigger, if one has been seen.
    pub fn cycle_time(&self, time: f64) -> Option<f64> {
        self.cycle_reference_time.map(|r| time - r)
    }
}

impl Default for AcquisitionPhase {
    fn default() -> Self {
        Self::new()
    }
}

// ─── PhaseStateMachine ───────────────────────────────────────────────────────

/// Applies one trigger's logic pulses to the run phase.
#[derive(Clone, Debug)]
pub struct PhaseStateMachine {
    threshold: f64,
}

impl PhaseStateMachine {
    /// State machine using `config.logic_threshold`.
    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self { threshold: config.logic_threshold }
    }

    /// Scan the logic map, then apply the category transitions.
    ///
    /// Returns the pulses accepted in this trigger.
    pub fn update(
        &self,
        phase: &mut AcquisitionPhase,
        logic: &SignalMap,
        warnings: &mut Vec<DataQualityWarning>,
    ) -> LogicMask {
        let mut seen = LogicMask::EMPTY;
        for sample in logic {
            if sample.raw_energy() <= self.threshold {
                continue;
            }
            let Some(pulse) = LogicPulse::from_subtype(sample.subtype()) else {
                continue;
            };
            seen.insert(pulse);
            if pulse == LogicPulse::Trigger {
                phase.cycle_reference_time = Some(sample.timestamp());
                phase.cycle_number = phase.cycle_number.saturating_add(1);
                tracing::debug!(cycle = phase.cycle_number, time = sample.timestamp(), "cycle trigger");
            }
        }

        for category in PhaseCategory::ORDER {
            let on = seen.contains(category.on_pulse());
            let off = seen.contains(category.off_pulse());
            if on && off {
                raise(warnings, DataQualityWarning::SameEventConflict { category });
            }
            if on && phase.is_on(category) {
                raise(warnings, DataQualityWarning::MissingOffSignal { category });
            }
            if on {
                phase.set(category, true);
            }
            if off {
                phase.set(category, false);
            }
            if on || off {
                tracing::debug!(%category, on = phase.is_on(category), "phase transition");
            }
        }
        seen
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelEvent, Family};
    use crate::signal_map::SignalMapBuilder;
    use alloc::vec;

    fn run(phase: &mut AcquisitionPhase, pulses: &[(&str, f64, f64)]) -> (LogicMask, Vec<DataQualityWarning>) {
        let cfg = ProcessorConfig::default();
        let events: Vec<ChannelEvent> = pulses
            .iter()
            .enumerate()
            .map(|(i, &(s, e, t))| ChannelEvent::new(s, e, t, i as i32 + 1))
            .collect();
        let mut warnings = Vec::new();
        let map = SignalMapBuilder::for_family(Family::Logic, &cfg).build(&events, &mut warnings);
        let mask = PhaseStateMachine::from_config(&cfg).update(phase, &map, &mut warnings);
        (mask, warnings)
    }

    // ── Pulses ────────────────────────────────────────────────────────────

    #[test]
    fn test_pulse_bits_match_acquisition_word() {
        let expected = [1u16, 2, 4, 8, 16, 32, 64, 128, 256, 512, 1024];
        for (pulse, bit) in LogicPulse::ALL.iter().zip(expected) {
            assert_eq!(pulse.bit(), bit, "{:?}", pulse);
        }
    }

    #[test]
    fn test_pulse_subtype_round_trip() {
        for pulse in LogicPulse::ALL {
            assert_eq!(LogicPulse::from_subtype(pulse.subtype()), Some(pulse));
        }
        assert_eq!(LogicPulse::from_subtype("XYZ"), None);
    }

    // ── Initial state ─────────────────────────────────────────────────────

    #[test]
    fn test_run_starts_measuring() {
        let p = AcquisitionPhase::new();
        assert!(p.measure);
        assert!(!p.tape_move && !p.background && !p.light_pulser && !p.irradiation);
        assert_eq!(p.cycle_number, 0);
        assert!(p.is_regular_measurement());
    }

    // ── Cycle trigger ─────────────────────────────────────────────────────

    #[test]
    fn test_trigger_pulse_counts_cycle_and_latches_time() {
        let mut p = AcquisitionPhase::new();
        let (mask, w) = run(&mut p, &[("TRU", 5.0, 12.5), ("BGU", 5.0, 12.5)]);
        assert_eq!(p.cycle_number, 1);
        assert_eq!(p.cycle_reference_time, Some(12.5));
        assert_eq!(mask.bits(), 1 + 128);
        assert!(w.is_empty());
        assert!(p.background);
        assert_eq!(p.cycle_time(13.0), Some(0.5));
    }

    #[test]
    fn test_pulse_at_threshold_ignored() {
        let mut p = AcquisitionPhase::new();
        let (mask, _) = run(&mut p, &[("TRU", 1.0, 3.0), ("TMU", 0.2, 3.0)]);
        assert!(mask.is_empty());
        assert_eq!(p.cycle_number, 0);
        assert!(!p.tape_move);
    }

    // ── Transitions ───────────────────────────────────────────────────────

    #[test]
    fn test_measure_on_then_off() {
        let mut p = AcquisitionPhase { measure: false, ..AcquisitionPhase::new() };
        run(&mut p, &[("MSU", 5.0, 1.0)]);
        assert!(p.measure);
        run(&mut p, &[("MSD", 5.0, 2.0)]);
        assert!(!p.measure);
    }

    #[test]
    fn test_repeated_on_warns_missing_off() {
        let mut p = AcquisitionPhase { measure: false, ..AcquisitionPhase::new() };
        let (_, w1) = run(&mut p, &[("MSU", 5.0, 1.0)]);
        assert!(w1.is_empty());
        let (_, w2) = run(&mut p, &[("MSU", 5.0, 2.0)]);
        assert_eq!(w2, vec![DataQualityWarning::MissingOffSignal { category: PhaseCategory::Measure }]);
        assert!(p.measure);
    }

    #[test]
    fn test_on_and_off_together_conflict_and_off_wins() {
        let mut p = AcquisitionPhase::new();
        let (_, w) = run(&mut p, &[("TMU", 5.0, 1.0), ("TMD", 5.0, 1.0)]);
        assert_eq!(w, vec![DataQualityWarning::SameEventConflict { category: PhaseCategory::TapeMove }]);
        assert!(!p.tape_move);
    }

    #[test]
    fn test_conflict_while_on_logs_both_warnings_in_order() {
        let mut p = AcquisitionPhase::new();
        let (_, w) = run(&mut p, &[("MSU", 5.0, 1.0), ("MSD", 5.0, 1.0)]);
        assert_eq!(
            w,
            vec![
                DataQualityWarning::SameEventConflict { category: PhaseCategory::Measure },
                DataQualityWarning::MissingOffSignal { category: PhaseCategory::Measure },
            ]
        );
        assert!(!p.measure);
    }

    #[test]
    fn test_categories_are_independent() {
        let mut p = AcquisitionPhase::new();
        run(&mut p, &[("LPU", 5.0, 1.0), ("IRU", 5.0, 1.0)]);
        assert!(p.light_pulser && p.irradiation && p.measure);
        assert!(!p.is_counting());
        run(&mut p, &[("LPD", 5.0, 2.0)]);
        assert!(!p.light_pulser && p.irradiation);
        assert!(p.is_regular_measurement());
    }
}
