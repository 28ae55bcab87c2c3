/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Per-trigger pipeline and the run-scoped context it mutates.
//!
//! ```text
//! TriggerInput ─► SignalMapBuilder ×6 ─► RingAggregator ─┐
//!                                      ├► BetaGate ───────┤
//!                                      └► PhaseStateMachine (RunContext.phase)
//!                                                         ▼
//!                                       CoincidenceBank (RunContext.coincidences)
//!                                                         ▼
//!                                       TriggerOutcome ─► Spectra ─► HistogramSink
//! ```
//!
//! Triggers must arrive one at a time in acquisition order. Every piece of cross-trigger
//! state lives in [`RunContext`]; nothing is global.

use alloc::vec::Vec;

use crate::auxiliary::AuxiliarySummary;
use crate::beta::{BetaGate, BetaTag};
use crate::channel::{ChannelEvent, DetectorSummary, Family};
use crate::coincidence::{CoincidenceBank, CoincidenceInput, CoincidenceReport};
use crate::config::{ConfigError, ProcessorConfig};
use crate::phase::{AcquisitionPhase, LogicMask, PhaseStateMachine};
use crate::ring::{RingAggregator, RingSummary};
use crate::signal_map::{SignalMap, SignalMapBuilder};
use crate::sink::HistogramSink;
use crate::spectra::Spectra;
use crate::warning::DataQualityWarning;

// ─── Input ───────────────────────────────────────────────────────────────────

/// Borrowed per-family hit lists of one trigger.
#[derive(Clone, Copy)]
pub struct TriggerInput<'a> {
    /// Calorimeter readouts.
    pub calorimeter: &'a dyn DetectorSummary,
    /// Silicon strips.
    pub silicon: &'a dyn DetectorSummary,
    /// Germanium monitor.
    pub germanium: &'a dyn DetectorSummary,
    /// Implant SiPM readout.
    pub sipm: &'a dyn DetectorSummary,
    /// Reference module.
    pub reference: &'a dyn DetectorSummary,
    /// Logic pulses.
    pub logic: &'a dyn DetectorSummary,
}

impl<'a> TriggerInput<'a> {
    /// Provider for `family`.
    pub fn family(&self, family: Family) -> &'a dyn DetectorSummary {
        match family {
            Family::Calorimeter => self.calorimeter,
            Family::Silicon => self.silicon,
            Family::Germanium => self.germanium,
            Family::Sipm => self.sipm,
            Family::Reference => self.reference,
            Family::Logic => self.logic,
        }
    }
}

/// Owned trigger, convenient for tests, demos and bindings.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trigger {
    /// Calorimeter readouts.
    pub calorimeter: Vec<ChannelEvent>,
    /// Silicon strips.
    pub silicon: Vec<ChannelEvent>,
    /// Germanium monitor.
    pub germanium: Vec<ChannelEvent>,
    /// Implant SiPM readout.
    pub sipm: Vec<ChannelEvent>,
    /// Reference module.
    pub reference: Vec<ChannelEvent>,
    /// Logic pulses.
    pub logic: Vec<ChannelEvent>,
}

impl Trigger {
    /// Trigger with no hits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` to `family`'s list.
    pub fn push(&mut self, family: Family, event: ChannelEvent) {
        self.list_mut(family).push(event);
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, family: Family, event: ChannelEvent) -> Self {
        self.push(family, event);
        self
    }

    /// Hits of `family`.
    pub fn list(&self, family: Family) -> &[ChannelEvent] {
        match family {
            Family::Calorimeter => &self.calorimeter,
            Family::Silicon => &self.silicon,
            Family::Germanium => &self.germanium,
            Family::Sipm => &self.sipm,
            Family::Reference => &self.reference,
            Family::Logic => &self.logic,
        }
    }

    fn list_mut(&mut self, family: Family) -> &mut Vec<ChannelEvent> {
        match family {
            Family::Calorimeter => &mut self.calorimeter,
            Family::Silicon => &mut self.silicon,
            Family::Germanium => &mut self.germanium,
            Family::Sipm => &mut self.sipm,
            Family::Reference => &mut self.reference,
            Family::Logic => &mut self.logic,
        }
    }

    /// Borrow as pipeline input.
    pub fn input(&self) -> TriggerInput<'_> {
        TriggerInput {
            calorimeter: &self.calorimeter,
            silicon: &self.silicon,
            germanium: &self.germanium,
            sipm: &self.sipm,
            reference: &self.reference,
            logic: &self.logic,
        }
    }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Signal maps of every family for one trigger.
#[derive(Clone, Debug, Default)]
pub struct FamilyMaps {
    /// Calorimeter map.
    pub calorimeter: SignalMap,
    /// Silicon map.
    pub silicon: SignalMap,
    /// Germanium map.
    pub germanium: SignalMap,
    /// SiPM map.
    pub sipm: SignalMap,
    /// Reference-module map.
    pub reference: SignalMap,
    /// Logic map.
    pub logic: SignalMap,
}

impl FamilyMaps {
    /// Map of `family`.
    pub fn get(&self, family: Family) -> &SignalMap {
        match family {
            Family::Calorimeter => &self.calorimeter,
            Family::Silicon => &self.silicon,
            Family::Germanium => &self.germanium,
            Family::Sipm => &self.sipm,
            Family::Reference => &self.reference,
            Family::Logic => &self.logic,
        }
    }

    fn get_mut(&mut self, family: Family) -> &mut SignalMap {
        match family {
            Family::Calorimeter => &mut self.calorimeter,
            Family::Silicon => &mut self.silicon,
            Family::Germanium => &mut self.germanium,
            Family::Sipm => &mut self.sipm,
            Family::Reference => &mut self.reference,
            Family::Logic => &mut self.logic,
        }
    }
}

/// Times derived for one trigger, all in seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TriggerTiming {
    /// Timestamp of the first calorimeter hit.
    pub time: Option<f64>,
    /// Time since the first calorimeter trigger of the run.
    pub since_first: Option<f64>,
    /// Time since the latest cycle trigger.
    pub cycle_time: Option<f64>,
    /// Timestamp of the first logic hit.
    pub logic_time: Option<f64>,
    /// Logic time relative to the latest cycle trigger.
    pub logic_cycle_time: Option<f64>,
}

/// Everything the pipeline derived from one trigger.
#[derive(Clone, Debug)]
pub struct TriggerOutcome {
    /// Zero-based position of this trigger in the run.
    pub index: u64,
    /// Per-family signal maps.
    pub maps: FamilyMaps,
    /// Ring totals, module sums and calorimeter diagnostics.
    pub rings: RingSummary,
    /// Silicon beta tag.
    pub beta: BetaTag,
    /// Logic pulses accepted in this trigger.
    pub logic: LogicMask,
    /// Phase after this trigger's pulses were applied.
    pub phase: AcquisitionPhase,
    /// Derived times.
    pub timing: TriggerTiming,
    /// Germanium, implant and reference summaries.
    pub auxiliary: AuxiliarySummary,
    /// Classifier gaps and emitted pairs.
    pub coincidences: CoincidenceReport,
    /// Data-quality warnings raised while processing.
    pub warnings: Vec<DataQualityWarning>,
}

// ─── RunContext ──────────────────────────────────────────────────────────────

/// Cross-trigger state of one run.
#[derive(Clone, Debug)]
pub struct RunContext {
    /// Acquisition phase and cycle counter.
    pub phase: AcquisitionPhase,
    /// The four classifiers.
    pub coincidences: CoincidenceBank,
    /// Time of the first calorimeter trigger.
    pub first_trigger_time: Option<f64>,
    /// Triggers handled so far.
    pub triggers_processed: u64,
}

impl RunContext {
    /// Fresh run: measuring, counter at zero, classifiers empty.
    pub fn new(config: &ProcessorConfig) -> Self {
        Self {
            phase: AcquisitionPhase::new(),
            coincidences: CoincidenceBank::new(config),
            first_trigger_time: None,
            triggers_processed: 0,
        }
    }
}

// ─── TriggerProcessor ────────────────────────────────────────────────────────

/// Stateless stages built once from the configuration.
#[derive(Clone, Debug)]
struct Stages {
    builders: Vec<SignalMapBuilder>,
    rings: RingAggregator,
    beta: BetaGate,
    phase: PhaseStateMachine,
    spectra: Spectra,
}

impl Stages {
    fn new(config: &ProcessorConfig) -> Self {
        Self {
            builders: Family::ALL
                .iter()
                .map(|&f| SignalMapBuilder::for_family(f, config))
                .collect(),
            rings: RingAggregator::from_config(config),
            beta: BetaGate::from_config(config),
            phase: PhaseStateMachine::from_config(config),
            spectra: Spectra::from_config(config),
        }
    }

    fn run(&self, run: &mut RunContext, input: &TriggerInput<'_>) -> TriggerOutcome {
        let mut warnings = Vec::new();

        let mut maps = FamilyMaps::default();
        for builder in &self.builders {
            let family = builder.family();
            builder.fill(maps.get_mut(family), input.family(family).events(), &mut warnings);
        }

        let rings = self.rings.aggregate(&maps.calorimeter, &mut warnings);
        let beta = self.beta.evaluate(&maps.silicon, input.silicon);
        let logic = self.phase.update(&mut run.phase, &maps.logic, &mut warnings);

        let time = input.calorimeter.events().first().map(|e| e.time);
        if run.first_trigger_time.is_none() {
            run.first_trigger_time = time;
        }
        let logic_time = input.logic.events().first().map(|e| e.time);
        let timing = TriggerTiming {
            time,
            since_first: time.zip(run.first_trigger_time).map(|(t, first)| t - first),
            cycle_time: time.and_then(|t| run.phase.cycle_time(t)),
            logic_time,
            logic_cycle_time: logic_time.and_then(|t| run.phase.cycle_time(t)),
        };

        let auxiliary = AuxiliarySummary::from_maps(&maps.germanium, &maps.sipm, &maps.reference);

        let coincidences = run.coincidences.observe(
            &run.phase,
            &CoincidenceInput { time, beta: beta.is_tagged(), totals: rings.totals },
        );

        let index = run.triggers_processed;
        run.triggers_processed += 1;
        tracing::trace!(
            index,
            beta = beta.is_tagged(),
            coincidences = coincidences.coincidences.len(),
            warnings = warnings.len(),
            "trigger processed"
        );

        TriggerOutcome {
            index,
            maps,
            rings,
            beta,
            logic,
            phase: run.phase.clone(),
            timing,
            auxiliary,
            coincidences,
            warnings,
        }
    }
}

/// Runs triggers through the pipeline and owns the run state.
///
/// # Example
///
/// ```rust
/// use mtas_core::{ChannelEvent, Family, ProcessorConfig, Trigger, TriggerProcessor};
/// use mtas_core::sink::NullSink;
///
/// let mut processor = TriggerProcessor::new(ProcessorConfig::default()).unwrap();
/// let trigger = Trigger::new()
///     .with(Family::Calorimeter, ChannelEvent::new("IL1", 400.0, 1.0e-3, 13))
///     .with(Family::Calorimeter, ChannelEvent::new("IR1", 600.0, 1.0e-3, 14));
/// let outcome = processor.process(&trigger.input(), NullSink);
/// assert_eq!(outcome.rings.totals.all(), Some(500.0));
/// ```
#[derive(Clone, Debug)]
pub struct TriggerProcessor {
    config: ProcessorConfig,
    stages: Stages,
    run: RunContext,
}

impl TriggerProcessor {
    /// Validate `config` and start a fresh run.
    pub fn new(config: ProcessorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            stages: Stages::new(&config),
            run: RunContext::new(&config),
            config,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Cross-trigger state of the current run.
    pub fn context(&self) -> &RunContext {
        &self.run
    }

    /// Drop all run state and start over.
    pub fn reset_run(&mut self) {
        self.run = RunContext::new(&self.config);
    }

    /// Advance the run by one trigger without filling any spectra.
    pub fn analyse(&mut self, input: &TriggerInput<'_>) -> TriggerOutcome {
        self.stages.run(&mut self.run, input)
    }

    /// Advance the run by one trigger and fill `sink`.
    pub fn process<S: HistogramSink>(&mut self, input: &TriggerInput<'_>, mut sink: S) -> TriggerOutcome {
        let outcome = self.analyse(input);
        self.stages.spectra.fill(&outcome, &mut sink);
        outcome
    }

    /// Advance an externally owned run by one trigger.
    ///
    /// `run` must have been created from this processor's configuration.
    pub fn process_in<S: HistogramSink>(
        &self,
        run: &mut RunContext,
        input: &TriggerInput<'_>,
        mut sink: S,
    ) -> TriggerOutcome {
        let outcome = self.stages.run(run, input);
        self.stages.spectra.fill(&outcome, &mut sink);
        outcome
    }
}
