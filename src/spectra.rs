/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Maps a processed trigger onto histogram fills.
//!
//! [`Spectrum`] names every distribution the core fills; [`Spectra`] decides, from the
//! trigger's phase, beta tag and coincidence report, which ones receive which values.
//! Values without data reach the sink as the `-1` sentinel, matching the acquisition
//! convention. Energies on two-dimensional axes are compressed by
//! [`ENERGY_COMPRESSION`].
//!
//! # Phase gates
//!
//! | Gate | Condition | Ungated | Beta-gated |
//! |---|---|---|---|
//! | Regular | measuring, no background, no light pulser, tape at rest | yes | yes |
//! | Background | measuring, background, no light pulser, tape at rest | yes | yes |
//! | Light pulser | light pulser on | yes | no |
//! | Irradiation | irradiating, no background | yes | yes |
//! | Irradiation + background | irradiating, background | no | yes |

use crate::coincidence::{ClassifierKind, Coincidence, CoincidenceReport};
use crate::config::ProcessorConfig;
use crate::phase::AcquisitionPhase;
use crate::processor::TriggerOutcome;
use crate::ring::{ModuleSum, Ring, RingSlot, RingTotals, NO_DATA};
use crate::sink::HistogramSink;

/// Divisor applied to energies on two-dimensional axes.
pub const ENERGY_COMPRESSION: f64 = 10.0;

/// Offset added to beta-gamma gaps so prompt events land at positive bins.
pub const TIMING_SHIFT: f64 = 100.0;

/// Energy window (exclusive) of the neutron-capture gates.
pub const NEUTRON_ENERGY_GATE: (f64, f64) = (6500.0, 8000.0);

/// Shifted beta-to-ring timing window (exclusive) of the timed neutron gate.
pub const NEUTRON_TIMING_GATE: (f64, f64) = (40.0, 100.0);

/// Central multiplicities at or above this are left out of the multiplicity spectrum.
pub const CENTRAL_MULTIPLICITY_LIMIT: usize = 15;

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Acquisition-phase condition gating a family of spectra.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhaseGate {
    /// Regular decay measurement.
    Regular,
    /// Background measurement.
    Background,
    /// Light-pulser calibration.
    LightPulser,
    /// Irradiation outside the background window.
    Irradiation,
    /// Irradiation inside the background window.
    IrradiationBackground,
}

impl PhaseGate {
    /// Gates in fill order.
    pub const ALL: [PhaseGate; 5] = [
        PhaseGate::Regular,
        PhaseGate::Background,
        PhaseGate::LightPulser,
        PhaseGate::Irradiation,
        PhaseGate::IrradiationBackground,
    ];

    /// Whether `phase` opens this gate.
    pub fn is_open(&self, phase: &AcquisitionPhase) -> bool {
        match self {
            PhaseGate::Regular => phase.is_regular_measurement(),
            PhaseGate::Background => phase.is_background_measurement(),
            PhaseGate::LightPulser => phase.light_pulser,
            PhaseGate::Irradiation => phase.irradiation && !phase.background,
            PhaseGate::IrradiationBackground => phase.irradiation && phase.background,
        }
    }

    fn fills_ungated(&self) -> bool {
        !matches!(self, PhaseGate::IrradiationBackground)
    }

    fn fills_beta_gated(&self) -> bool {
        !matches!(self, PhaseGate::LightPulser)
    }
}

/// Energy projection used on the axes of correlation spectra.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnergyAxis {
    /// Whole detector.
    Total,
    /// Central ring.
    Central,
    /// Inner ring.
    Inner,
    /// Inner, Middle and Outer rings together.
    OuterRings,
}

impl EnergyAxis {
    /// Every axis.
    pub const ALL: [EnergyAxis; 4] =
        [EnergyAxis::Total, EnergyAxis::Central, EnergyAxis::Inner, EnergyAxis::OuterRings];

    /// Projection of `totals`.
    pub fn project(&self, totals: &RingTotals) -> Option<f64> {
        match self {
            EnergyAxis::Total => totals.all(),
            EnergyAxis::Central => totals.central(),
            EnergyAxis::Inner => totals.get(RingSlot::Inner),
            EnergyAxis::OuterRings => totals.outer_rings(),
        }
    }

    fn value(&self, totals: &RingTotals) -> f64 {
        self.project(totals).unwrap_or(NO_DATA)
    }
}

/// Reference time of a beta-gamma gap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimingReference {
    /// Trigger time.
    Trigger,
    /// Earliest Inner, Middle or Outer readout.
    OuterRings,
    /// Earliest Inner readout.
    Inner,
    /// Earliest Central readout.
    Central,
}

/// Unit of the cycle-time axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeUnit {
    /// Seconds.
    Seconds,
    /// Tenths of a second.
    Deciseconds,
    /// Minutes.
    Minutes,
}

impl TimeUnit {
    fn convert(&self, seconds: f64) -> f64 {
        match self {
            TimeUnit::Seconds => seconds,
            TimeUnit::Deciseconds => seconds * 10.0,
            TimeUnit::Minutes => seconds / 60.0,
        }
    }
}

/// Neutron-capture energy gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeutronGate {
    /// Total energy in the window and beta-to-ring timing in the timing window.
    TimedTotal,
    /// Inner+Middle+Outer energy in the window.
    InnerMiddleOuter,
    /// Middle+Outer energy in the window.
    MiddleOuter,
}

/// Which half of a correlated pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PairMember {
    /// Trigger that set A.
    First,
    /// Trigger that completed the pair.
    Second,
}

/// Identifier of one distribution filled by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Spectrum {
    /// Ring energy under a phase gate.
    RingEnergy {
        /// Phase gate.
        gate: PhaseGate,
        /// Beta-tagged triggers only.
        beta_gated: bool,
        /// Ring slot.
        slot: RingSlot,
    },
    /// Front+back sum of one module under a phase gate.
    ModuleEnergy {
        /// Phase gate.
        gate: PhaseGate,
        /// Beta-tagged triggers only.
        beta_gated: bool,
        /// Module index.
        module: usize,
    },
    /// Module sums of one ring, regular measurement.
    RingModuleSums {
        /// Ring.
        ring: Ring,
        /// Beta-tagged triggers only.
        beta_gated: bool,
    },
    /// Module sums of the Inner, Middle and Outer rings, regular beta-tagged.
    OuterModuleSums,
    /// Central-ring multiplicity.
    CentralMultiplicity,
    /// Central energy against Central multiplicity.
    CentralVsMultiplicity,
    /// Smallest Central readout against Central multiplicity.
    MinCentralVsMultiplicity,
    /// Silicon map size while counting.
    SiliconMultiplicity,
    /// Silicon strip number while counting.
    SiliconStrip,
    /// Silicon strip number against cycle number.
    SiliconStripVsCycle,
    /// Logic mask weight at (logic cycle time, cycle number).
    LogicVsCycle,
    /// Total energy against cycle time.
    TotalVsCycleTime,
    /// Central energy against cycle time.
    CentralVsCycleTime,
    /// Total energy against cycle number.
    TotalVsCycleNumber,
    /// Time since the first trigger for beta-tagged triggers.
    BetaTimeSinceStart,
    /// Ring energy against minutes since the first trigger.
    Evolution {
        /// Ring slot.
        slot: RingSlot,
        /// Beta-tagged triggers only.
        beta_gated: bool,
    },
    /// Ring energy against cycle time, regular beta-tagged.
    BetaCycleEvolution {
        /// Ring slot.
        slot: RingSlot,
    },
    /// Total against Central, regular beta-tagged.
    TotalVsCentral,
    /// Central against Inner, regular beta-tagged.
    CentralVsInner,
    /// Total against each outer-ring module sum, regular beta-tagged.
    TotalVsModule,
    /// Central against each outer-ring module sum, regular beta-tagged.
    CentralVsModule,
    /// Module sum against module sum for distinct outer-ring modules, regular beta-tagged.
    GammaGamma,
    /// Energy against cycle time, regular beta-tagged.
    EnergyVsCycleTime {
        /// Energy projection.
        axis: EnergyAxis,
        /// Time unit.
        unit: TimeUnit,
    },
    /// Shifted beta-gamma gap.
    BetaGammaGap {
        /// Reference time.
        reference: TimingReference,
    },
    /// Energy against the shifted beta-gamma gap.
    EnergyVsBetaGammaGap {
        /// Energy projection.
        axis: EnergyAxis,
        /// Reference time.
        reference: TimingReference,
    },
    /// Energy of triggers inside a neutron gate.
    NeutronGated {
        /// Gate.
        gate: NeutronGate,
        /// Energy projection.
        axis: EnergyAxis,
    },
    /// Highest silicon energy, regular beta-tagged.
    MaxSilicon,
    /// Germanium energy against cycle time.
    GermaniumVsCycleTime,
    /// Germanium energy when the implant fired on both sides.
    GermaniumImplantGated,
    /// Classifier time gap.
    CoincidenceGap {
        /// Classifier.
        kind: ClassifierKind,
    },
    /// Current trigger's energy against the classifier gap.
    EnergyVsCoincidenceGap {
        /// Classifier.
        kind: ClassifierKind,
        /// Energy projection.
        axis: EnergyAxis,
    },
    /// Ring energy of one member of a correlated pair.
    CorrelatedEnergy {
        /// Classifier.
        kind: ClassifierKind,
        /// Pair member.
        member: PairMember,
        /// Ring slot.
        slot: RingSlot,
    },
    /// Total against Central for one member of a correlated pair.
    CorrelatedTotalVsCentral {
        /// Classifier.
        kind: ClassifierKind,
        /// Pair member.
        member: PairMember,
    },
}

// ─── Beta-gamma timing ───────────────────────────────────────────────────────

/// Shifted gaps between the beta and the calorimeter response, in gap units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BetaGammaTiming {
    /// Trigger time minus beta time.
    pub trigger: Option<f64>,
    /// Earliest Inner/Middle/Outer readout minus beta time.
    pub outer_rings: Option<f64>,
    /// Earliest Inner readout minus beta time.
    pub inner: Option<f64>,
    /// Earliest Central readout minus beta time.
    pub central: Option<f64>,
}

impl BetaGammaTiming {
    /// Gap for `reference`.
    pub fn get(&self, reference: TimingReference) -> Option<f64> {
        match reference {
            TimingReference::Trigger => self.trigger,
            TimingReference::OuterRings => self.outer_rings,
            TimingReference::Inner => self.inner,
            TimingReference::Central => self.central,
        }
    }
}

fn in_window(value: f64, (low, high): (f64, f64)) -> bool {
    value > low && value < high
}

fn sum_present(values: &[Option<f64>]) -> Option<f64> {
    values.iter().flatten().fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

// ─── Spectra ─────────────────────────────────────────────────────────────────

/// Fills every spectrum for one processed trigger.
#[derive(Clone, Debug)]
pub struct Spectra {
    gap_scale: f64,
}

impl Spectra {
    /// Filler using `config.gap_scale` for timing gaps.
    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self { gap_scale: config.gap_scale }
    }

    /// Shifted beta-gamma gaps of a beta-tagged trigger.
    pub fn beta_gamma_timing(&self, outcome: &TriggerOutcome) -> Option<BetaGammaTiming> {
        let beta = outcome.beta.time?;
        let gap = |t: Option<f64>| t.map(|t| (t - beta) * self.gap_scale + TIMING_SHIFT);
        let earliest = outcome.rings.earliest;
        Some(BetaGammaTiming {
            trigger: gap(outcome.timing.time),
            outer_rings: gap(earliest.outer_rings),
            inner: gap(earliest.inner),
            central: gap(earliest.central),
        })
    }

    /// Fill `sink` from `outcome`.
    pub fn fill<S: HistogramSink + ?Sized>(&self, outcome: &TriggerOutcome, sink: &mut S) {
        self.fill_diagnostics(outcome, sink);
        for gate in PhaseGate::ALL {
            if gate.is_open(&outcome.phase) {
                self.fill_gated(gate, outcome, sink);
            }
        }
        self.fill_germanium(outcome, sink);
        self.fill_time_evolution(outcome, sink);
        if outcome.phase.is_regular_measurement() {
            self.fill_regular(outcome, sink);
        }
        self.fill_coincidences(outcome, sink);
    }

    fn fill_diagnostics<S: HistogramSink + ?Sized>(&self, outcome: &TriggerOutcome, sink: &mut S) {
        let phase = &outcome.phase;
        if phase.is_counting() {
            let silicon = &outcome.maps.silicon;
            sink.plot(Spectrum::SiliconMultiplicity, silicon.len() as f64);
            for strip in silicon.iter().filter_map(|s| crate::beta::strip_number(s.subtype())) {
                sink.plot(Spectrum::SiliconStrip, f64::from(strip));
                sink.plot_2d(Spectrum::SiliconStripVsCycle, f64::from(strip), f64::from(phase.cycle_number));
            }
        }

        if !outcome.logic.is_empty() {
            if let Some(t) = outcome.timing.logic_cycle_time {
                sink.increment(
                    Spectrum::LogicVsCycle,
                    t,
                    f64::from(phase.cycle_number),
                    f64::from(outcome.logic.bits()),
                );
            }
        }

        let rings = &outcome.rings;
        let multiplicity = rings.central_multiplicity as f64;
        if rings.central_multiplicity < CENTRAL_MULTIPLICITY_LIMIT {
            sink.plot(Spectrum::CentralMultiplicity, multiplicity);
        }
        sink.plot_2d(
            Spectrum::CentralVsMultiplicity,
            rings.totals.value_or_no_data(RingSlot::Central) / ENERGY_COMPRESSION,
            multiplicity,
        );
        if let Some(min) = rings.min_central_energy {
            sink.plot_2d(Spectrum::MinCentralVsMultiplicity, min / ENERGY_COMPRESSION, multiplicity);
        }
    }

    fn fill_gated<S: HistogramSink + ?Sized>(&self, gate: PhaseGate, outcome: &TriggerOutcome, sink: &mut S) {
        let values = outcome.rings.totals.to_array();
        let beta = outcome.beta.is_tagged();
        for slot in RingSlot::ALL {
            let v = values[slot.index()];
            if gate.fills_ungated() {
                sink.plot(Spectrum::RingEnergy { gate, beta_gated: false, slot }, v);
            }
            if beta && gate.fills_beta_gated() {
                sink.plot(Spectrum::RingEnergy { gate, beta_gated: true, slot }, v);
            }
        }
        if gate == PhaseGate::LightPulser {
            for (module, sum) in outcome.rings.modules.iter().enumerate() {
                sink.plot(Spectrum::ModuleEnergy { gate, beta_gated: false, module }, sum.value());
            }
        }
    }

    fn fill_germanium<S: HistogramSink + ?Sized>(&self, outcome: &TriggerOutcome, sink: &mut S) {
        let aux = &outcome.auxiliary;
        for &energy in &aux.germanium {
            if let Some(t) = outcome.timing.cycle_time {
                sink.plot_2d(Spectrum::GermaniumVsCycleTime, energy, t);
            }
            if aux.implant.is_complete() {
                sink.plot(Spectrum::GermaniumImplantGated, energy);
            }
        }
    }

    fn fill_time_evolution<S: HistogramSink + ?Sized>(&self, outcome: &TriggerOutcome, sink: &mut S) {
        let totals = &outcome.rings.totals;
        let total = totals.value_or_no_data(RingSlot::All) / ENERGY_COMPRESSION;
        let central = totals.value_or_no_data(RingSlot::Central) / ENERGY_COMPRESSION;
        if let Some(t) = outcome.timing.cycle_time {
            sink.plot_2d(Spectrum::TotalVsCycleTime, total, t);
            sink.plot_2d(Spectrum::CentralVsCycleTime, central, t);
        }
        sink.plot_2d(Spectrum::TotalVsCycleNumber, total, f64::from(outcome.phase.cycle_number));

        let Some(since) = outcome.timing.since_first else {
            return;
        };
        let beta = outcome.beta.is_tagged();
        if beta {
            sink.plot(Spectrum::BetaTimeSinceStart, since);
        }
        let minutes = since / 60.0;
        for slot in RingSlot::ALL {
            let v = totals.value_or_no_data(slot);
            sink.plot_2d(Spectrum::Evolution { slot, beta_gated: false }, v, minutes);
            if beta {
                sink.plot_2d(Spectrum::Evolution { slot, beta_gated: true }, v, minutes);
            }
        }
    }

    fn fill_regular<S: HistogramSink + ?Sized>(&self, outcome: &TriggerOutcome, sink: &mut S) {
        let modules = &outcome.rings.modules;
        let beta = outcome.beta.is_tagged();

        for ring in [Ring::Inner, Ring::Middle, Ring::Outer] {
            for v in modules.ring_values(ring) {
                sink.plot(Spectrum::RingModuleSums { ring, beta_gated: false }, v);
                if beta {
                    sink.plot(Spectrum::RingModuleSums { ring, beta_gated: true }, v);
                    sink.plot(Spectrum::OuterModuleSums, v);
                }
            }
        }
        for (module, sum) in modules.iter().enumerate() {
            let gate = PhaseGate::Regular;
            sink.plot(Spectrum::ModuleEnergy { gate, beta_gated: false, module }, sum.value());
            if beta {
                sink.plot(Spectrum::ModuleEnergy { gate, beta_gated: true, module }, sum.value());
            }
        }

        if beta {
            self.fill_regular_beta(outcome, sink);
        }
    }

    fn fill_regular_beta<S: HistogramSink + ?Sized>(&self, outcome: &TriggerOutcome, sink: &mut S) {
        let totals = &outcome.rings.totals;
        let total = EnergyAxis::Total.value(totals) / ENERGY_COMPRESSION;
        let central = EnergyAxis::Central.value(totals) / ENERGY_COMPRESSION;
        let inner = EnergyAxis::Inner.value(totals) / ENERGY_COMPRESSION;

        if let Some(t) = outcome.timing.cycle_time {
            for slot in RingSlot::ALL {
                sink.plot_2d(Spectrum::BetaCycleEvolution { slot }, totals.value_or_no_data(slot), t);
            }
            for (axis, unit) in [
                (EnergyAxis::Total, TimeUnit::Seconds),
                (EnergyAxis::Total, TimeUnit::Deciseconds),
                (EnergyAxis::Central, TimeUnit::Seconds),
                (EnergyAxis::Central, TimeUnit::Deciseconds),
                (EnergyAxis::Central, TimeUnit::Minutes),
            ] {
                sink.plot_2d(
                    Spectrum::EnergyVsCycleTime { axis, unit },
                    axis.value(totals) / ENERGY_COMPRESSION,
                    unit.convert(t),
                );
            }
        }

        sink.plot_2d(Spectrum::TotalVsCentral, total, central);
        sink.plot_2d(Spectrum::CentralVsInner, central, inner);

        let outer: alloc::vec::Vec<f64> = outcome
            .rings
            .modules
            .iter()
            .skip(Ring::Inner.modules().start)
            .map(ModuleSum::value)
            .collect();
        for &m in &outer {
            sink.plot_2d(Spectrum::TotalVsModule, total, m / ENERGY_COMPRESSION);
            sink.plot_2d(Spectrum::CentralVsModule, central, m / ENERGY_COMPRESSION);
        }
        for (i, &a) in outer.iter().enumerate() {
            for (j, &b) in outer.iter().enumerate() {
                if i != j {
                    sink.plot_2d(Spectrum::GammaGamma, a / ENERGY_COMPRESSION, b / ENERGY_COMPRESSION);
                }
            }
        }

        if let Some(timing) = self.beta_gamma_timing(outcome) {
            self.fill_beta_gamma(&timing, totals, sink);
        }

        if let Some(max) = outcome.beta.max_energy {
            sink.plot(Spectrum::MaxSilicon, max);
        }
    }

    fn fill_beta_gamma<S: HistogramSink + ?Sized>(
        &self,
        timing: &BetaGammaTiming,
        totals: &RingTotals,
        sink: &mut S,
    ) {
        for reference in [TimingReference::Trigger, TimingReference::OuterRings] {
            if let Some(dt) = timing.get(reference) {
                sink.plot(Spectrum::BetaGammaGap { reference }, dt);
            }
        }
        if let Some(dt) = timing.trigger {
            for axis in EnergyAxis::ALL {
                sink.plot_2d(
                    Spectrum::EnergyVsBetaGammaGap { axis, reference: TimingReference::Trigger },
                    axis.value(totals) / ENERGY_COMPRESSION,
                    dt,
                );
            }
        }
        if let Some(dt) = timing.outer_rings {
            sink.plot_2d(
                Spectrum::EnergyVsBetaGammaGap { axis: EnergyAxis::Total, reference: TimingReference::OuterRings },
                EnergyAxis::Total.value(totals) / ENERGY_COMPRESSION,
                dt,
            );
        }

        let central = totals.value_or_no_data(RingSlot::Central);
        if let (Some(all), Some(dt)) = (totals.all(), timing.outer_rings) {
            if in_window(all, NEUTRON_ENERGY_GATE) && in_window(dt, NEUTRON_TIMING_GATE) {
                sink.plot(Spectrum::NeutronGated { gate: NeutronGate::TimedTotal, axis: EnergyAxis::Central }, central);
            }
        }
        let middle_outer = sum_present(&[totals.get(RingSlot::Middle), totals.get(RingSlot::Outer)]);
        let inner_middle_outer = totals.outer_rings();
        let all = totals.value_or_no_data(RingSlot::All);
        for (gate, energy) in [
            (NeutronGate::InnerMiddleOuter, inner_middle_outer),
            (NeutronGate::MiddleOuter, middle_outer),
        ] {
            if energy.is_some_and(|e| in_window(e, NEUTRON_ENERGY_GATE)) {
                sink.plot(Spectrum::NeutronGated { gate, axis: EnergyAxis::Total }, all);
                sink.plot(Spectrum::NeutronGated { gate, axis: EnergyAxis::Central }, central);
            }
        }
    }

    fn fill_coincidences<S: HistogramSink + ?Sized>(&self, outcome: &TriggerOutcome, sink: &mut S) {
        let report: &CoincidenceReport = &outcome.coincidences;
        let totals = &outcome.rings.totals;
        for gap in &report.gaps {
            sink.plot(Spectrum::CoincidenceGap { kind: gap.kind }, gap.gap_ns);
            for axis in EnergyAxis::ALL {
                sink.plot_2d(
                    Spectrum::EnergyVsCoincidenceGap { kind: gap.kind, axis },
                    axis.value(totals) / ENERGY_COMPRESSION,
                    gap.gap_ns,
                );
            }
        }
        for pair in &report.coincidences {
            fill_pair(pair, sink);
        }
    }
}

fn fill_pair<S: HistogramSink + ?Sized>(pair: &Coincidence, sink: &mut S) {
    let first = pair.fresh_first.then_some((PairMember::First, &pair.first));
    for (member, totals) in first.into_iter().chain([(PairMember::Second, &pair.second)]) {
        let values = totals.to_array();
        for slot in RingSlot::ALL {
            sink.plot(Spectrum::CorrelatedEnergy { kind: pair.kind, member, slot }, values[slot.index()]);
        }
        sink.plot_2d(
            Spectrum::CorrelatedTotalVsCentral { kind: pair.kind, member },
            EnergyAxis::Total.value(totals) / ENERGY_COMPRESSION,
            EnergyAxis::Central.value(totals) / ENERGY_COMPRESSION,
        );
    }
}
