/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Sliding-pair time-coincidence classifiers.
//!
//! Four independent correlators scan the ordered trigger stream:
//!
//! | Kind | A candidate | B candidate | Window |
//! |---|---|---|---|
//! | [`BetaBeta`](ClassifierKind::BetaBeta) | beta | beta | `300 < gap < 750` |
//! | [`BetaNonBeta`](ClassifierKind::BetaNonBeta) | beta | not beta | `300 < gap < 550` |
//! | [`AnyAny`](ClassifierKind::AnyAny) | any | any | `gap > 1000` |
//! | [`FirstBetaOnly`](ClassifierKind::FirstBetaOnly) | beta | any | `\|gap\| > 4000` |
//!
//! The first three share [`SlidingPair`]. Beta-then-non-beta holds its beta until the next
//! beta ([`AnchorPolicy::Hold`]); the other two slide. The last one is [`FirstBetaGuard`],
//! its own three-state machine:
//!
//! ```text
//!            beta                        |gap| in window
//!   Idle ──────────► Armed{a, b?, snap} ────────────────► AwaitingNextBeta{a}
//!                      ▲      │ beta: b ← a, a ← now          │
//!                      │      └──────────┘                    │
//!                      └──────────── beta: b ← a, a ← now ────┘
//! ```
//!
//! [`CoincidenceBank`] owns all four and applies the shared eligibility gate: only
//! regular-measurement triggers with a calorimeter time reach the classifiers.

use crate::config::{CoincidenceWindow, ProcessorConfig};
use crate::phase::AcquisitionPhase;
use crate::ring::RingTotals;

/// Upper bound on coincidences reported by one trigger.
pub const MAX_COINCIDENCES: usize = 4;

// ─── Classifier identity ─────────────────────────────────────────────────────

/// Which classifier produced a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassifierKind {
    /// Beta followed by beta.
    BetaBeta,
    /// Beta followed by a non-beta trigger.
    BetaNonBeta,
    /// Any trigger followed by any trigger.
    AnyAny,
    /// Latest beta against the triggers that follow it, emitted once per beta.
    FirstBetaOnly,
}

impl ClassifierKind {
    /// Every classifier in evaluation order.
    pub const ALL: [ClassifierKind; 4] = [
        ClassifierKind::BetaBeta,
        ClassifierKind::BetaNonBeta,
        ClassifierKind::AnyAny,
        ClassifierKind::FirstBetaOnly,
    ];
}

/// Trigger predicate used to pick A and B candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Candidate {
    /// Beta-tagged triggers.
    Beta,
    /// Untagged triggers.
    NonBeta,
    /// Every trigger.
    Any,
}

impl Candidate {
    /// Whether a trigger with this beta flag qualifies.
    pub fn admits(&self, beta: bool) -> bool {
        match self {
            Candidate::Beta => beta,
            Candidate::NonBeta => !beta,
            Candidate::Any => true,
        }
    }
}

// ─── Inputs & outputs ────────────────────────────────────────────────────────

/// What a classifier needs to know about one trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoincidenceInput {
    /// Trigger time in seconds; `None` when the calorimeter was empty.
    pub time: Option<f64>,
    /// Beta tag of the trigger.
    pub beta: bool,
    /// Ring totals of the trigger.
    pub totals: RingTotals,
}

/// Correlated pair emitted by a classifier.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coincidence {
    /// Classifier that fired.
    pub kind: ClassifierKind,
    /// Scaled time gap.
    pub gap_ns: f64,
    /// Ring totals saved when A was set.
    pub first: RingTotals,
    /// Ring totals of the trigger that completed the pair.
    pub second: RingTotals,
    /// `true` for the first pair emitted against this A; later pairs sharing the same
    /// A repeat `first` and leave it out of the first-event distributions.
    pub fresh_first: bool,
}

/// Gap recorded into a classifier's diagnostic distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GapSample {
    /// Classifier that measured the gap.
    pub kind: ClassifierKind,
    /// Scaled time gap.
    pub gap_ns: f64,
}

/// One classifier's result for one trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Step {
    /// Gap measured this trigger, if a pair was evaluated.
    pub gap: Option<GapSample>,
    /// Pair emitted this trigger.
    pub coincidence: Option<Coincidence>,
}

/// Every classifier's result for one trigger.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoincidenceReport {
    /// Gaps measured, in classifier order.
    pub gaps: heapless::Vec<GapSample, MAX_COINCIDENCES>,
    /// Pairs emitted, in classifier order.
    pub coincidences: heapless::Vec<Coincidence, MAX_COINCIDENCES>,
}

impl CoincidenceReport {
    /// Pair emitted by `kind`, if any.
    pub fn get(&self, kind: ClassifierKind) -> Option<&Coincidence> {
        self.coincidences.iter().find(|c| c.kind == kind)
    }

    /// Gap measured by `kind`, if any.
    pub fn gap(&self, kind: ClassifierKind) -> Option<f64> {
        self.gaps.iter().find(|g| g.kind == kind).map(|g| g.gap_ns)
    }

    /// `true` when no classifier fired.
    pub fn is_empty(&self) -> bool {
        self.coincidences.is_empty()
    }

    fn absorb(&mut self, step: Step) {
        // One entry per classifier at most, so capacity is never exceeded.
        if let Some(g) = step.gap {
            let _ = self.gaps.push(g);
        }
        if let Some(c) = step.coincidence {
            let _ = self.coincidences.push(c);
        }
    }
}

// ─── SlidingPair ─────────────────────────────────────────────────────────────

/// What happens to A once a B candidate has been measured against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnchorPolicy {
    /// B becomes the next A when it is itself an A candidate; A is cleared otherwise.
    Slide,
    /// A stays until the next A candidate replaces it.
    Hold,
}

/// Saved A candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Anchor {
    time: f64,
    totals: RingTotals,
    /// A pair was already emitted against this A.
    paired: bool,
}

impl Anchor {
    fn new(time: f64, totals: RingTotals) -> Self {
        Self { time, totals, paired: false }
    }
}

/// Generic sliding-pair correlator.
///
/// With A empty, an A candidate sets A and snapshots its totals. With A set, a B
/// candidate closes the pair: the gap is measured and the pair is emitted when inside
/// the window. The [`AnchorPolicy`] then decides whether A slides to B or is held for
/// the next B. An A candidate that cannot be B re-arms A.
#[derive(Clone, Debug)]
pub struct SlidingPair {
    kind: ClassifierKind,
    a: Candidate,
    b: Candidate,
    window: CoincidenceWindow,
    policy: AnchorPolicy,
    scale: f64,
    anchor: Option<Anchor>,
}

impl SlidingPair {
    /// Correlator with explicit predicates and window.
    pub fn new(
        kind: ClassifierKind,
        a: Candidate,
        b: Candidate,
        window: CoincidenceWindow,
        policy: AnchorPolicy,
        scale: f64,
    ) -> Self {
        Self { kind, a, b, window, policy, scale, anchor: None }
    }

    /// Beta followed by beta.
    pub fn beta_beta(config: &ProcessorConfig) -> Self {
        Self::new(
            ClassifierKind::BetaBeta,
            Candidate::Beta,
            Candidate::Beta,
            config.beta_beta_window,
            AnchorPolicy::Slide,
            config.gap_scale,
        )
    }

    /// Beta followed by a non-beta trigger.
    ///
    /// Every untagged trigger is measured against the latest beta until the next beta
    /// arrives.
    pub fn beta_non_beta(config: &ProcessorConfig) -> Self {
        Self::new(
            ClassifierKind::BetaNonBeta,
            Candidate::Beta,
            Candidate::NonBeta,
            config.beta_non_beta_window,
            AnchorPolicy::Hold,
            config.gap_scale,
        )
    }

    /// Any trigger followed by any trigger.
    pub fn any_any(config: &ProcessorConfig) -> Self {
        Self::new(
            ClassifierKind::AnyAny,
            Candidate::Any,
            Candidate::Any,
            config.any_any_window,
            AnchorPolicy::Slide,
            config.gap_scale,
        )
    }

    /// Classifier identity.
    pub fn kind(&self) -> ClassifierKind {
        self.kind
    }

    /// Time held in the A slot.
    pub fn pending_time(&self) -> Option<f64> {
        self.anchor.map(|a| a.time)
    }

    /// Empty the A slot.
    pub fn reset(&mut self) {
        self.anchor = None;
    }

    /// Advance with one eligible trigger at `time`.
    pub fn step(&mut self, time: f64, beta: bool, totals: RingTotals) -> Step {
        let as_a = self.a.admits(beta);
        let Some(anchor) = self.anchor else {
            if as_a {
                self.anchor = Some(Anchor::new(time, totals));
            }
            return Step::default();
        };

        if !self.b.admits(beta) {
            if as_a {
                self.anchor = Some(Anchor::new(time, totals));
            }
            return Step::default();
        }

        let gap_ns = (time - anchor.time) * self.scale;
        let coincidence = self.window.accepts(gap_ns).then_some(Coincidence {
            kind: self.kind,
            gap_ns,
            first: anchor.totals,
            second: totals,
            fresh_first: !anchor.paired,
        });
        if coincidence.is_some() {
            tracing::trace!(kind = ?self.kind, gap_ns, "coincidence");
        }
        self.anchor = match self.policy {
            _ if as_a => Some(Anchor::new(time, totals)),
            AnchorPolicy::Slide => None,
            AnchorPolicy::Hold => Some(Anchor { paired: anchor.paired || coincidence.is_some(), ..anchor }),
        };
        Step {
            gap: Some(GapSample { kind: self.kind, gap_ns }),
            coincidence,
        }
    }
}

// ─── FirstBetaGuard ──────────────────────────────────────────────────────────

/// State of the guarded first-beta correlator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GuardState {
    /// No beta seen yet.
    Idle,
    /// Holding beta time `a`, comparing it against `b`.
    Armed {
        /// Latest beta time.
        a: f64,
        /// Comparison time; `None` until the next trigger arrives.
        b: Option<f64>,
        /// Totals saved with `a`.
        snapshot: RingTotals,
    },
    /// A pair fired for beta `a`; nothing more until the next beta.
    AwaitingNextBeta {
        /// Beta time whose pair already fired.
        a: f64,
    },
}

/// Guarded correlator emitting at most one pair per beta.
///
/// In `Armed`, every trigger fills B if it is empty and measures
/// `gap = (a − b) × scale`; a gap with `|gap|` beyond the window fires once and latches.
/// A beta trigger then moves B to the old A and A to itself; a non-beta trigger moves B
/// to itself and, once latched, parks the machine in `AwaitingNextBeta` until a beta
/// re-arms it.
#[derive(Clone, Debug)]
pub struct FirstBetaGuard {
    window: CoincidenceWindow,
    scale: f64,
    state: GuardState,
}

impl FirstBetaGuard {
    /// Guard using `config.first_beta_window`.
    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self {
            window: config.first_beta_window,
            scale: config.gap_scale,
            state: GuardState::Idle,
        }
    }

    /// Current state.
    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Back to `Idle`.
    pub fn reset(&mut self) {
        self.state = GuardState::Idle;
    }

    /// Advance with one eligible trigger at `time`.
    pub fn step(&mut self, time: f64, beta: bool, totals: RingTotals) -> Step {
        match self.state {
            GuardState::Idle => {
                if beta {
                    self.state = GuardState::Armed { a: time, b: None, snapshot: totals };
                }
                Step::default()
            }
            GuardState::AwaitingNextBeta { a } => {
                if beta {
                    self.state = GuardState::Armed { a: time, b: Some(a), snapshot: totals };
                }
                Step::default()
            }
            GuardState::Armed { a, b, snapshot } => {
                let b = b.unwrap_or(time);
                let gap_ns = (a - b) * self.scale;
                let mut out = Step::default();
                if self.window.accepts(gap_ns) {
                    tracing::trace!(gap_ns, "first-beta coincidence");
                    out.gap = Some(GapSample { kind: ClassifierKind::FirstBetaOnly, gap_ns });
                    out.coincidence = Some(Coincidence {
                        kind: ClassifierKind::FirstBetaOnly,
                        gap_ns,
                        first: snapshot,
                        second: totals,
                        fresh_first: true,
                    });
                }
                let latched = out.coincidence.is_some();
                self.state = if beta {
                    GuardState::Armed { a: time, b: Some(a), snapshot: totals }
                } else if latched {
                    GuardState::AwaitingNextBeta { a }
                } else {
                    GuardState::Armed { a, b: Some(time), snapshot }
                };
                out
            }
        }
    }
}

// ─── CoincidenceBank ─────────────────────────────────────────────────────────

/// The four classifiers of one run.
#[derive(Clone, Debug)]
pub struct CoincidenceBank {
    beta_beta: SlidingPair,
    beta_non_beta: SlidingPair,
    any_any: SlidingPair,
    first_beta: FirstBetaGuard,
}

impl CoincidenceBank {
    /// Fresh classifiers with every slot empty.
    pub fn new(config: &ProcessorConfig) -> Self {
        Self {
            beta_beta: SlidingPair::beta_beta(config),
            beta_non_beta: SlidingPair::beta_non_beta(config),
            any_any: SlidingPair::any_any(config),
            first_beta: FirstBetaGuard::from_config(config),
        }
    }

    /// Whether a trigger under `phase` with `time` reaches the classifiers.
    pub fn is_eligible(phase: &AcquisitionPhase, time: Option<f64>) -> bool {
        phase.is_regular_measurement() && time.is_some()
    }

    /// Feed one trigger through every classifier.
    ///
    /// Ineligible triggers leave every classifier untouched.
    pub fn observe(&mut self, phase: &AcquisitionPhase, input: &CoincidenceInput) -> CoincidenceReport {
        let mut report = CoincidenceReport::default();
        let Some(time) = input.time.filter(|_| Self::is_eligible(phase, input.time)) else {
            return report;
        };
        report.absorb(self.beta_beta.step(time, input.beta, input.totals));
        report.absorb(self.beta_non_beta.step(time, input.beta, input.totals));
        report.absorb(self.any_any.step(time, input.beta, input.totals));
        report.absorb(self.first_beta.step(time, input.beta, input.totals));
        report
    }

    /// Generic classifier of `kind`; `None` for the guarded one.
    pub fn sliding(&self, kind: ClassifierKind) -> Option<&SlidingPair> {
        match kind {
            ClassifierKind::BetaBeta => Some(&self.beta_beta),
            ClassifierKind::BetaNonBeta => Some(&self.beta_non_beta),
            ClassifierKind::AnyAny => Some(&self.any_any),
            ClassifierKind::FirstBetaOnly => None,
        }
    }

    /// Guarded classifier.
    pub fn guard(&self) -> &FirstBetaGuard {
        &self.first_beta
    }

    /// Empty every classifier.
    pub fn reset(&mut self) {
        self.beta_beta.reset();
        self.beta_non_beta.reset();
        self.any_any.reset();
        self.first_beta.reset();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::{Ring, RingSlot};
    use alloc::vec::Vec;

    const NS: f64 = 1.0e-8;

    fn totals(all: f64) -> RingTotals {
        let mut t = RingTotals::new();
        t.add(Ring::Inner, all);
        t
    }

    fn input(ns: f64, beta: bool, all: f64) -> CoincidenceInput {
        CoincidenceInput { time: Some(ns * NS), beta, totals: totals(all) }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    // ── Generic sliding pair ──────────────────────────────────────────────

    #[test]
    fn test_beta_beta_pairs_consecutive_betas() {
        let cfg = ProcessorConfig::default();
        let mut c = SlidingPair::beta_beta(&cfg);
        let s0 = c.step(0.0, true, totals(1.0));
        let s1 = c.step(500.0 * NS, true, totals(2.0));
        let s2 = c.step(1300.0 * NS, true, totals(3.0));

        assert_eq!(s0, Step::default());
        let pair = s1.coincidence.expect("500 ns lies inside (300, 750)");
        assert!(close(pair.gap_ns, 500.0));
        assert_eq!(pair.first.all(), Some(1.0));
        assert_eq!(pair.second.all(), Some(2.0));

        assert!(s2.coincidence.is_none());
        assert!(close(s2.gap.map(|g| g.gap_ns).unwrap_or(0.0), 800.0));
        assert!(close(c.pending_time().unwrap_or(0.0), 1300.0 * NS));
    }

    #[test]
    fn test_beta_beta_ignores_untagged_triggers() {
        let cfg = ProcessorConfig::default();
        let mut c = SlidingPair::beta_beta(&cfg);
        c.step(0.0, true, totals(1.0));
        let s = c.step(400.0 * NS, false, totals(2.0));
        assert_eq!(s, Step::default());
        assert_eq!(c.pending_time(), Some(0.0));
    }

    #[test]
    fn test_beta_non_beta_holds_beta_across_untagged_triggers() {
        let cfg = ProcessorConfig::default();
        let mut c = SlidingPair::beta_non_beta(&cfg);
        c.step(0.0, true, totals(120.0));

        let early = c.step(100.0 * NS, false, totals(5.0));
        assert!(early.coincidence.is_none());
        assert!(close(early.gap.map(|g| g.gap_ns).unwrap_or(0.0), 100.0));
        assert_eq!(c.pending_time(), Some(0.0));

        let s = c.step(400.0 * NS, false, totals(100.0));
        let pair = s.coincidence.expect("400 ns after the beta lies inside (300, 550)");
        assert!(close(pair.gap_ns, 400.0));
        assert_eq!(pair.first.all(), Some(120.0));
        assert!(pair.fresh_first);
        assert_eq!(c.pending_time(), Some(0.0));
    }

    #[test]
    fn test_beta_non_beta_first_totals_fresh_once_per_beta() {
        let cfg = ProcessorConfig::default();
        let mut c = SlidingPair::beta_non_beta(&cfg);
        c.step(0.0, true, totals(120.0));
        let s1 = c.step(350.0 * NS, false, totals(1.0)).coincidence.expect("350 ns");
        let s2 = c.step(500.0 * NS, false, totals(2.0)).coincidence.expect("500 ns");
        assert!(s1.fresh_first);
        assert!(!s2.fresh_first);
        assert_eq!(s2.first.all(), Some(120.0));

        // The gap keeps growing until the next beta replaces the anchor.
        let late = c.step(800.0 * NS, false, totals(3.0));
        assert!(late.coincidence.is_none());
        assert!(close(late.gap.map(|g| g.gap_ns).unwrap_or(0.0), 800.0));

        c.step(2000.0 * NS, true, totals(60.0));
        let s3 = c.step(2400.0 * NS, false, totals(4.0)).coincidence.expect("400 ns after new beta");
        assert!(s3.fresh_first);
        assert_eq!(s3.first.all(), Some(60.0));
    }

    #[test]
    fn test_beta_beta_pairs_are_always_fresh() {
        let cfg = ProcessorConfig::default();
        let mut c = SlidingPair::beta_beta(&cfg);
        c.step(0.0, true, totals(1.0));
        let p1 = c.step(400.0 * NS, true, totals(2.0)).coincidence.expect("400 ns");
        let p2 = c.step(800.0 * NS, true, totals(3.0)).coincidence.expect("400 ns again");
        assert!(p1.fresh_first && p2.fresh_first);
        assert_eq!(p2.first.all(), Some(2.0));
    }

    #[test]
    fn test_beta_non_beta_latest_beta_wins() {
        let cfg = ProcessorConfig::default();
        let mut c = SlidingPair::beta_non_beta(&cfg);
        c.step(0.0, true, totals(1.0));
        c.step(1000.0 * NS, true, totals(2.0));
        let s = c.step(1400.0 * NS, false, totals(3.0));
        let pair = s.coincidence.expect("gap to latest beta is 400 ns");
        assert_eq!(pair.first.all(), Some(2.0));
    }

    #[test]
    fn test_beta_non_beta_outside_window_records_gap_only() {
        let cfg = ProcessorConfig::default();
        let mut c = SlidingPair::beta_non_beta(&cfg);
        c.step(0.0, true, totals(1.0));
        let s = c.step(600.0 * NS, false, totals(2.0));
        assert!(s.coincidence.is_none());
        assert!(s.gap.is_some());
    }

    #[test]
    fn test_any_any_is_continuous_scan() {
        let cfg = ProcessorConfig::default();
        let mut c = SlidingPair::any_any(&cfg);
        let gaps: Vec<Option<f64>> = [0.0, 2000.0, 2500.0, 5000.0]
            .iter()
            .enumerate()
            .map(|(i, &ns)| c.step(ns * NS, i % 2 == 0, totals(1.0)).coincidence.map(|p| p.gap_ns))
            .collect();
        assert_eq!(gaps[0], None);
        assert!(close(gaps[1].unwrap_or(0.0), 2000.0));
        assert_eq!(gaps[2], None, "500 ns is not above 1000");
        assert!(close(gaps[3].unwrap_or(0.0), 2500.0));
    }

    #[test]
    fn test_trigger_at_time_zero_is_a_valid_anchor() {
        let cfg = ProcessorConfig::default();
        let mut c = SlidingPair::any_any(&cfg);
        c.step(0.0, false, totals(1.0));
        assert_eq!(c.pending_time(), Some(0.0));
    }

    // ── Guarded classifier ────────────────────────────────────────────────

    #[test]
    fn test_guard_idle_until_beta() {
        let cfg = ProcessorConfig::default();
        let mut g = FirstBetaGuard::from_config(&cfg);
        g.step(0.0, false, totals(1.0));
        assert_eq!(g.state(), GuardState::Idle);
        g.step(10.0 * NS, true, totals(1.0));
        assert!(matches!(g.state(), GuardState::Armed { b: None, .. }));
    }

    #[test]
    fn test_guard_fires_once_then_waits_for_next_beta() {
        let cfg = ProcessorConfig::default();
        let mut g = FirstBetaGuard::from_config(&cfg);
        g.step(0.0, true, totals(7.0));
        let hit = g.step(5000.0 * NS, false, totals(8.0));
        let pair = hit.coincidence.expect("|0 - 5000| > 4000");
        assert!(close(pair.gap_ns, -5000.0));
        assert_eq!(pair.first.all(), Some(7.0));
        assert!(matches!(g.state(), GuardState::AwaitingNextBeta { .. }));

        // Suppressed: further untagged triggers emit nothing.
        assert_eq!(g.step(12_000.0 * NS, false, totals(9.0)), Step::default());
        assert_eq!(g.step(20_000.0 * NS, false, totals(9.0)), Step::default());

        // A new beta re-arms with B at the previous beta.
        g.step(30_000.0 * NS, true, totals(3.0));
        match g.state() {
            GuardState::Armed { a, b, .. } => {
                assert!(close(a, 30_000.0 * NS));
                assert_eq!(b, Some(0.0));
            }
            other => panic!("expected Armed, got {:?}", other),
        }
    }

    #[test]
    fn test_guard_short_gap_keeps_advancing_b() {
        let cfg = ProcessorConfig::default();
        let mut g = FirstBetaGuard::from_config(&cfg);
        g.step(0.0, true, totals(1.0));
        assert!(g.step(1000.0 * NS, false, totals(1.0)).coincidence.is_none());
        // B moved to 1000 ns; this trigger measures a − b = −1000 again.
        assert!(g.step(9000.0 * NS, false, totals(1.0)).coincidence.is_none());
        // B now at 9000 ns.
        let s = g.step(9500.0 * NS, false, totals(1.0));
        assert!(close(s.coincidence.map(|p| p.gap_ns).unwrap_or(0.0), -9000.0));
    }

    #[test]
    fn test_guard_beta_rearm_compares_against_previous_beta() {
        let cfg = ProcessorConfig::default();
        let mut g = FirstBetaGuard::from_config(&cfg);
        g.step(0.0, true, totals(1.0));
        g.step(6000.0 * NS, true, totals(2.0));
        // a = 6000, b = 0 → gap 6000 on the next trigger.
        let s = g.step(6100.0 * NS, false, totals(3.0));
        let pair = s.coincidence.expect("a − b = 6000 ns");
        assert!(close(pair.gap_ns, 6000.0));
        assert_eq!(pair.first.all(), Some(2.0));
    }

    // ── Bank & gate ───────────────────────────────────────────────────────

    #[test]
    fn test_bank_end_to_end_pair() {
        let cfg = ProcessorConfig::default();
        let mut bank = CoincidenceBank::new(&cfg);
        let phase = AcquisitionPhase::new();
        let t1 = 1.0;
        let r1 = bank.observe(&phase, &CoincidenceInput { time: Some(t1), beta: true, totals: totals(120.0) });
        assert!(r1.is_empty());
        let r2 = bank.observe(
            &phase,
            &CoincidenceInput { time: Some(t1 + 400.0 * NS), beta: false, totals: totals(100.0) },
        );
        let pair = r2.get(ClassifierKind::BetaNonBeta).expect("400 ns in (300, 550)");
        assert_eq!(pair.first.get(RingSlot::All), Some(120.0));
        assert_eq!(pair.second.get(RingSlot::All), Some(100.0));
        assert!(r2.get(ClassifierKind::BetaBeta).is_none());
        assert!(r2.gap(ClassifierKind::BetaBeta).is_none());
    }

    #[test]
    fn test_bank_skips_ineligible_triggers() {
        let cfg = ProcessorConfig::default();
        let mut bank = CoincidenceBank::new(&cfg);
        let background = AcquisitionPhase { background: true, ..AcquisitionPhase::new() };
        bank.observe(&background, &input(0.0, true, 1.0));
        for kind in [ClassifierKind::BetaBeta, ClassifierKind::BetaNonBeta, ClassifierKind::AnyAny] {
            assert_eq!(bank.sliding(kind).and_then(SlidingPair::pending_time), None);
        }
        assert_eq!(bank.guard().state(), GuardState::Idle);

        let phase = AcquisitionPhase::new();
        let r = bank.observe(&phase, &CoincidenceInput { time: None, beta: true, totals: totals(1.0) });
        assert!(r.is_empty());
        assert_eq!(bank.guard().state(), GuardState::Idle);
    }

    #[test]
    fn test_bank_reset_empties_slots() {
        let cfg = ProcessorConfig::default();
        let mut bank = CoincidenceBank::new(&cfg);
        let phase = AcquisitionPhase::new();
        bank.observe(&phase, &input(0.0, true, 1.0));
        bank.reset();
        assert_eq!(bank.sliding(ClassifierKind::AnyAny).and_then(SlidingPair::pending_time), None);
        assert_eq!(bank.guard().state(), GuardState::Idle);
    }
}
