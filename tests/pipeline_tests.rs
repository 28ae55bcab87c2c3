//! End-to-end trigger pipeline tests.
//!
//! Drives owned [`Trigger`]s through a [`TriggerProcessor`] and checks ring totals,
//! beta tagging, classifier emissions and the histogram fills they produce.

use mtas_core::coincidence::ClassifierKind;
use mtas_core::ring::{ModuleSum, RingSlot, NO_DATA};
use mtas_core::sink::{NullSink, RecordingSink};
use mtas_core::spectra::{PairMember, Spectrum};
use mtas_core::{ChannelEvent, DataQualityWarning, Family, ProcessorConfig, Trigger, TriggerProcessor};

// ── Helpers ──────────────────────────────────────────────────────────────────

const NS: f64 = 1.0e-8;

fn processor() -> TriggerProcessor {
    TriggerProcessor::new(ProcessorConfig::default()).expect("default config is valid")
}

fn full_central(energy: f64, time: f64) -> Trigger {
    (1..=12).fold(Trigger::new(), |t, i| {
        t.with(Family::Calorimeter, ChannelEvent::new(format!("C{i}"), energy, time, i))
    })
}

fn beta_at(trigger: Trigger, time: f64) -> Trigger {
    trigger.with(Family::Silicon, ChannelEvent::new("T1", 2500.0, time, 1))
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ── Beta then non-beta ───────────────────────────────────────────────────────

#[test]
fn test_beta_then_non_beta_scenario() {
    let mut p = processor();
    let t1 = 5.0;

    let first = beta_at(full_central(120.0, t1), t1);
    let out1 = p.process(&first.input(), NullSink);
    assert!(out1.beta.is_tagged());
    assert_eq!(out1.beta.time, Some(t1));
    assert!(close(out1.rings.totals.central().unwrap_or(NO_DATA), 120.0));
    assert!(close(out1.rings.totals.all().unwrap_or(NO_DATA), 120.0));
    assert!(out1.coincidences.is_empty());

    let second = Trigger::new().with(Family::Calorimeter, ChannelEvent::new("I1", 200.0, t1 + 400.0 * NS, 13));
    let out2 = p.process(&second.input(), NullSink);
    assert!(!out2.beta.is_tagged());
    assert_eq!(out2.rings.totals.get(RingSlot::Inner), Some(100.0));

    let pair = out2
        .coincidences
        .get(ClassifierKind::BetaNonBeta)
        .expect("400 ns lies inside (300, 550)");
    assert!(close(pair.first.all().unwrap_or(NO_DATA), 120.0));
    assert!(close(pair.second.all().unwrap_or(NO_DATA), 100.0));
    assert!(close(pair.gap_ns, 400.0));
    assert!(out2.coincidences.get(ClassifierKind::BetaBeta).is_none());
}

#[test]
fn test_beta_pairs_with_in_window_trigger_after_early_one() {
    let mut p = processor();
    let mut rec = RecordingSink::new();
    let t0 = 4.0;
    p.process(&beta_at(full_central(120.0, t0), t0).input(), &mut rec);

    let early = Trigger::new().with(Family::Calorimeter, ChannelEvent::new("I1", 60.0, t0 + 100.0 * NS, 13));
    let out = p.process(&early.input(), &mut rec);
    assert!(out.coincidences.get(ClassifierKind::BetaNonBeta).is_none());
    assert!(close(out.coincidences.gap(ClassifierKind::BetaNonBeta).unwrap_or(NO_DATA), 100.0));

    let late = Trigger::new().with(Family::Calorimeter, ChannelEvent::new("O1", 300.0, t0 + 400.0 * NS, 37));
    let out = p.process(&late.input(), &mut rec);
    let pair = out
        .coincidences
        .get(ClassifierKind::BetaNonBeta)
        .expect("400 ns after the beta lies inside (300, 550)");
    assert!(close(pair.gap_ns, 400.0));
    assert!(close(pair.first.all().unwrap_or(NO_DATA), 120.0));
    assert!(close(pair.second.all().unwrap_or(NO_DATA), 150.0));
    assert!(pair.fresh_first);

    let gaps = rec.values(Spectrum::CoincidenceGap { kind: ClassifierKind::BetaNonBeta });
    assert_eq!(gaps.len(), 2);
}

// ── Beta-beta ────────────────────────────────────────────────────────────────

#[test]
fn test_beta_beta_stream_emits_once_and_records_both_gaps() {
    let mut p = processor();
    let mut rec = RecordingSink::new();
    let base = 2.0;
    let mut emitted = 0;
    for ns in [0.0, 500.0, 1300.0] {
        let t = base + ns * NS;
        let trig = beta_at(full_central(60.0, t), t);
        let out = p.process(&trig.input(), &mut rec);
        emitted += usize::from(out.coincidences.get(ClassifierKind::BetaBeta).is_some());
    }
    assert_eq!(emitted, 1);

    let gaps = rec.values(Spectrum::CoincidenceGap { kind: ClassifierKind::BetaBeta });
    assert_eq!(gaps.len(), 2);
    assert!(close(gaps[0], 500.0));
    assert!(close(gaps[1], 800.0));

    let first = Spectrum::CorrelatedEnergy {
        kind: ClassifierKind::BetaBeta,
        member: PairMember::First,
        slot: RingSlot::Central,
    };
    assert_eq!(rec.count(first), 1);
}

// ── Phase gating ─────────────────────────────────────────────────────────────

#[test]
fn test_background_window_keeps_classifiers_idle() {
    let mut p = processor();
    let bgu = Trigger::new().with(Family::Logic, ChannelEvent::new("BGU", 5.0, 1.0, 1));
    p.process(&bgu.input(), NullSink);
    assert!(p.context().phase.background);

    let t = 1.0 + 10.0 * NS;
    let a = beta_at(full_central(100.0, t), t);
    let b = Trigger::new().with(Family::Calorimeter, ChannelEvent::new("I1", 200.0, t + 400.0 * NS, 13));
    p.process(&a.input(), NullSink);
    let out = p.process(&b.input(), NullSink);
    assert!(out.coincidences.is_empty());
    assert!(out.coincidences.gaps.is_empty());
}

#[test]
fn test_tape_move_blocks_and_release_restores() {
    let mut p = processor();
    let tmu = Trigger::new().with(Family::Logic, ChannelEvent::new("TMU", 5.0, 1.0, 1));
    p.process(&tmu.input(), NullSink);
    let t = 1.5;
    let out = p.process(&beta_at(full_central(100.0, t), t).input(), NullSink);
    assert!(out.coincidences.gaps.is_empty());

    let tmd = Trigger::new().with(Family::Logic, ChannelEvent::new("TMD", 5.0, 2.0, 1));
    p.process(&tmd.input(), NullSink);
    let t2 = 3.0;
    p.process(&beta_at(full_central(100.0, t2), t2).input(), NullSink);
    let out = p.process(
        &Trigger::new()
            .with(Family::Calorimeter, ChannelEvent::new("I1", 200.0, t2 + 350.0 * NS, 13))
            .input(),
        NullSink,
    );
    assert!(out.coincidences.get(ClassifierKind::BetaNonBeta).is_some());
}

// ── Ring aggregation through the pipeline ────────────────────────────────────

#[test]
fn test_partial_central_keeps_all_and_flags_central() {
    let mut p = processor();
    let trig = (1..=5).fold(Trigger::new(), |t, i| {
        t.with(Family::Calorimeter, ChannelEvent::new(format!("C{i}"), 120.0, 1.0, i))
    });
    let out = p.analyse(&trig.input());
    assert_eq!(out.rings.totals.central(), None);
    assert_eq!(out.rings.totals.to_array()[RingSlot::Central.index()], NO_DATA);
    assert!(close(out.rings.totals.all().unwrap_or(NO_DATA), 50.0));
}

#[test]
fn test_module_pairs_never_pending() {
    let mut p = processor();
    let trig = Trigger::new()
        .with(Family::Calorimeter, ChannelEvent::new("IL1", 400.0, 1.0, 13))
        .with(Family::Calorimeter, ChannelEvent::new("IR1", 600.0, 1.0, 14))
        .with(Family::Calorimeter, ChannelEvent::new("OL2", 100.0, 1.0, 39));
    let out = p.analyse(&trig.input());
    assert_eq!(out.rings.modules.get(6), Some(ModuleSum::Paired(500.0)));
    assert_eq!(out.rings.modules.get(19), Some(ModuleSum::Single));
    assert!(out.rings.modules.values().iter().all(|&v| v >= 0.0 || v == NO_DATA));
}

#[test]
fn test_duplicate_and_filtered_hits() {
    let mut p = processor();
    let trig = Trigger::new()
        .with(Family::Calorimeter, ChannelEvent::new("M3", 300.0, 1.0, 29))
        .with(Family::Calorimeter, ChannelEvent::new("M3", 900.0, 1.0, 29))
        .with(Family::Calorimeter, ChannelEvent::new("M4", 45_000.0, 1.0, 31))
        .with(Family::Silicon, ChannelEvent::new("T2", 150.0, 1.0, 2));
    let out = p.analyse(&trig.input());
    assert_eq!(out.maps.calorimeter.len(), 1);
    assert!(out.maps.silicon.is_empty());
    assert!(!out.beta.is_tagged());
    assert_eq!(
        out.warnings,
        vec![DataQualityWarning::DuplicateSignal { family: Family::Calorimeter, subtype: "M3".into() }]
    );
}

// ── Guarded classifier ───────────────────────────────────────────────────────

#[test]
fn test_first_beta_only_emits_once_per_beta() {
    let mut p = processor();
    let t0 = 10.0;
    p.process(&beta_at(full_central(80.0, t0), t0).input(), NullSink);

    let mut fired = Vec::new();
    for ns in [5000.0, 10_000.0, 15_000.0] {
        let trig = Trigger::new().with(Family::Calorimeter, ChannelEvent::new("O1", 100.0, t0 + ns * NS, 37));
        let out = p.process(&trig.input(), NullSink);
        fired.push(out.coincidences.get(ClassifierKind::FirstBetaOnly).is_some());
    }
    assert_eq!(fired, vec![true, false, false]);
}
