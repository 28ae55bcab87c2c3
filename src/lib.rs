//! # mtas-core
//!
//! Per-trigger processing core for a ring-segmented total-absorption calorimeter
//! coupled to a silicon beta-tag detector.
//!
//! ---
//!
//! ## What happens to one trigger
//!
//! Every triggered coincidence delivers a bundle of decoded, calibrated channel hits
//! grouped by detector family. The core turns that bundle into four things:
//!
//! **Signal maps**: one deduplicated, threshold-filtered map per family. A subtype that
//! fires twice in one trigger keeps its first hit and raises a data-quality warning.
//!
//! **Ring sums**: calorimeter energies folded into the Central/Inner/Middle/Outer rings
//! and their total, plus front+back sums for each of the 24 modules.
//!
//! **Acquisition phase**: logic pulses (tape move, measurement, background, light pulser,
//! irradiation, cycle trigger) drive a run-long state machine that gates every spectrum.
//!
//! **Coincidences**: four sliding-pair correlators scan the ordered trigger stream for
//! beta/gamma cascades inside fixed nanosecond windows.
//!
//! ---
//!
//! ## The pipeline
//!
//! ```text
//! DetectorSummary ×6 → SignalMapBuilder → RingAggregator ─┐
//!                                      → BetaGate ────────┼→ CoincidenceBank → HistogramSink
//!                                      → PhaseStateMachine┘
//!                            (RunContext: phase, cycle counter, classifier windows)
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`channel`] | [`ChannelEvent`], [`DetectorSummary`], [`Family`] | Input seam: one family's hits for one trigger |
//! | [`signal_map`] | [`SignalMap`], [`SignalMapBuilder`] | First-wins dedup and family energy filters |
//! | [`ring`] | [`RingTotals`], [`ModulePairs`], [`RingAggregator`] | Ring totals and front+back module pairing |
//! | [`beta`] | [`BetaTag`], [`BetaGate`] | Silicon beta tag and beta time |
//! | [`phase`] | [`AcquisitionPhase`], [`PhaseStateMachine`] | Logic-pulse driven run phase and cycle counter |
//! | [`coincidence`] | [`CoincidenceBank`], [`SlidingPair`], [`FirstBetaGuard`] | Time-coincidence classifiers |
//! | [`auxiliary`] | [`auxiliary::ImplantSummary`] | Germanium, implant SiPM and reference-module summaries |
//! | [`processor`] | [`TriggerProcessor`], [`RunContext`] | Wires one trigger through every stage |
//! | [`spectra`] | [`Spectrum`] | Maps a processed trigger onto histogram fills |
//! | [`sink`] | [`HistogramSink`] | Fire-and-forget histogram output seam |
//! | [`config`] | [`ProcessorConfig`] | Thresholds, windows and counts with validated defaults |
//! | [`warning`] | [`DataQualityWarning`] | Non-fatal anomalies, logged and collected |
//! | [`record`] | [`record::TriggerRecord`] | Flat serialisable per-trigger record (requires `serde`) |
//!
//! ## `no_std`
//!
//! The crate is `#![no_std]` + `alloc` by default. Enable `std` for host builds,
//! `serde` for serialisation of configs and records, and `python-ffi` for the PyO3
//! bindings used by offline analysis scripts.
//!
//! ## License
//!
//! Business Source License 1.1.

#![cfg_attr(not(any(feature = "std", feature = "python-ffi")), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

#[cfg(any(feature = "std", feature = "python-ffi"))]
extern crate std;

pub mod channel;
pub mod config;
pub mod warning;
pub mod signal_map;
pub mod ring;
pub mod beta;
pub mod phase;
pub mod coincidence;
pub mod auxiliary;
pub mod sink;
pub mod spectra;
pub mod processor;
#[cfg(feature = "serde")]
pub mod record;

#[cfg(feature = "python-ffi")]
pub mod ffi;

pub use beta::{BetaGate, BetaTag};
pub use channel::{ChannelEvent, ChannelSample, DetectorSummary, Family};
pub use coincidence::{
    ClassifierKind, Coincidence, CoincidenceBank, CoincidenceReport, FirstBetaGuard, SlidingPair,
};
pub use config::{CoincidenceWindow, ConfigError, ProcessorConfig};
pub use phase::{AcquisitionPhase, LogicMask, LogicPulse, PhaseCategory, PhaseStateMachine};
pub use processor::{RunContext, Trigger, TriggerInput, TriggerOutcome, TriggerProcessor};
pub use ring::{ModulePairs, ModuleSum, Ring, RingAggregator, RingSlot, RingTotals};
pub use signal_map::{SignalMap, SignalMapBuilder};
pub use sink::HistogramSink;
pub use spectra::Spectrum;
pub use warning::DataQualityWarning;
