/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Ring totals and front+back module pairing for the calorimeter.
//!
//! - [`RingTotals`]: `[All, Central, Inner, Middle, Outer]` energy sums.
//! - [`ModulePairs`]: one front+back sum per physical module.
//! - [`RingAggregator`]: the single pass that fills both from the calorimeter map.
//!
//! # Geometry
//!
//! ```text
//! Central  12 readouts, one shared ring      contribution E / 12
//! Inner     6 modules × (front, back)        contribution E / 2
//! Middle    6 modules × (front, back)        contribution E / 2
//! Outer     6 modules × (front, back)        contribution E / 2
//! module index = floor((location − 1) / 2), modules 0–5 Central, 6–11 Inner, 12–17 Middle, 18–23 Outer
//! ```
//!
//! # Invariants
//!
//! - `All` is the sum of every contribution added so far.
//! - When the Central multiplicity is neither 0 nor complete, Central is reported as
//!   "no data" while `All` keeps the partial Central contribution already summed.
//! - No module is left pending at the end of a trigger: a lone readout resolves to
//!   [`ModuleSum::Single`].

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use crate::config::ProcessorConfig;
use crate::signal_map::SignalMap;
use crate::warning::{raise, DataQualityWarning};

/// Value handed to the histogram sink for a slot without data.
pub const NO_DATA: f64 = -1.0;

// ─── Ring ────────────────────────────────────────────────────────────────────

/// Concentric calorimeter ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Ring {
    /// Innermost ring around the implantation point.
    Central,
    /// First ring of hexagonal modules.
    Inner,
    /// Second ring.
    Middle,
    /// Outermost ring.
    Outer,
}

impl Ring {
    /// Every ring from the centre outward.
    pub const ALL: [Ring; 4] = [Ring::Central, Ring::Inner, Ring::Middle, Ring::Outer];

    /// Ring named by the first character of a calorimeter subtype.
    pub fn from_subtype(subtype: &str) -> Option<Ring> {
        match subtype.as_bytes().first() {
            Some(b'C') => Some(Ring::Central),
            Some(b'I') => Some(Ring::Inner),
            Some(b'M') => Some(Ring::Middle),
            Some(b'O') => Some(Ring::Outer),
            _ => None,
        }
    }

    /// Divisor applied to one readout's energy before it is summed.
    pub fn readout_divisor(&self) -> f64 {
        match self {
            Ring::Central => 12.0,
            Ring::Inner | Ring::Middle | Ring::Outer => 2.0,
        }
    }

    /// Slot of this ring in [`RingTotals`].
    pub fn slot(&self) -> RingSlot {
        match self {
            Ring::Central => RingSlot::Central,
            Ring::Inner => RingSlot::Inner,
            Ring::Middle => RingSlot::Middle,
            Ring::Outer => RingSlot::Outer,
        }
    }

    /// Module indices belonging to this ring for the standard 24-module layout.
    pub fn modules(&self) -> core::ops::Range<usize> {
        match self {
            Ring::Central => 0..6,
            Ring::Inner => 6..12,
            Ring::Middle => 12..18,
            Ring::Outer => 18..24,
        }
    }
}

/// Position in the [`RingTotals`] sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RingSlot {
    /// Whole detector.
    All,
    /// Central ring.
    Central,
    /// Inner ring.
    Inner,
    /// Middle ring.
    Middle,
    /// Outer ring.
    Outer,
}

impl RingSlot {
    /// Slots in sequence order.
    pub const ALL: [RingSlot; 5] =
        [RingSlot::All, RingSlot::Central, RingSlot::Inner, RingSlot::Middle, RingSlot::Outer];

    /// Index into the five-slot sequence.
    pub fn index(&self) -> usize {
        match self {
            RingSlot::All => 0,
            RingSlot::Central => 1,
            RingSlot::Inner => 2,
            RingSlot::Middle => 3,
            RingSlot::Outer => 4,
        }
    }
}

// ─── RingTotals ──────────────────────────────────────────────────────────────

/// Ring energy sums of one trigger; `None` means no contribution.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingTotals {
    slots: [Option<f64>; 5],
}

impl RingTotals {
    /// Totals with no data in any slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum in `slot`.
    pub fn get(&self, slot: RingSlot) -> Option<f64> {
        self.slots[slot.index()]
    }

    /// Sum in `slot`, or [`NO_DATA`].
    pub fn value_or_no_data(&self, slot: RingSlot) -> f64 {
        self.get(slot).unwrap_or(NO_DATA)
    }

    /// All five slots in sequence order with [`NO_DATA`] for empty ones.
    pub fn to_array(&self) -> [f64; 5] {
        let mut out = [NO_DATA; 5];
        for slot in RingSlot::ALL {
            out[slot.index()] = self.value_or_no_data(slot);
        }
        out
    }

    /// Whole-detector sum.
    pub fn all(&self) -> Option<f64> {
        self.get(RingSlot::All)
    }

    /// Central sum.
    pub fn central(&self) -> Option<f64> {
        self.get(RingSlot::Central)
    }

    /// Sum of the Inner, Middle and Outer slots that hold data.
    pub fn outer_rings(&self) -> Option<f64> {
        [RingSlot::Inner, RingSlot::Middle, RingSlot::Outer]
            .iter()
            .filter_map(|&s| self.get(s))
            .fold(None, |acc, e| Some(acc.unwrap_or(0.0) + e))
    }

    /// Add `energy` to `ring` and to the whole-detector sum.
    pub fn add(&mut self, ring: Ring, energy: f64) {
        for idx in [ring.slot().index(), RingSlot::All.index()] {
            let slot = &mut self.slots[idx];
            *slot = Some(slot.unwrap_or(0.0) + energy);
        }
    }

    /// Mark `slot` as "no data" without touching any other slot.
    pub fn invalidate(&mut self, slot: RingSlot) {
        self.slots[slot.index()] = None;
    }
}

// ─── Module pairing ──────────────────────────────────────────────────────────

/// Final front+back state of one module.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ModuleSum {
    /// No readout fired.
    #[default]
    NoSignal,
    /// Only one of the two readouts fired.
    Single,
    /// Both readouts fired; the value is the averaged pair energy.
    Paired(f64),
}

impl ModuleSum {
    /// Sink-facing value: 0 for no signal, −1 for a lone readout, the sum otherwise.
    pub fn value(&self) -> f64 {
        match *self {
            ModuleSum::NoSignal => 0.0,
            ModuleSum::Single => NO_DATA,
            ModuleSum::Paired(e) => e,
        }
    }

    /// Paired energy, if both readouts fired.
    pub fn paired(&self) -> Option<f64> {
        match *self {
            ModuleSum::Paired(e) => Some(e),
            _ => None,
        }
    }
}

/// In-pass state of one module.
#[derive(Clone, Copy, Debug, PartialEq)]
enum PairSlot {
    Empty,
    /// Half of the first readout's energy, waiting for its partner.
    Pending(f64),
    Paired(f64),
}

/// Front+back sums for every module of one trigger.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModulePairs {
    modules: Vec<ModuleSum>,
}

impl ModulePairs {
    /// Number of modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// `true` when configured with zero modules.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// State of module `index`.
    pub fn get(&self, index: usize) -> Option<ModuleSum> {
        self.modules.get(index).copied()
    }

    /// Every module in index order.
    pub fn iter(&self) -> core::slice::Iter<'_, ModuleSum> {
        self.modules.iter()
    }

    /// Sink-facing values for every module.
    pub fn values(&self) -> Vec<f64> {
        self.modules.iter().map(ModuleSum::value).collect()
    }

    /// Sink-facing values for the modules of `ring`.
    pub fn ring_values(&self, ring: Ring) -> impl Iterator<Item = f64> + '_ {
        let range = ring.modules();
        self.modules
            .get(range.start.min(self.modules.len())..range.end.min(self.modules.len()))
            .unwrap_or(&[])
            .iter()
            .map(ModuleSum::value)
    }
}

// ─── Hit pattern & timing diagnostics ────────────────────────────────────────

/// Which rings received a contribution in this trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingHits {
    /// Central fired.
    pub central: bool,
    /// Inner fired.
    pub inner: bool,
    /// Middle fired.
    pub middle: bool,
    /// Outer fired.
    pub outer: bool,
}

impl RingHits {
    fn mark(&mut self, ring: Ring) {
        match ring {
            Ring::Central => self.central = true,
            Ring::Inner => self.inner = true,
            Ring::Middle => self.middle = true,
            Ring::Outer => self.outer = true,
        }
    }

    /// Whether `ring` fired.
    pub fn contains(&self, ring: Ring) -> bool {
        match ring {
            Ring::Central => self.central,
            Ring::Inner => self.inner,
            Ring::Middle => self.middle,
            Ring::Outer => self.outer,
        }
    }

    /// `true` when exactly `ring` fired and no other.
    pub fn only(&self, ring: Ring) -> bool {
        Ring::ALL.iter().all(|&r| self.contains(r) == (r == ring))
    }

    /// `true` when all four rings fired.
    pub fn all_rings(&self) -> bool {
        Ring::ALL.iter().all(|&r| self.contains(r))
    }
}

/// Earliest sample time per ring group, fed to the beta-gamma timing spectra.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EarliestTimes {
    /// Earliest Central readout.
    pub central: Option<f64>,
    /// Earliest Inner readout.
    pub inner: Option<f64>,
    /// Earliest Inner, Middle or Outer readout.
    pub outer_rings: Option<f64>,
}

fn keep_earliest(slot: &mut Option<f64>, t: f64) {
    if slot.map_or(true, |cur| t < cur) {
        *slot = Some(t);
    }
}

// ─── RingAggregator ──────────────────────────────────────────────────────────

/// Everything the aggregation pass derives from the calorimeter map.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RingSummary {
    /// Ring sums.
    pub totals: RingTotals,
    /// Front+back module sums.
    pub modules: ModulePairs,
    /// Rings that received a contribution.
    pub hits: RingHits,
    /// Earliest sample time per ring group.
    pub earliest: EarliestTimes,
    /// Smallest single Central readout energy.
    pub min_central_energy: Option<f64>,
    /// Central-ring subtypes seen in the raw list.
    pub central_multiplicity: usize,
}

/// Folds the calorimeter map into ring totals and module pairs.
#[derive(Clone, Debug)]
pub struct RingAggregator {
    module_count: usize,
    full_central: usize,
}

impl RingAggregator {
    /// Aggregator using the module count and Central multiplicity from `config`.
    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self {
            module_count: config.module_count,
            full_central: config.central_multiplicity,
        }
    }

    /// Module index for a channel location, if it names a configured module.
    pub fn module_index(&self, location: i32) -> Option<usize> {
        let idx = (i64::from(location) - 1).div_euclid(2);
        usize::try_from(idx).ok().filter(|&i| i < self.module_count)
    }

    /// Run the single aggregation pass over `map`.
    pub fn aggregate(&self, map: &SignalMap, warnings: &mut Vec<DataQualityWarning>) -> RingSummary {
        let mut totals = RingTotals::new();
        let mut hits = RingHits::default();
        let mut earliest = EarliestTimes::default();
        let mut min_central: Option<f64> = None;
        let mut pairs = vec![PairSlot::Empty; self.module_count];

        for sample in map {
            let energy = sample.calibrated_energy();
            let time = sample.timestamp();

            if let Some(ring) = Ring::from_subtype(sample.subtype()) {
                totals.add(ring, energy / ring.readout_divisor());
                hits.mark(ring);
                match ring {
                    Ring::Central => {
                        if min_central.map_or(true, |m| energy < m) {
                            min_central = Some(energy);
                        }
                        keep_earliest(&mut earliest.central, time);
                    }
                    Ring::Inner => {
                        keep_earliest(&mut earliest.inner, time);
                        keep_earliest(&mut earliest.outer_rings, time);
                    }
                    Ring::Middle | Ring::Outer => keep_earliest(&mut earliest.outer_rings, time),
                }
            }

            let Some(module) = self.module_index(sample.location()) else {
                raise(
                    warnings,
                    DataQualityWarning::ModuleOutOfRange {
                        subtype: String::from(sample.subtype()),
                        location: sample.location(),
                        module_count: self.module_count,
                    },
                );
                continue;
            };

            pairs[module] = match pairs[module] {
                PairSlot::Empty => PairSlot::Pending(energy / 2.0),
                PairSlot::Pending(half) => PairSlot::Paired(half + energy / 2.0),
                PairSlot::Paired(sum) => {
                    raise(
                        warnings,
                        DataQualityWarning::ThirdModuleSignal {
                            subtype: String::from(sample.subtype()),
                            module,
                        },
                    );
                    PairSlot::Paired(sum)
                }
            };
        }

        let central_multiplicity = map.central_seen();
        if central_multiplicity != 0 && central_multiplicity != self.full_central {
            // All keeps the partial Central contribution.
            totals.invalidate(RingSlot::Central);
        }

        let modules = pairs
            .into_iter()
            .map(|slot| match slot {
                PairSlot::Empty => ModuleSum::NoSignal,
                PairSlot::Pending(_) => ModuleSum::Single,
                PairSlot::Paired(e) => ModuleSum::Paired(e),
            })
            .collect();

        RingSummary {
            totals,
            modules: ModulePairs { modules },
            hits,
            earliest,
            min_central_energy: min_central,
            central_multiplicity,
        }
    }
}
