/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Per-family signal maps.
//!
//! - [`SignalMap`]: subtype → [`ChannelSample`] for one family and one trigger.
//! - [`SignalMapBuilder`]: first-wins deduplication plus the family energy filter.
//!
//! # Invariants
//!
//! - A map never holds two samples with the same subtype; the first hit wins and every
//!   repeat raises [`DataQualityWarning::DuplicateSignal`].
//! - Every stored sample passed its family's raw-energy filter. Filtered hits are
//!   dropped silently.
//! - Iteration follows arrival order, so downstream pairing is deterministic.

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::channel::{ChannelEvent, ChannelSample, Family};
use crate::config::ProcessorConfig;
use crate::warning::{raise, DataQualityWarning};

/// Key prefix marking a Central-ring calorimeter channel.
pub const CENTRAL_MARKER: char = 'C';

// ─── SignalMap ───────────────────────────────────────────────────────────────

/// Deduplicated, filtered samples of one family for the current trigger.
#[derive(Clone, Debug, Default)]
pub struct SignalMap {
    samples: Vec<ChannelSample>,
    index: HashMap<String, usize>,
    central_seen: usize,
    max_location: Option<i32>,
}

impl SignalMap {
    /// Construct an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every sample and reset the bookkeeping counters.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.index.clear();
        self.central_seen = 0;
        self.max_location = None;
    }

    /// Number of stored samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` when no sample survived.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Whether `subtype` is present.
    pub fn contains(&self, subtype: &str) -> bool {
        self.index.contains_key(subtype)
    }

    /// Sample stored under `subtype`.
    pub fn get(&self, subtype: &str) -> Option<&ChannelSample> {
        self.index.get(subtype).map(|&i| &self.samples[i])
    }

    /// Samples in arrival order.
    pub fn iter(&self) -> core::slice::Iter<'_, ChannelSample> {
        self.samples.iter()
    }

    /// Central-ring subtypes seen in the raw list, counted before dedup and filtering.
    ///
    /// Only maintained for the calorimeter family.
    pub fn central_seen(&self) -> usize {
        self.central_seen
    }

    /// Largest location among stored samples.
    pub fn max_location(&self) -> Option<i32> {
        self.max_location
    }

    fn insert(&mut self, sample: ChannelSample) {
        self.max_location = Some(match self.max_location {
            Some(m) => m.max(sample.location()),
            None => sample.location(),
        });
        self.index.insert(String::from(sample.subtype()), self.samples.len());
        self.samples.push(sample);
    }
}

impl<'a> IntoIterator for &'a SignalMap {
    type Item = &'a ChannelSample;
    type IntoIter = core::slice::Iter<'a, ChannelSample>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ─── Energy filter ───────────────────────────────────────────────────────────

/// Raw-energy acceptance rule of one family.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EnergyFilter {
    /// `0 < E <= ceiling`.
    Positive {
        /// Inclusive ceiling.
        ceiling: f64,
    },
    /// `floor <= E <= ceiling`.
    Floor {
        /// Inclusive floor.
        floor: f64,
        /// Inclusive ceiling.
        ceiling: f64,
    },
    /// Every hit is kept.
    Unfiltered,
}

impl EnergyFilter {
    /// Whether a raw energy passes.
    pub fn accepts(&self, energy: f64) -> bool {
        match *self {
            EnergyFilter::Positive { ceiling } => energy > 0.0 && energy <= ceiling,
            EnergyFilter::Floor { floor, ceiling } => energy >= floor && energy <= ceiling,
            EnergyFilter::Unfiltered => true,
        }
    }
}

// ─── SignalMapBuilder ────────────────────────────────────────────────────────

/// Builds a [`SignalMap`] from one family's raw hit list.
#[derive(Clone, Debug)]
pub struct SignalMapBuilder {
    family: Family,
    filter: EnergyFilter,
}

impl SignalMapBuilder {
    /// Builder for `family` using the thresholds in `config`.
    ///
    /// Silicon uses the fixed online floor instead of per-channel calibration
    /// thresholds. Logic pulses are not filtered here; the phase state machine
    /// applies its own threshold.
    pub fn for_family(family: Family, config: &ProcessorConfig) -> Self {
        let filter = match family {
            Family::Silicon => EnergyFilter::Floor {
                floor: config.silicon_energy_floor,
                ceiling: config.energy_ceiling,
            },
            Family::Logic => EnergyFilter::Unfiltered,
            Family::Calorimeter | Family::Germanium | Family::Sipm | Family::Reference => {
                EnergyFilter::Positive { ceiling: config.energy_ceiling }
            }
        };
        Self { family, filter }
    }

    /// Family this builder serves.
    pub fn family(&self) -> Family {
        self.family
    }

    /// Active energy filter.
    pub fn filter(&self) -> EnergyFilter {
        self.filter
    }

    /// Clear `map` and refill it from `events`.
    pub fn fill(
        &self,
        map: &mut SignalMap,
        events: &[ChannelEvent],
        warnings: &mut Vec<DataQualityWarning>,
    ) {
        map.clear();
        for ev in events {
            if self.family == Family::Calorimeter && ev.subtype.starts_with(CENTRAL_MARKER) {
                map.central_seen += 1;
            }
            if map.contains(&ev.subtype) {
                raise(
                    warnings,
                    DataQualityWarning::DuplicateSignal {
                        family: self.family,
                        subtype: ev.subtype.clone(),
                    },
                );
                continue;
            }
            if !self.filter.accepts(ev.energy) {
                continue;
            }
            map.insert(ChannelSample::from(ev));
        }
    }

    /// Build a fresh map from `events`.
    pub fn build(&self, events: &[ChannelEvent], warnings: &mut Vec<DataQualityWarning>) -> SignalMap {
        let mut map = SignalMap::new();
        self.fill(&mut map, events, warnings);
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn hit(subtype: &str, energy: f64, location: i32) -> ChannelEvent {
        ChannelEvent::new(subtype, energy, 1.0e-3, location)
    }

    fn builder(family: Family) -> SignalMapBuilder {
        SignalMapBuilder::for_family(family, &ProcessorConfig::default())
    }

    #[test]
    fn test_empty_input_builds_empty_map() {
        let mut warnings = Vec::new();
        let map = builder(Family::Calorimeter).build(&[], &mut warnings);
        assert!(map.is_empty());
        assert_eq!(map.max_location(), None);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_duplicate_keeps_first_and_warns() {
        let mut warnings = Vec::new();
        let events = vec![hit("I3", 400.0, 13), hit("I3", 900.0, 13)];
        let map = builder(Family::Calorimeter).build(&events, &mut warnings);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("I3").map(|s| s.raw_energy()), Some(400.0));
        assert_eq!(
            warnings,
            vec![DataQualityWarning::DuplicateSignal {
                family: Family::Calorimeter,
                subtype: "I3".into()
            }]
        );
    }

    #[test]
    fn test_calorimeter_filter_bounds() {
        let mut warnings = Vec::new();
        let events = vec![
            hit("C1", 0.0, 1),
            hit("C2", -5.0, 2),
            hit("C3", 30_000.0, 3),
            hit("C4", 30_000.5, 4),
            hit("C5", 0.5, 5),
        ];
        let map = builder(Family::Calorimeter).build(&events, &mut warnings);
        assert!(!map.contains("C1"));
        assert!(!map.contains("C2"));
        assert!(map.contains("C3"));
        assert!(!map.contains("C4"));
        assert!(map.contains("C5"));
        assert!(warnings.is_empty(), "filtered hits must not warn");
    }

    #[test]
    fn test_silicon_uses_fixed_floor() {
        let mut warnings = Vec::new();
        let events = vec![hit("T1", 199.9, 1), hit("T2", 200.0, 2), hit("B3", 30_001.0, 3)];
        let map = builder(Family::Silicon).build(&events, &mut warnings);
        assert_eq!(map.len(), 1);
        assert!(map.contains("T2"));
    }

    #[test]
    fn test_logic_is_unfiltered() {
        let mut warnings = Vec::new();
        let events = vec![hit("MSU", 0.0, 1), hit("TRU", 50_000.0, 2)];
        let map = builder(Family::Logic).build(&events, &mut warnings);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_central_count_includes_dropped_hits() {
        let mut warnings = Vec::new();
        let events = vec![
            hit("C1", 100.0, 1),
            hit("C1", 100.0, 1),
            hit("C2", 0.0, 2),
            hit("I1", 100.0, 13),
        ];
        let map = builder(Family::Calorimeter).build(&events, &mut warnings);
        assert_eq!(map.central_seen(), 3);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_max_location_over_accepted_hits() {
        let mut warnings = Vec::new();
        let events = vec![hit("I1", 100.0, 13), hit("O6", 0.0, 48), hit("M2", 50.0, 27)];
        let map = builder(Family::Calorimeter).build(&events, &mut warnings);
        assert_eq!(map.max_location(), Some(27));
    }

    #[test]
    fn test_iteration_follows_arrival_order() {
        let mut warnings = Vec::new();
        let events = vec![hit("O2", 10.0, 40), hit("C9", 10.0, 9), hit("I4", 10.0, 16)];
        let map = builder(Family::Calorimeter).build(&events, &mut warnings);
        let keys: Vec<&str> = map.iter().map(|s| s.subtype()).collect();
        assert_eq!(keys, vec!["O2", "C9", "I4"]);
    }

    #[test]
    fn test_fill_clears_previous_trigger() {
        let mut warnings = Vec::new();
        let b = builder(Family::Calorimeter);
        let mut map = SignalMap::new();
        b.fill(&mut map, &[hit("C1", 10.0, 1)], &mut warnings);
        b.fill(&mut map, &[hit("I1", 10.0, 13)], &mut warnings);
        assert_eq!(map.len(), 1);
        assert!(!map.contains("C1"));
        assert_eq!(map.central_seen(), 0);
    }
}
