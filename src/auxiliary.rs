/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Summaries of the auxiliary families: germanium monitor, implant SiPM readout and
//! reference module.
//!
//! These families go through the same [`SignalMapBuilder`](crate::signal_map::SignalMapBuilder)
//! as the calorimeter; this module only folds their maps into the handful of numbers the
//! spectra need.

use alloc::vec::Vec;

use crate::signal_map::SignalMap;

/// SiPM subtypes that make up the implant signal.
pub const IMPLANT_CHANNELS: [&str; 2] = ["implant_xa", "implant_xb"];

/// Implant detector readout of one trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImplantSummary {
    /// Raw energy summed over the implant channels.
    pub energy: f64,
    /// Accepted SiPM samples of any subtype.
    pub multiplicity: usize,
}

impl ImplantSummary {
    /// Fold the SiPM map.
    pub fn from_map(map: &SignalMap) -> Self {
        let energy = map
            .iter()
            .filter(|s| IMPLANT_CHANNELS.contains(&s.subtype()))
            .map(|s| s.raw_energy())
            .sum();
        Self { energy, multiplicity: map.len() }
    }

    /// Both implant sides fired and nothing else, the condition for implant-gated spectra.
    pub fn is_complete(&self) -> bool {
        self.multiplicity == IMPLANT_CHANNELS.len()
    }
}

/// Everything derived from the auxiliary maps of one trigger.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuxiliarySummary {
    /// Calibrated germanium energies in arrival order.
    pub germanium: Vec<f64>,
    /// Implant readout.
    pub implant: ImplantSummary,
    /// Raw energy summed over the reference module.
    pub reference_energy: f64,
}

impl AuxiliarySummary {
    /// Fold the germanium, SiPM and reference maps.
    pub fn from_maps(germanium: &SignalMap, sipm: &SignalMap, reference: &SignalMap) -> Self {
        Self {
            germanium: germanium.iter().map(|s| s.calibrated_energy()).collect(),
            implant: ImplantSummary::from_map(sipm),
            reference_energy: reference.iter().map(|s| s.raw_energy()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelEvent, Family};
    use crate::config::ProcessorConfig;
    use crate::signal_map::SignalMapBuilder;
    use alloc::vec;

    fn map(family: Family, events: &[ChannelEvent]) -> SignalMap {
        let mut warnings = Vec::new();
        SignalMapBuilder::for_family(family, &ProcessorConfig::default()).build(events, &mut warnings)
    }

    #[test]
    fn test_implant_energy_sums_only_implant_channels() {
        let sipm = map(
            Family::Sipm,
            &[
                ChannelEvent::new("implant_xa", 300.0, 0.1, 1),
                ChannelEvent::new("implant_xb", 200.0, 0.1, 2),
                ChannelEvent::new("dynode", 900.0, 0.1, 3),
            ],
        );
        let s = ImplantSummary::from_map(&sipm);
        assert_eq!(s.energy, 500.0);
        assert_eq!(s.multiplicity, 3);
        assert!(!s.is_complete());
    }

    #[test]
    fn test_implant_complete_with_two_samples() {
        let sipm = map(
            Family::Sipm,
            &[ChannelEvent::new("implant_xa", 1.0, 0.1, 1), ChannelEvent::new("implant_xb", 1.0, 0.1, 2)],
        );
        assert!(ImplantSummary::from_map(&sipm).is_complete());
    }

    #[test]
    fn test_auxiliary_summary() {
        let ge = map(Family::Germanium, &[ChannelEvent::new("ge1", 1000.0, 0.1, 1).with_cal_energy(1332.5)]);
        let refm = map(
            Family::Reference,
            &[ChannelEvent::new("ref", 40.0, 0.1, 1), ChannelEvent::new("ref2", 0.0, 0.1, 2)],
        );
        let s = AuxiliarySummary::from_maps(&ge, &SignalMap::new(), &refm);
        assert_eq!(s.germanium, vec![1332.5]);
        assert_eq!(s.implant, ImplantSummary::default());
        assert_eq!(s.reference_energy, 40.0);
    }
}
