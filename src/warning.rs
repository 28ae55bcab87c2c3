//! Data-quality warnings.
//!
//! Nothing the core detects in a trigger is fatal: a run must keep going through noisy
//! data. Each anomaly is logged once through `tracing` at `warn` level and collected on the
//! trigger's [`TriggerOutcome`](crate::processor::TriggerOutcome), and processing continues
//! with the documented fallback:
//!
//! | Warning | Fallback |
//! |---|---|
//! | [`DuplicateSignal`](DataQualityWarning::DuplicateSignal) | later hit dropped, first kept |
//! | [`ThirdModuleSignal`](DataQualityWarning::ThirdModuleSignal) | module keeps its front+back sum |
//! | [`ModuleOutOfRange`](DataQualityWarning::ModuleOutOfRange) | hit skipped for module pairing |
//! | [`SameEventConflict`](DataQualityWarning::SameEventConflict) | on applied, then off (off wins) |
//! | [`MissingOffSignal`](DataQualityWarning::MissingOffSignal) | phase stays on |

use alloc::string::String;
use alloc::vec::Vec;

use thiserror::Error;

use crate::channel::Family;
use crate::phase::PhaseCategory;

/// A non-fatal anomaly found while processing one trigger.
#[derive(Clone, Debug, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataQualityWarning {
    /// The same subtype fired more than once in one trigger.
    #[error("detector {subtype} has more than one {family} signal in one event")]
    DuplicateSignal {
        /// Family of the repeated channel.
        family: Family,
        /// Repeated subtype key.
        subtype: String,
    },
    /// A module received a third readout signal.
    #[error("detector {subtype} has 3 or more signals in module {module}")]
    ThirdModuleSignal {
        /// Subtype of the extra signal.
        subtype: String,
        /// Module index.
        module: usize,
    },
    /// A calorimeter location maps outside the configured modules.
    #[error("detector {subtype} location {location} is outside the {module_count} modules")]
    ModuleOutOfRange {
        /// Subtype of the hit.
        subtype: String,
        /// Location from the channel map.
        location: i32,
        /// Configured module count.
        module_count: usize,
    },
    /// On- and off-pulses for one phase category in the same trigger.
    #[error("{category} on and off signals in the same event")]
    SameEventConflict {
        /// Affected category.
        category: PhaseCategory,
    },
    /// An on-pulse arrived while the category was already on.
    #[error("no end of {category} signal before the next start")]
    MissingOffSignal {
        /// Affected category.
        category: PhaseCategory,
    },
}

/// Log `warning` and append it to the trigger's warning list.
pub(crate) fn raise(warnings: &mut Vec<DataQualityWarning>, warning: DataQualityWarning) {
    tracing::warn!(warning = %warning, "data quality");
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_messages_name_the_channel() {
        let w = DataQualityWarning::DuplicateSignal {
            family: Family::Calorimeter,
            subtype: "C7".into(),
        };
        assert_eq!(w.to_string(), "detector C7 has more than one mtas signal in one event");

        let w = DataQualityWarning::MissingOffSignal { category: PhaseCategory::TapeMove };
        assert_eq!(w.to_string(), "no end of tape movement signal before the next start");
    }

    #[test]
    fn test_raise_collects() {
        let mut log = Vec::new();
        raise(&mut log, DataQualityWarning::SameEventConflict { category: PhaseCategory::Measure });
        assert_eq!(log.len(), 1);
    }
}
