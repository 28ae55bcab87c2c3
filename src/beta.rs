/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Silicon beta tag.
//!
//! A trigger is beta-tagged when the silicon map is non-empty and the family's highest
//! calibrated hit exceeds the activation threshold. The maximum is taken over the raw
//! hit list, as the event builder reports it, not over the filtered map.

use crate::channel::DetectorSummary;
use crate::config::ProcessorConfig;
use crate::signal_map::SignalMap;

/// Beta time reported for untagged triggers at the sink boundary.
pub const UNTAGGED_BETA_TIME: f64 = -100.0;

/// Beta decision for one trigger.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BetaTag {
    /// Timestamp of the tagging silicon hit; `None` when untagged.
    pub time: Option<f64>,
    /// Highest calibrated silicon energy; `None` when the silicon map is empty.
    pub max_energy: Option<f64>,
}

impl BetaTag {
    /// Whether the trigger carries a beta.
    pub fn is_tagged(&self) -> bool {
        self.time.is_some()
    }

    /// Beta time, or [`UNTAGGED_BETA_TIME`].
    pub fn time_or_untagged(&self) -> f64 {
        self.time.unwrap_or(UNTAGGED_BETA_TIME)
    }
}

/// Applies the beta activation threshold.
#[derive(Clone, Debug)]
pub struct BetaGate {
    threshold: f64,
}

impl BetaGate {
    /// Gate using `config.beta_threshold`.
    pub fn from_config(config: &ProcessorConfig) -> Self {
        Self { threshold: config.beta_threshold }
    }

    /// Decide the beta tag for the current trigger.
    pub fn evaluate<D: DetectorSummary + ?Sized>(&self, map: &SignalMap, silicon: &D) -> BetaTag {
        if map.is_empty() {
            return BetaTag::default();
        }
        let Some(max) = silicon.max_event() else {
            return BetaTag::default();
        };
        BetaTag {
            time: (max.cal_energy > self.threshold).then_some(max.time),
            max_energy: Some(max.cal_energy),
        }
    }
}

/// Strip number encoded in a silicon subtype.
///
/// The second character is the strip digit; a `B` in third position marks the bottom
/// detector, whose strips are numbered from 8.
pub fn strip_number(subtype: &str) -> Option<u8> {
    let bytes = subtype.as_bytes();
    let digit = bytes.get(1).filter(|b| b.is_ascii_digit())? - b'0';
    let offset = if bytes.get(2) == Some(&b'B') { 8 } else { 0 };
    Some(digit + offset)
}
