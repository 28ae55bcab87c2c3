//! Channel hits and the per-family event-summary seam.
//!
//! Upstream decoding and energy calibration are done before the core sees a trigger.
//! What arrives here is, per detector family, an ordered list of [`ChannelEvent`]s
//! behind the [`DetectorSummary`] trait. The trait is the only thing the core needs
//! from the host's event builder.
//!
//! # Implementing for a host event builder
//!
//! ```rust
//! use mtas_core::channel::{ChannelEvent, DetectorSummary};
//!
//! struct PixieSummary {
//!     hits: Vec<ChannelEvent>,
//! }
//!
//! impl DetectorSummary for PixieSummary {
//!     fn events(&self) -> &[ChannelEvent] {
//!         &self.hits
//!     }
//! }
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Detector families read by the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Family {
    /// Ring-segmented calorimeter modules (48 photomultiplier readouts).
    Calorimeter,
    /// Silicon strip beta-tag detector.
    Silicon,
    /// Germanium monitor detector.
    Germanium,
    /// SiPM readout of the implantation detector.
    Sipm,
    /// Reference module.
    Reference,
    /// Digital logic pulses carrying run-phase metadata.
    Logic,
}

impl Family {
    /// Every family, in the order the processor fills their maps.
    pub const ALL: [Family; 6] = [
        Family::Calorimeter,
        Family::Silicon,
        Family::Germanium,
        Family::Sipm,
        Family::Reference,
        Family::Logic,
    ];

    /// Detector type name used by the acquisition channel map.
    pub fn type_name(&self) -> &'static str {
        match self {
            Family::Calorimeter => "mtas",
            Family::Silicon => "sili",
            Family::Germanium => "ge",
            Family::Sipm => "mtaspspmt",
            Family::Reference => "refmod",
            Family::Logic => "logi",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// One decoded, calibrated channel hit as delivered by the event builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelEvent {
    /// Channel subtype key, e.g. `"C3"`, `"IL2"`, `"MSU"`.
    pub subtype: String,
    /// Raw (uncalibrated) energy.
    pub energy: f64,
    /// Calibrated energy.
    pub cal_energy: f64,
    /// Timestamp in seconds.
    pub time: f64,
    /// Physical location index from the channel map.
    pub location: i32,
}

impl ChannelEvent {
    /// Build a hit with identical raw and calibrated energy.
    pub fn new(subtype: impl Into<String>, energy: f64, time: f64, location: i32) -> Self {
        Self {
            subtype: subtype.into(),
            energy,
            cal_energy: energy,
            time,
            location,
        }
    }

    /// Replace the calibrated energy.
    pub fn with_cal_energy(mut self, cal_energy: f64) -> Self {
        self.cal_energy = cal_energy;
        self
    }
}

/// Immutable sample stored in a [`SignalMap`](crate::signal_map::SignalMap).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelSample {
    subtype: String,
    raw_energy: f64,
    calibrated_energy: f64,
    timestamp: f64,
    location: i32,
}

impl ChannelSample {
    /// Subtype key.
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Raw energy.
    pub fn raw_energy(&self) -> f64 {
        self.raw_energy
    }

    /// Calibrated energy.
    pub fn calibrated_energy(&self) -> f64 {
        self.calibrated_energy
    }

    /// Timestamp in seconds.
    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Physical location index.
    pub fn location(&self) -> i32 {
        self.location
    }
}

impl From<&ChannelEvent> for ChannelSample {
    fn from(ev: &ChannelEvent) -> Self {
        Self {
            subtype: ev.subtype.clone(),
            raw_energy: ev.energy,
            calibrated_energy: ev.cal_energy,
            timestamp: ev.time,
            location: ev.location,
        }
    }
}

/// One family's hits for the current trigger.
///
/// Implementors only provide [`events`](DetectorSummary::events); multiplicity and the
/// maximum-energy accessor have default implementations matching the event builder's
/// semantics (the first hit wins ties for the maximum).
pub trait DetectorSummary {
    /// Hits in arrival order.
    fn events(&self) -> &[ChannelEvent];

    /// Number of hits.
    fn multiplicity(&self) -> usize {
        self.events().len()
    }

    /// Hit with the largest calibrated energy, or `None` for an empty list.
    fn max_event(&self) -> Option<&ChannelEvent> {
        self.events().iter().fold(None, |best: Option<&ChannelEvent>, ev| match best {
            Some(b) if ev.cal_energy <= b.cal_energy => Some(b),
            _ => Some(ev),
        })
    }
}

impl DetectorSummary for [ChannelEvent] {
    fn events(&self) -> &[ChannelEvent] {
        self
    }
}

impl DetectorSummary for Vec<ChannelEvent> {
    fn events(&self) -> &[ChannelEvent] {
        self.as_slice()
    }
}
