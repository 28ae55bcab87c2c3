//! Processor thresholds, counts and coincidence windows.
//!
//! [`ProcessorConfig::default()`] reproduces the acceptance rules of the production
//! analysis. Hosts override individual fields with struct-update syntax and call
//! [`ProcessorConfig::validate`] (done for you by
//! [`TriggerProcessor::new`](crate::processor::TriggerProcessor::new)).

use thiserror::Error;

/// Margin applied to every floating-point window comparison.
///
/// Gaps are computed from timestamps, so a bound is only crossed when the gap clears
/// it by more than this amount.
pub const EPSILON: f64 = 1e-12;

// ─── CoincidenceWindow ───────────────────────────────────────────────────────

/// Acceptance rule for a time gap in nanoseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoincidenceWindow {
    /// `low < gap < high` (open interval).
    Between {
        /// Lower bound, exclusive.
        low: f64,
        /// Upper bound, exclusive.
        high: f64,
    },
    /// `gap > low` (one-sided).
    Above {
        /// Lower bound, exclusive.
        low: f64,
    },
    /// `|gap| > low` (one-sided on the magnitude).
    MagnitudeAbove {
        /// Lower bound on `|gap|`, exclusive.
        low: f64,
    },
}

impl CoincidenceWindow {
    /// Whether `gap_ns` falls inside the window, with [`EPSILON`] margins.
    pub fn accepts(&self, gap_ns: f64) -> bool {
        match *self {
            CoincidenceWindow::Between { low, high } => {
                gap_ns > low + EPSILON && gap_ns < high - EPSILON
            }
            CoincidenceWindow::Above { low } => gap_ns > low + EPSILON,
            CoincidenceWindow::MagnitudeAbove { low } => gap_ns.abs() > low + EPSILON,
        }
    }

    fn check(&self, field: &'static str) -> Result<(), ConfigError> {
        match *self {
            CoincidenceWindow::Between { low, high } => {
                finite(field, low)?;
                finite(field, high)?;
                if low >= high {
                    return Err(ConfigError::InvertedWindow { field, low, high });
                }
                Ok(())
            }
            CoincidenceWindow::Above { low } | CoincidenceWindow::MagnitudeAbove { low } => {
                finite(field, low)
            }
        }
    }
}

// ─── ConfigError ─────────────────────────────────────────────────────────────

/// Rejected configuration.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// A threshold, bound or scale is NaN or infinite.
    #[error("{field} must be finite")]
    NonFinite {
        /// Offending field.
        field: &'static str,
    },
    /// A window's lower bound is not below its upper bound.
    #[error("{field} window is empty: low {low} >= high {high}")]
    InvertedWindow {
        /// Offending window.
        field: &'static str,
        /// Lower bound.
        low: f64,
        /// Upper bound.
        high: f64,
    },
    /// A count that must be positive is zero.
    #[error("{field} must be greater than zero")]
    ZeroCount {
        /// Offending field.
        field: &'static str,
    },
    /// An energy acceptance range is empty.
    #[error("{field} floor {floor} is above the ceiling {ceiling}")]
    EmptyEnergyRange {
        /// Offending range.
        field: &'static str,
        /// Floor.
        floor: f64,
        /// Ceiling.
        ceiling: f64,
    },
}

fn finite(field: &'static str, v: f64) -> Result<(), ConfigError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { field })
    }
}

// ─── ProcessorConfig ─────────────────────────────────────────────────────────

/// Every tunable used by the trigger processor.
///
/// Defaults:
/// - Energy ceiling 30000, silicon floor 200 (hard-coded online cutoff).
/// - Beta tag above 2.0 calibrated; logic pulse above 1.0 raw.
/// - 24 modules, full Central multiplicity 12.
/// - Time gaps scaled by 1e8 into the nanosecond-labelled distributions.
/// - Windows: beta–beta (300, 750), beta–non-beta (300, 550), any–any > 1000,
///   first-beta-only |gap| > 4000.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProcessorConfig {
    /// Upper bound on accepted raw energy for every filtered family.
    pub energy_ceiling: f64,
    /// Lower bound on accepted raw silicon energy (inclusive).
    pub silicon_energy_floor: f64,
    /// Calibrated silicon energy that must be exceeded for a beta tag.
    pub beta_threshold: f64,
    /// Raw energy a logic pulse must exceed to count.
    pub logic_threshold: f64,
    /// Number of front+back calorimeter modules.
    pub module_count: usize,
    /// Central-ring readouts in a complete Central hit.
    pub central_multiplicity: usize,
    /// Factor turning a timestamp difference into gap units.
    pub gap_scale: f64,
    /// Beta followed by beta.
    pub beta_beta_window: CoincidenceWindow,
    /// Beta followed by a non-beta trigger.
    pub beta_non_beta_window: CoincidenceWindow,
    /// Any trigger followed by any trigger.
    pub any_any_window: CoincidenceWindow,
    /// Latest beta against the triggers that follow it.
    pub first_beta_window: CoincidenceWindow,
}

impl ProcessorConfig {
    /// Construct the production configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check every field; returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite("energy_ceiling", self.energy_ceiling)?;
        finite("silicon_energy_floor", self.silicon_energy_floor)?;
        finite("beta_threshold", self.beta_threshold)?;
        finite("logic_threshold", self.logic_threshold)?;
        finite("gap_scale", self.gap_scale)?;
        if self.silicon_energy_floor > self.energy_ceiling {
            return Err(ConfigError::EmptyEnergyRange {
                field: "silicon_energy_floor",
                floor: self.silicon_energy_floor,
                ceiling: self.energy_ceiling,
            });
        }
        if self.module_count == 0 {
            return Err(ConfigError::ZeroCount { field: "module_count" });
        }
        if self.central_multiplicity == 0 {
            return Err(ConfigError::ZeroCount { field: "central_multiplicity" });
        }
        self.beta_beta_window.check("beta_beta_window")?;
        self.beta_non_beta_window.check("beta_non_beta_window")?;
        self.any_any_window.check("any_any_window")?;
        self.first_beta_window.check("first_beta_window")?;
        Ok(())
    }
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            energy_ceiling: 30_000.0,
            silicon_energy_floor: 200.0,
            beta_threshold: 2.0,
            logic_threshold: 1.0,
            module_count: 24,
            central_multiplicity: 12,
            gap_scale: 1.0e8,
            beta_beta_window: CoincidenceWindow::Between { low: 300.0, high: 750.0 },
            beta_non_beta_window: CoincidenceWindow::Between { low: 300.0, high: 550.0 },
            any_any_window: CoincidenceWindow::Above { low: 1000.0 },
            first_beta_window: CoincidenceWindow::MagnitudeAbove { low: 4000.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(ProcessorConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_between_window_is_open() {
        let w = CoincidenceWindow::Between { low: 300.0, high: 750.0 };
        assert!(!w.accepts(300.0));
        assert!(w.accepts(300.1));
        assert!(w.accepts(500.0));
        assert!(!w.accepts(750.0));
        assert!(!w.accepts(800.0));
    }

    #[test]
    fn test_magnitude_window_accepts_negative_gaps() {
        let w = CoincidenceWindow::MagnitudeAbove { low: 4000.0 };
        assert!(w.accepts(-4500.0));
        assert!(w.accepts(4500.0));
        assert!(!w.accepts(-3999.0));
        assert!(!w.accepts(4000.0));
    }

    #[test]
    fn test_inverted_window_rejected() {
        let cfg = ProcessorConfig {
            beta_beta_window: CoincidenceWindow::Between { low: 750.0, high: 300.0 },
            ..ProcessorConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::InvertedWindow { field: "beta_beta_window", low: 750.0, high: 300.0 })
        );
    }

    #[test]
    fn test_zero_module_count_rejected() {
        let cfg = ProcessorConfig { module_count: 0, ..ProcessorConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCount { field: "module_count" }));
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let cfg = ProcessorConfig { beta_threshold: f64::NAN, ..ProcessorConfig::default() };
        assert_eq!(cfg.validate(), Err(ConfigError::NonFinite { field: "beta_threshold" }));
    }

    #[test]
    fn test_silicon_floor_above_ceiling_rejected() {
        let cfg = ProcessorConfig { silicon_energy_floor: 40_000.0, ..ProcessorConfig::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyEnergyRange { .. })));
    }
}
