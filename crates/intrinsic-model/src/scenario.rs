//! Growth scenarios.
//!
//! A scenario perturbs only the starting growth rate of a forecast:
//! `effective_g0 = g0 * (1 + adjustment)`.

use crate::config::ValuationConfig;
use crate::error::{Result, ValuationError};
use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Scenario tag.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Growth scaled down
    Conservative,
    /// Historical growth unchanged
    Base,
    /// Growth scaled up
    Optimistic,
}

impl ScenarioKind {
    /// All scenarios, in output order.
    pub const ALL: [Self; 3] = [Self::Conservative, Self::Base, Self::Optimistic];

    /// Sign of the adjustment for this tag.
    pub const fn direction(self) -> f64 {
        match self {
            Self::Conservative => -1.0,
            Self::Base => 0.0,
            Self::Optimistic => 1.0,
        }
    }

    /// Lowercase label used in long-format output.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Base => "base",
            Self::Optimistic => "optimistic",
        }
    }
}

/// A scenario tag with its growth adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthScenario {
    kind: ScenarioKind,
    adjustment: f64,
}

impl GrowthScenario {
    /// Create a scenario with an explicit adjustment.
    ///
    /// The pairing is checked by [`GrowthScenario::validate`] when the
    /// scenario is used.
    pub const fn new(kind: ScenarioKind, adjustment: f64) -> Self {
        Self { kind, adjustment }
    }

    /// The scenario of `kind` with the configured adjustment magnitude.
    pub fn from_config(kind: ScenarioKind, config: &ValuationConfig) -> Self {
        Self::new(kind, kind.direction() * config.scenario_adjustment)
    }

    /// Conservative, base and optimistic scenarios for a configuration.
    pub fn all(config: &ValuationConfig) -> [Self; 3] {
        ScenarioKind::ALL.map(|kind| Self::from_config(kind, config))
    }

    /// Scenario tag.
    pub const fn kind(&self) -> ScenarioKind {
        self.kind
    }

    /// Growth adjustment, e.g. -0.25.
    pub const fn adjustment(&self) -> f64 {
        self.adjustment
    }

    /// Multiplier applied to the historical growth rate.
    pub fn multiplier(&self) -> f64 {
        1.0 + self.adjustment
    }

    /// Starting growth rate for this scenario.
    pub fn apply(&self, historical_growth: f64) -> f64 {
        historical_growth * self.multiplier()
    }

    /// Check the adjustment belongs to the allowed set and matches the tag.
    ///
    /// # Errors
    ///
    /// Returns [`ValuationError::InvalidScenario`] for any other adjustment.
    pub fn validate(&self, magnitude: f64) -> Result<()> {
        let expected = self.kind.direction() * magnitude;
        if !self.adjustment.is_finite() || (self.adjustment - expected).abs() > 1e-12 {
            return Err(ValuationError::InvalidScenario {
                kind: self.kind,
                adjustment: self.adjustment,
                expected,
            });
        }
        Ok(())
    }
}
