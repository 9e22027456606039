use crate::error::{CorridorError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for corridor planning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    /// Uniform animal weight in [0, 1] applied to every zone.
    /// When unset, the weight is derived per zone from its habitat relevance.
    pub animal_weight: Option<f64>,

    /// Upper clamp for the derived animal importance, in (0.5, 1.0].
    /// The lower clamp is `1 - max_importance`.
    pub max_importance: f64,

    /// How cluster labels are generated
    pub label_scheme: LabelScheme,

    /// Decimal places kept in reported path scores (None = exact)
    pub score_decimals: Option<u32>,

    /// Spread per-zone, per-pair and per-fixture work across threads
    pub parallel: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            animal_weight: None,
            max_importance: 0.8,
            label_scheme: LabelScheme::Extended,
            score_decimals: Some(2),
            parallel: true,
        }
    }
}

impl PlannerConfig {
    /// Cost is the animal risk alone
    pub fn animal_first() -> Self {
        Self {
            animal_weight: Some(1.0),
            ..Default::default()
        }
    }

    /// Cost is the human risk alone
    pub fn human_first() -> Self {
        Self {
            animal_weight: Some(0.0),
            ..Default::default()
        }
    }

    /// Equal blend of both risks
    pub fn balanced() -> Self {
        Self {
            animal_weight: Some(0.5),
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if let Some(weight) = self.animal_weight {
            if !(0.0..=1.0).contains(&weight) {
                return Err(CorridorError::invalid_config(format!(
                    "animal_weight ({weight}) must lie in [0, 1]"
                )));
            }
        }

        // NaN fails both comparisons and is rejected here too
        if !(self.max_importance > 0.5 && self.max_importance <= 1.0) {
            return Err(CorridorError::invalid_config(format!(
                "max_importance ({}) must lie in (0.5, 1.0]",
                self.max_importance
            )));
        }

        if let Some(decimals) = self.score_decimals {
            if decimals > 12 {
                return Err(CorridorError::invalid_config(format!(
                    "score_decimals ({decimals}) cannot exceed 12"
                )));
            }
        }

        Ok(())
    }

    /// Apply the configured score rounding
    pub fn round_score(&self, score: f64) -> f64 {
        match self.score_decimals {
            Some(decimals) => {
                let factor = 10f64.powi(decimals as i32);
                (score * factor).round() / factor
            }
            None => score,
        }
    }
}

/// Cluster label generator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LabelScheme {
    /// Single uppercase letters A..Z; more than 26 clusters is an error
    Alphabetic,

    /// A..Z, then AA, AB, ... without an upper bound
    #[default]
    Extended,
}

impl LabelScheme {
    /// Number of labels available, `None` when unbounded
    pub fn capacity(self) -> Option<usize> {
        match self {
            Self::Alphabetic => Some(26),
            Self::Extended => None,
        }
    }
}
