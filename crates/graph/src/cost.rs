use crate::config::PlannerConfig;
use crate::error::{CorridorError, Result};
use crate::types::{Zone, ZoneId};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Blends human and animal risk into a per-zone traversal cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    animal_weight: Option<f64>,
    max_importance: f64,
}

impl CostModel {
    pub fn new(animal_weight: Option<f64>, max_importance: f64) -> Result<Self> {
        let config = PlannerConfig {
            animal_weight,
            max_importance,
            ..Default::default()
        };
        Self::from_config(&config)
    }

    pub fn from_config(config: &PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            animal_weight: config.animal_weight,
            max_importance: config.max_importance,
        })
    }

    /// Animal importance used for this zone
    pub fn importance(&self, zone: &Zone) -> Result<f64> {
        if let Some(weight) = self.animal_weight {
            return Ok(weight);
        }

        let relevance = zone.relevance.ok_or_else(|| {
            CorridorError::invalid_zone(
                zone.id,
                "habitat relevance score is required when no animal weight is configured",
            )
        })?;
        Ok(clamp_importance(relevance, self.max_importance))
    }

    /// Traversal cost of one zone: a convex combination of its two risk scores
    pub fn compute_cost(&self, zone: &Zone) -> Result<f64> {
        let importance = self.importance(zone)?;
        Ok(importance * zone.animal_score + (1.0 - importance) * zone.human_score)
    }

    /// Cost every zone, keeping the zone collection order
    pub fn cost_table(&self, zones: &[Zone], parallel: bool) -> Result<CostTable> {
        let costs: Vec<f64> = if parallel {
            zones
                .par_iter()
                .map(|zone| self.compute_cost(zone))
                .collect::<Result<_>>()?
        } else {
            zones
                .iter()
                .map(|zone| self.compute_cost(zone))
                .collect::<Result<_>>()?
        };

        let table = CostTable::from_pairs(zones.iter().map(|z| z.id).zip(costs));
        log::info!("Derived traversal costs for {} zones", table.len());
        Ok(table)
    }
}

/// Cost of a single zone without building a model first
pub fn compute_cost(zone: &Zone, animal_weight: Option<f64>, max_importance: f64) -> Result<f64> {
    CostModel::new(animal_weight, max_importance)?.compute_cost(zone)
}

/// Clamp a relevance score into [1 - max_importance, max_importance]
pub fn clamp_importance(relevance: f64, max_importance: f64) -> f64 {
    relevance.clamp(1.0 - max_importance, max_importance)
}

/// Traversal cost per zone, in zone collection order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CostTable {
    order: Vec<ZoneId>,
    costs: HashMap<ZoneId, f64>,
}

impl CostTable {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (ZoneId, f64)>) -> Self {
        let mut table = Self::default();
        for (zone, cost) in pairs {
            if table.costs.insert(zone, cost).is_none() {
                table.order.push(zone);
            }
        }
        table
    }

    pub fn get(&self, zone: ZoneId) -> Option<f64> {
        self.costs.get(&zone).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneId, f64)> + '_ {
        self.order.iter().map(move |zone| (*zone, self.costs[zone]))
    }

    /// Sum of costs over the distinct zones in `zones`; unknown zones count as 0
    pub fn score_of(&self, zones: &[ZoneId]) -> f64 {
        let mut seen = HashSet::with_capacity(zones.len());
        zones
            .iter()
            .filter(|zone| seen.insert(**zone))
            .filter_map(|zone| self.get(*zone))
            .sum()
    }
}
