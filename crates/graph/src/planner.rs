use crate::builder::{isolated_clusters, AdjacencyGraphBuilder};
use crate::clusters::ClusterRegistry;
use crate::config::PlannerConfig;
use crate::cost::{CostModel, CostTable};
use crate::error::{CorridorError, Result};
use crate::exclusion::{ExclusionOutcome, LightingExclusionMapper};
use crate::graph::AdjacencyGraph;
use crate::paths::{find_cluster_paths, PairwisePaths};
use crate::selector::{select, ClusterPairCostMatrix, CorridorSet};
use crate::topology::{GeoTopology, Topology};
use crate::types::{Fixture, PlanWarning, Zone, ZoneId};
use std::collections::HashSet;

/// Runs the corridor pipeline: costs, graph, pairwise paths, selection and
/// lighting exclusion
pub struct CorridorPlanner<T: Topology = GeoTopology> {
    config: PlannerConfig,
    topology: T,
}

/// Results of cost derivation, graph construction and path search
#[derive(Debug, Clone)]
pub struct PathStage {
    pub costs: CostTable,
    pub graph: AdjacencyGraph,
    pub registry: ClusterRegistry,
    pub paths: PairwisePaths,
    pub matrix: ClusterPairCostMatrix,
    pub warnings: Vec<PlanWarning>,
}

/// Complete pipeline output
#[derive(Debug, Clone)]
pub struct CorridorPlan {
    pub costs: CostTable,
    pub graph: AdjacencyGraph,
    pub registry: ClusterRegistry,
    pub paths: PairwisePaths,
    pub matrix: ClusterPairCostMatrix,
    pub corridors: CorridorSet,
    pub lighting: ExclusionOutcome,
    pub warnings: Vec<PlanWarning>,
}

/// Path-stage results kept after corridor selection failed
#[derive(Debug)]
pub struct PartialPlan {
    pub stage: PathStage,
    pub failure: CorridorError,
}

#[derive(Debug)]
pub enum PlanOutcome {
    Complete(Box<CorridorPlan>),
    Partial(Box<PartialPlan>),
}

impl CorridorPlanner<GeoTopology> {
    pub fn with_config(config: PlannerConfig) -> Result<Self> {
        Self::new(config, GeoTopology)
    }
}

impl<T: Topology> CorridorPlanner<T> {
    pub fn new(config: PlannerConfig, topology: T) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, topology })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Traversal cost of every zone
    pub fn costs(&self, zones: &[Zone]) -> Result<CostTable> {
        validate_zones(zones)?;
        CostModel::from_config(&self.config)?.cost_table(zones, self.config.parallel)
    }

    /// Adjacency graph built from zone geometry
    pub fn build_graph(&self, zones: &[Zone], costs: &CostTable) -> Result<AdjacencyGraph> {
        AdjacencyGraphBuilder::new(&self.topology)
            .parallel(self.config.parallel)
            .build(zones, costs)
    }

    /// Costs, graph (built unless supplied), clusters and every pairwise path
    pub fn prepare(&self, zones: &[Zone], graph: Option<AdjacencyGraph>) -> Result<PathStage> {
        let costs = self.costs(zones)?;
        let registry = ClusterRegistry::from_zones(zones, self.config.label_scheme)?;

        let graph = match graph {
            Some(graph) => {
                let known: HashSet<ZoneId> = zones.iter().map(|z| z.id).collect();
                if let Some(stray) = graph.zones().find(|zone| !known.contains(zone)) {
                    return Err(CorridorError::UnknownZone(stray));
                }
                check_edge_weights(&graph, &costs)?;
                graph
            }
            None => self.build_graph(zones, &costs)?,
        };

        let mut warnings = isolated_clusters(&graph, &registry);
        let paths = find_cluster_paths(&graph, &costs, &registry, &self.config);
        warnings.extend(paths.warnings());
        let matrix = ClusterPairCostMatrix::from_paths(registry.len(), &paths);

        Ok(PathStage {
            costs,
            graph,
            registry,
            paths,
            matrix,
            warnings,
        })
    }

    /// Run the whole pipeline. A disconnected cluster network is returned as
    /// [`PlanOutcome::Partial`] so the path-stage results stay inspectable.
    pub fn plan_partial(
        &self,
        zones: &[Zone],
        fixtures: &[Fixture],
        graph: Option<AdjacencyGraph>,
    ) -> Result<PlanOutcome> {
        let stage = self.prepare(zones, graph)?;

        let corridors = match select(&stage.registry, &stage.paths) {
            Ok(corridors) => corridors,
            Err(failure @ CorridorError::Disconnected { .. }) => {
                return Ok(PlanOutcome::Partial(Box::new(PartialPlan { stage, failure })));
            }
            Err(other) => return Err(other),
        };

        let lighting = LightingExclusionMapper::new(&self.topology)
            .parallel(self.config.parallel)
            .map_exclusions(&corridors, zones, fixtures);

        let PathStage {
            costs,
            graph,
            registry,
            paths,
            matrix,
            warnings,
        } = stage;

        Ok(PlanOutcome::Complete(Box::new(CorridorPlan {
            costs,
            graph,
            registry,
            paths,
            matrix,
            corridors,
            lighting,
            warnings,
        })))
    }

    pub fn plan(&self, zones: &[Zone], fixtures: &[Fixture]) -> Result<CorridorPlan> {
        complete(self.plan_partial(zones, fixtures, None)?)
    }

    /// Run the pipeline over a prebuilt (e.g. snapshot-restored) graph
    pub fn plan_with_graph(
        &self,
        zones: &[Zone],
        fixtures: &[Fixture],
        graph: AdjacencyGraph,
    ) -> Result<CorridorPlan> {
        complete(self.plan_partial(zones, fixtures, Some(graph))?)
    }
}

fn complete(outcome: PlanOutcome) -> Result<CorridorPlan> {
    match outcome {
        PlanOutcome::Complete(plan) => Ok(*plan),
        PlanOutcome::Partial(partial) => Err(partial.failure),
    }
}

/// Largest difference tolerated between a supplied edge weight and the
/// current cost of its destination zone
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// A supplied graph must weigh every edge A -> B with the current cost of B,
/// otherwise the search would run under different settings than the scores
fn check_edge_weights(graph: &AdjacencyGraph, costs: &CostTable) -> Result<()> {
    for (from, to, weight) in graph.edges() {
        let cost = costs.get(to).ok_or(CorridorError::UnknownZone(to))?;
        if (weight - cost).abs() > WEIGHT_TOLERANCE {
            return Err(CorridorError::Snapshot(format!(
                "edge {from} -> {to} weighs {weight} but zone {to} costs {cost} under the current settings"
            )));
        }
    }
    Ok(())
}

/// Reject malformed zone records before any work starts
pub fn validate_zones(zones: &[Zone]) -> Result<()> {
    let mut seen = HashSet::with_capacity(zones.len());
    for zone in zones {
        if !seen.insert(zone.id) {
            return Err(CorridorError::DuplicateZone(zone.id));
        }
        check_unit(zone.id, "human_score", zone.human_score)?;
        check_unit(zone.id, "animal_score", zone.animal_score)?;
        if let Some(relevance) = zone.relevance {
            check_unit(zone.id, "relevance", relevance)?;
        }
        if zone.geometry.exterior().0.len() < 4 {
            return Err(CorridorError::invalid_zone(
                zone.id,
                "polygon needs at least three distinct vertices",
            ));
        }
    }
    Ok(())
}

fn check_unit(zone: ZoneId, field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CorridorError::invalid_zone(
            zone,
            format!("{field} ({value}) must lie in [0, 1]"),
        ))
    }
}
