use crate::clusters::ClusterRegistry;
use crate::cost::CostTable;
use crate::error::{CorridorError, Result};
use crate::graph::AdjacencyGraph;
use crate::spatial::BoundsIndex;
use crate::topology::Topology;
use crate::types::{PlanWarning, Zone};
use rayon::prelude::*;
use std::collections::HashSet;

/// Build the zone adjacency graph from polygon topology
pub struct AdjacencyGraphBuilder<'t, T: Topology> {
    topology: &'t T,
    parallel: bool,
}

impl<'t, T: Topology> AdjacencyGraphBuilder<'t, T> {
    pub fn new(topology: &'t T) -> Self {
        Self {
            topology,
            parallel: true,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build graph from zones and their traversal costs.
    ///
    /// Every zone becomes a node, including zones with no neighbours. For each
    /// touching pair (A, B) both A -> B (weight = cost of B) and B -> A
    /// (weight = cost of A) are inserted.
    pub fn build(&self, zones: &[Zone], costs: &CostTable) -> Result<AdjacencyGraph> {
        // Phase 1: validate ids and costs
        let mut seen = HashSet::with_capacity(zones.len());
        let mut zone_costs = Vec::with_capacity(zones.len());
        for zone in zones {
            if !seen.insert(zone.id) {
                return Err(CorridorError::DuplicateZone(zone.id));
            }
            let cost = costs
                .get(zone.id)
                .ok_or(CorridorError::UnknownZone(zone.id))?;
            zone_costs.push(cost);
        }

        // Phase 2: prune candidate pairs through the bounds index
        let bounds: Vec<_> = zones
            .iter()
            .map(|zone| self.topology.bounds(&zone.geometry))
            .collect();
        let index = BoundsIndex::build(bounds.iter().copied().enumerate());

        let find_touching = |i: usize| -> Vec<usize> {
            let Some(rect) = bounds[i] else {
                return Vec::new();
            };
            index
                .intersecting(&rect)
                .into_iter()
                .filter(|&j| j > i)
                .filter(|&j| self.topology.touches(&zones[i].geometry, &zones[j].geometry))
                .collect()
        };

        let upper: Vec<Vec<usize>> = if self.parallel {
            (0..zones.len()).into_par_iter().map(find_touching).collect()
        } else {
            (0..zones.len()).map(find_touching).collect()
        };

        let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); zones.len()];
        for (i, touching) in upper.into_iter().enumerate() {
            for j in touching {
                adjacency[i].push(j);
                adjacency[j].push(i);
            }
        }

        // Phase 3: materialize nodes in zone order, then each zone's edges by
        // ascending neighbour id. Snapshots replay edges in the same order, so
        // equal-cost ties resolve identically on both paths.
        let mut graph = AdjacencyGraph::new();
        for zone in zones {
            graph.add_zone(zone.id);
        }
        for (i, neighbours) in adjacency.iter_mut().enumerate() {
            neighbours.sort_unstable_by_key(|&j| zones[j].id);
            for &j in neighbours.iter() {
                graph.add_edge(zones[i].id, zones[j].id, zone_costs[j]);
            }
        }

        log::info!(
            "Built adjacency graph: {} zones, {} edges ({} indexed bounds)",
            graph.node_count(),
            graph.edge_count(),
            index.len()
        );

        Ok(graph)
    }
}

/// Cluster zones that have no neighbours and therefore cannot be reached
pub fn isolated_clusters(graph: &AdjacencyGraph, registry: &ClusterRegistry) -> Vec<PlanWarning> {
    registry
        .clusters()
        .iter()
        .filter(|cluster| graph.out_degree(cluster.zone) == 0)
        .map(|cluster| {
            log::warn!(
                "Cluster {} in zone {} has no adjacent zones",
                cluster.label,
                cluster.zone
            );
            PlanWarning::IsolatedCluster {
                label: cluster.label.clone(),
                zone: cluster.zone,
            }
        })
        .collect()
}
