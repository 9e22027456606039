use crate::clusters::ClusterRegistry;
use crate::config::PlannerConfig;
use crate::cost::CostTable;
use crate::graph::AdjacencyGraph;
use crate::types::{PairKey, Path, PlanWarning, ZoneId};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Shortest paths between cluster pairs, keyed by pair, owned by the caller
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairwisePaths {
    paths: BTreeMap<PairKey, Path>,
}

impl PairwisePaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a path; a pair is computed at most once, so a repeat insert is
    /// ignored and returns false
    pub fn insert(&mut self, path: Path) -> bool {
        if self.paths.contains_key(&path.key) {
            return false;
        }
        self.paths.insert(path.key, path);
        true
    }

    pub fn get(&self, key: PairKey) -> Option<&Path> {
        self.paths.get(&key)
    }

    /// Look up by cluster labels in either order
    pub fn get_by_labels(&self, registry: &ClusterRegistry, a: &str, b: &str) -> Option<&Path> {
        let i = registry.position_of_label(a)?;
        let j = registry.position_of_label(b)?;
        self.get(PairKey::new(i, j))
    }

    /// Paths in pair order
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.values()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Pairs for which no route exists
    pub fn not_found(&self) -> impl Iterator<Item = &Path> {
        self.paths.values().filter(|p| !p.is_found())
    }

    pub fn warnings(&self) -> Vec<PlanWarning> {
        self.not_found()
            .map(|p| PlanWarning::PathNotFound {
                pair: p.label.clone(),
                start: p.start,
                end: p.end,
            })
            .collect()
    }
}

/// Least-cost path between two zones.
///
/// The reported score is the sum of zone traversal costs over the path's
/// zones, start zone included, which differs from the search objective (edge
/// weights skip the start zone). An unreachable pair yields an empty path with
/// score 0.
pub fn shortest_path(
    graph: &AdjacencyGraph,
    costs: &CostTable,
    config: &PlannerConfig,
    key: PairKey,
    label: String,
    start: ZoneId,
    end: ZoneId,
) -> Path {
    match graph.shortest_path(start, end) {
        Some(route) => {
            let score = config.round_score(costs.score_of(&route.zones));
            log::debug!(
                "Path {label}: {} zones, score {score} (search cost {:.4})",
                route.zones.len(),
                route.edge_cost
            );
            Path {
                key,
                label,
                start,
                end,
                zones: route.zones,
                score,
            }
        }
        None => {
            log::warn!("Unable to find path between zones {start} and {end} (pair {label})");
            Path {
                key,
                label,
                start,
                end,
                zones: Vec::new(),
                score: 0.0,
            }
        }
    }
}

/// Compute the path of every cluster pair.
///
/// Pairs are independent; each result lands in its own slot of the returned
/// collection, so a missing route never aborts the rest of the batch.
pub fn find_cluster_paths(
    graph: &AdjacencyGraph,
    costs: &CostTable,
    registry: &ClusterRegistry,
    config: &PlannerConfig,
) -> PairwisePaths {
    let jobs: Vec<(PairKey, String, ZoneId, ZoneId)> = registry
        .pairs()
        .into_iter()
        .filter_map(|key| {
            let first = registry.get(key.first)?;
            let second = registry.get(key.second)?;
            let label = registry.pair_label(key)?;
            Some((key, label, first.zone, second.zone))
        })
        .collect();

    let run = |(key, label, start, end): (PairKey, String, ZoneId, ZoneId)| {
        shortest_path(graph, costs, config, key, label, start, end)
    };

    let computed: Vec<Path> = if config.parallel {
        jobs.into_par_iter().map(run).collect()
    } else {
        jobs.into_iter().map(run).collect()
    };

    let mut paths = PairwisePaths::new();
    for path in computed {
        paths.insert(path);
    }

    log::info!(
        "Computed {} cluster-pair paths ({} without a route)",
        paths.len(),
        paths.not_found().count()
    );

    paths
}
