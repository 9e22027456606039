use crate::clusters::ClusterRegistry;
use crate::error::{CorridorError, Result};
use crate::paths::PairwisePaths;
use crate::types::{ClusterLabel, PairKey, Path, ZoneId};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Square matrix of cluster-pair path scores.
///
/// Only the upper triangle (i < j) carries scores; the diagonal, the lower
/// triangle and pairs without a route hold 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPairCostMatrix {
    size: usize,
    cells: Vec<f64>,
}

impl ClusterPairCostMatrix {
    pub fn from_paths(cluster_count: usize, paths: &PairwisePaths) -> Self {
        let mut cells = vec![0.0; cluster_count * cluster_count];
        for path in paths.iter().filter(|p| p.is_found()) {
            let PairKey { first, second } = path.key;
            debug_assert!(
                second < cluster_count,
                "path {} keyed outside {cluster_count} clusters",
                path.label
            );
            if first < second && second < cluster_count {
                cells[first * cluster_count + second] = path.score;
            }
        }
        Self {
            size: cluster_count,
            cells,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.size || col >= self.size {
            return 0.0;
        }
        self.cells[row * self.size + col]
    }

    /// Rows as nested vectors, for reporting
    pub fn rows(&self) -> Vec<Vec<f64>> {
        self.cells
            .chunks(self.size.max(1))
            .take(self.size)
            .map(<[f64]>::to_vec)
            .collect()
    }
}

/// Paths kept by the spanning-tree reduction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorridorSet {
    pub corridors: Vec<Path>,
}

impl CorridorSet {
    pub fn total_score(&self) -> f64 {
        self.corridors.iter().map(|p| p.score).sum()
    }

    pub fn len(&self) -> usize {
        self.corridors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.corridors.is_empty()
    }

    /// Deduplicated union of zones visited by every corridor
    pub fn exclusion_zones(&self) -> BTreeSet<ZoneId> {
        self.corridors
            .iter()
            .flat_map(|p| p.zones.iter().copied())
            .collect()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.corridors.iter().map(|p| p.label.as_str()).collect()
    }
}

/// Pick the minimal set of cluster-pair paths keeping all clusters connected.
///
/// Kruskal over the (pair, score) edges of every found path, ties broken by
/// pair order. Pairs without a route are not edges. If the edges cannot
/// connect every cluster the whole selection fails with
/// [`CorridorError::Disconnected`]. Paths keyed outside `registry` are a
/// [`CorridorError::ForeignPair`].
pub fn select(registry: &ClusterRegistry, paths: &PairwisePaths) -> Result<CorridorSet> {
    let n = registry.len();
    if let Some(foreign) = paths.iter().find(|p| p.key.second >= n) {
        return Err(CorridorError::ForeignPair {
            pair: foreign.label.clone(),
            clusters: n,
        });
    }
    if n <= 1 {
        return Ok(CorridorSet::default());
    }

    let mut edges: Vec<&Path> = paths.iter().filter(|p| p.is_found()).collect();
    edges.sort_by(|a, b| a.score.total_cmp(&b.score).then(a.key.cmp(&b.key)));

    let mut uf = UnionFind::<usize>::new(n);
    let mut chosen: Vec<&Path> = Vec::with_capacity(n - 1);
    for path in edges {
        if uf.union(path.key.first, path.key.second) {
            chosen.push(path);
            if chosen.len() == n - 1 {
                break;
            }
        }
    }

    if chosen.len() < n - 1 {
        let components = components(&mut uf, registry);
        log::warn!(
            "Cluster network splits into {} components; no spanning tree exists",
            components.len()
        );
        return Err(CorridorError::Disconnected { components });
    }

    chosen.sort_by_key(|p| p.key);
    let set = CorridorSet {
        corridors: chosen.into_iter().cloned().collect(),
    };

    log::info!(
        "Selected {} corridors [{}], total score {:.2}",
        set.len(),
        set.labels().join(", "),
        set.total_score()
    );

    Ok(set)
}

fn components(uf: &mut UnionFind<usize>, registry: &ClusterRegistry) -> Vec<Vec<ClusterLabel>> {
    let mut groups: BTreeMap<usize, Vec<ClusterLabel>> = BTreeMap::new();
    let mut first_seen: Vec<usize> = Vec::new();
    for (position, cluster) in registry.clusters().iter().enumerate() {
        let root = uf.find_mut(position);
        if !groups.contains_key(&root) {
            first_seen.push(root);
        }
        groups.entry(root).or_default().push(cluster.label.clone());
    }
    first_seen
        .into_iter()
        .filter_map(|root| groups.remove(&root))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabelScheme;
    use crate::types::Zone;
    use geo::{polygon, Polygon};
    use pretty_assertions::assert_eq;

    fn square(x: f64) -> Polygon<f64> {
        polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]
    }

    fn registry(count: u64) -> ClusterRegistry {
        let zones: Vec<Zone> = (0..count)
            .map(|i| Zone::new(i, square(i as f64 * 2.0), 0.0, 0.0).with_cluster())
            .collect();
        ClusterRegistry::from_zones(&zones, LabelScheme::Extended).unwrap()
    }

    fn path(first: usize, second: usize, score: f64, found: bool) -> Path {
        let labels = ["A", "B", "C", "D"];
        Path {
            key: PairKey::new(first, second),
            label: format!("{}{}", labels[first], labels[second]),
            start: ZoneId(first as u64),
            end: ZoneId(second as u64),
            zones: if found {
                vec![ZoneId(first as u64), ZoneId(100 + second as u64), ZoneId(second as u64)]
            } else {
                Vec::new()
            },
            score: if found { score } else { 0.0 },
        }
    }

    fn collect(paths: Vec<Path>) -> PairwisePaths {
        let mut out = PairwisePaths::new();
        for p in paths {
            out.insert(p);
        }
        out
    }

    #[test]
    fn triangle_drops_most_expensive_pair() {
        let paths = collect(vec![
            path(0, 1, 5.0, true),
            path(0, 2, 10.0, true),
            path(1, 2, 3.0, true),
        ]);
        let set = select(&registry(3), &paths).unwrap();
        assert_eq!(set.labels(), vec!["AB", "BC"]);
        assert_eq!(set.total_score(), 8.0);
    }

    #[test]
    fn missing_single_edge_is_tolerated() {
        let paths = collect(vec![
            path(0, 1, 5.0, true),
            path(0, 2, 0.0, false),
            path(1, 2, 3.0, true),
        ]);
        let set = select(&registry(3), &paths).unwrap();
        assert_eq!(set.labels(), vec!["AB", "BC"]);
    }

    #[test]
    fn disconnected_clusters_fail_selection() {
        let paths = collect(vec![
            path(0, 1, 5.0, true),
            path(0, 2, 0.0, false),
            path(1, 2, 0.0, false),
        ]);
        let err = select(&registry(3), &paths).unwrap_err();
        match err {
            CorridorError::Disconnected { components } => {
                assert_eq!(
                    components,
                    vec![
                        vec![ClusterLabel::new("A"), ClusterLabel::new("B")],
                        vec![ClusterLabel::new("C")],
                    ]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn paths_from_another_registry_are_rejected() {
        let paths = collect(vec![path(0, 1, 1.0, true), path(1, 3, 2.0, true)]);
        match select(&registry(3), &paths) {
            Err(CorridorError::ForeignPair { pair, clusters }) => {
                assert_eq!(pair, "BD");
                assert_eq!(clusters, 3);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn single_cluster_selects_nothing() {
        let set = select(&registry(1), &PairwisePaths::new()).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn matrix_fills_upper_triangle_only() {
        let paths = collect(vec![
            path(0, 1, 5.0, true),
            path(0, 2, 0.0, false),
            path(1, 2, 3.0, true),
        ]);
        let matrix = ClusterPairCostMatrix::from_paths(3, &paths);
        assert_eq!(
            matrix.rows(),
            vec![
                vec![0.0, 5.0, 0.0],
                vec![0.0, 0.0, 3.0],
                vec![0.0, 0.0, 0.0],
            ]
        );
        assert_eq!(matrix.get(1, 0), 0.0);
    }

    #[test]
    fn exclusion_zones_are_deduplicated() {
        let paths = collect(vec![path(0, 1, 1.0, true), path(1, 2, 1.0, true)]);
        let set = select(&registry(3), &paths).unwrap();
        let zones: Vec<u64> = set.exclusion_zones().into_iter().map(|z| z.0).collect();
        assert_eq!(zones, vec![0, 1, 2, 101, 102]);
    }
}
