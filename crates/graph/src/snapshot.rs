use crate::error::{CorridorError, Result};
use crate::graph::AdjacencyGraph;
use crate::types::{Zone, ZoneId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

const SNAPSHOT_VERSION: u32 = 1;

/// Tabular cost matrix: one row per zone, one cell per neighbouring zone
/// holding that neighbour's traversal cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostMatrixSnapshot {
    pub version: u32,
    pub rows: Vec<CostMatrixRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostMatrixRow {
    pub zone: ZoneId,

    /// Neighbour zone -> cost of that neighbour; non-neighbours are absent
    pub cells: BTreeMap<ZoneId, f64>,
}

impl CostMatrixSnapshot {
    pub fn from_graph(graph: &AdjacencyGraph) -> Self {
        let rows = graph
            .zones()
            .map(|zone| CostMatrixRow {
                zone,
                cells: graph.neighbors(zone).into_iter().collect(),
            })
            .collect();
        Self {
            version: SNAPSHOT_VERSION,
            rows,
        }
    }

    /// Rebuild the adjacency graph: nodes in row order, then each row's edges
    /// in ascending neighbour order
    pub fn to_graph(&self) -> Result<AdjacencyGraph> {
        if self.version != SNAPSHOT_VERSION {
            return Err(CorridorError::Snapshot(format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                self.version
            )));
        }

        let mut graph = AdjacencyGraph::new();
        let mut seen = HashSet::with_capacity(self.rows.len());
        for row in &self.rows {
            if !seen.insert(row.zone) {
                return Err(CorridorError::Snapshot(format!(
                    "zone {} appears in more than one row",
                    row.zone
                )));
            }
            graph.add_zone(row.zone);
        }

        for row in &self.rows {
            for (&neighbour, &cost) in &row.cells {
                if !seen.contains(&neighbour) {
                    return Err(CorridorError::Snapshot(format!(
                        "row {} references zone {neighbour} which has no row",
                        row.zone
                    )));
                }
                if !cost.is_finite() || cost < 0.0 {
                    return Err(CorridorError::Snapshot(format!(
                        "row {} has invalid cost {cost} for zone {neighbour}",
                        row.zone
                    )));
                }
                graph.add_edge(row.zone, neighbour, cost);
            }
        }

        log::info!(
            "Restored adjacency graph from snapshot: {} zones, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok(graph)
    }

    /// Check that every snapshot zone exists in the zone collection
    pub fn check_against(&self, zones: &[Zone]) -> Result<()> {
        let known: HashSet<ZoneId> = zones.iter().map(|z| z.id).collect();
        match self.rows.iter().find(|row| !known.contains(&row.zone)) {
            Some(row) => Err(CorridorError::UnknownZone(row.zone)),
            None => Ok(()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        log::info!("Saved cost matrix snapshot to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        let snapshot: Self = serde_json::from_slice(&data)?;
        log::info!(
            "Loaded cost matrix snapshot with {} rows from {}",
            snapshot.rows.len(),
            path.display()
        );
        Ok(snapshot)
    }
}

impl AdjacencyGraph {
    pub fn from_snapshot(snapshot: &CostMatrixSnapshot) -> Result<Self> {
        snapshot.to_graph()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn sample_graph() -> AdjacencyGraph {
        let mut graph = AdjacencyGraph::new();
        for zone in [1, 2, 3] {
            graph.add_zone(ZoneId(zone));
        }
        graph.add_edge(ZoneId(1), ZoneId(2), 0.9);
        graph.add_edge(ZoneId(2), ZoneId(1), 0.2);
        graph.add_edge(ZoneId(2), ZoneId(3), 0.4);
        graph.add_edge(ZoneId(3), ZoneId(2), 0.9);
        graph
    }

    #[test]
    fn test_snapshot_roundtrip_through_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/cost_matrix.json");

        let graph = sample_graph();
        CostMatrixSnapshot::from_graph(&graph).save(&path).unwrap();

        let restored = AdjacencyGraph::from_snapshot(&CostMatrixSnapshot::load(&path).unwrap())
            .unwrap();
        assert_eq!(restored.edges(), graph.edges());
        assert_eq!(restored.node_count(), 3);
    }

    #[test]
    fn test_rows_hold_neighbour_costs() {
        let snapshot = CostMatrixSnapshot::from_graph(&sample_graph());
        assert_eq!(snapshot.rows.len(), 3);
        assert_eq!(
            snapshot.rows[1].cells,
            BTreeMap::from([(ZoneId(1), 0.2), (ZoneId(3), 0.4)])
        );
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let mut snapshot = CostMatrixSnapshot::from_graph(&sample_graph());
        snapshot.rows[0].cells.insert(ZoneId(99), 0.1);
        assert!(matches!(
            snapshot.to_graph(),
            Err(CorridorError::Snapshot(_))
        ));
    }

    #[test]
    fn test_unknown_version_rejected() {
        let mut snapshot = CostMatrixSnapshot::from_graph(&sample_graph());
        snapshot.version = 7;
        assert!(snapshot.to_graph().is_err());
    }
}
