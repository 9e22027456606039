use crate::types::ZoneId;
use petgraph::algo::astar;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Directed zone graph; an edge A -> B weighs the traversal cost of B
#[derive(Debug, Clone, Default)]
pub struct AdjacencyGraph {
    /// Zone -> zone with destination cost as weight
    graph: DiGraph<ZoneId, f64>,

    /// Zone id -> NodeIndex mapping for fast lookup
    zone_index: HashMap<ZoneId, NodeIndex>,
}

/// Least-cost route found by the search
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub zones: Vec<ZoneId>,

    /// Sum of edge weights used by the search objective
    pub edge_cost: f64,
}

impl AdjacencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add zone node; adding the same zone twice returns the existing node
    pub fn add_zone(&mut self, zone: ZoneId) -> NodeIndex {
        if let Some(&idx) = self.zone_index.get(&zone) {
            return idx;
        }
        let idx = self.graph.add_node(zone);
        self.zone_index.insert(zone, idx);
        idx
    }

    /// Add directed edge. Self-loops are ignored.
    pub fn add_edge(&mut self, from: ZoneId, to: ZoneId, weight: f64) {
        if from == to {
            return;
        }
        let a = self.add_zone(from);
        let b = self.add_zone(to);
        self.graph.add_edge(a, b, weight);
    }

    pub fn contains_zone(&self, zone: ZoneId) -> bool {
        self.zone_index.contains_key(&zone)
    }

    /// Zones in insertion order
    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.graph.node_indices().map(move |idx| self.graph[idx])
    }

    /// Outgoing edges of `zone` as (neighbour, weight), in insertion order
    pub fn neighbors(&self, zone: ZoneId) -> Vec<(ZoneId, f64)> {
        let Some(&idx) = self.zone_index.get(&zone) else {
            return Vec::new();
        };
        let mut out: Vec<(ZoneId, f64)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.graph[e.target()], *e.weight()))
            .collect();
        // petgraph walks adjacency lists newest-first
        out.reverse();
        out
    }

    pub fn out_degree(&self, zone: ZoneId) -> usize {
        self.zone_index
            .get(&zone)
            .map(|&idx| self.graph.edges_directed(idx, Direction::Outgoing).count())
            .unwrap_or(0)
    }

    /// All edges as (from, to, weight) in insertion order
    pub fn edges(&self) -> Vec<(ZoneId, ZoneId, f64)> {
        self.graph
            .edge_indices()
            .filter_map(|e| {
                let (a, b) = self.graph.edge_endpoints(e)?;
                Some((self.graph[a], self.graph[b], self.graph[e]))
            })
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Least-cost route from `start` to `end` (Dijkstra; A* with a zero heuristic).
    ///
    /// Returns `None` when either zone is absent or no route exists. Equal-cost
    /// ties resolve by graph construction order, so a fixed graph always yields
    /// the same route.
    pub fn shortest_path(&self, start: ZoneId, end: ZoneId) -> Option<Route> {
        let &from = self.zone_index.get(&start)?;
        let &to = self.zone_index.get(&end)?;

        let (edge_cost, nodes) = astar(
            &self.graph,
            from,
            |n| n == to,
            |e| *e.weight(),
            |_| 0.0,
        )?;

        Some(Route {
            zones: nodes.into_iter().map(|idx| self.graph[idx]).collect(),
            edge_cost,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> AdjacencyGraph {
        // 1 - 2 - 3 - 4 with costs [0.2, 0.9, 0.9, 0.2]
        let costs = [(1, 0.2), (2, 0.9), (3, 0.9), (4, 0.2)];
        let mut graph = AdjacencyGraph::new();
        for (zone, _) in costs {
            graph.add_zone(ZoneId(zone));
        }
        for window in costs.windows(2) {
            let (a, ca) = window[0];
            let (b, cb) = window[1];
            graph.add_edge(ZoneId(a), ZoneId(b), cb);
            graph.add_edge(ZoneId(b), ZoneId(a), ca);
        }
        graph
    }

    #[test]
    fn test_shortest_path_walks_the_line() {
        let graph = line_graph();
        let route = graph.shortest_path(ZoneId(1), ZoneId(4)).unwrap();
        assert_eq!(
            route.zones,
            vec![ZoneId(1), ZoneId(2), ZoneId(3), ZoneId(4)]
        );
        assert!((route.edge_cost - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_route_is_none() {
        let mut graph = line_graph();
        graph.add_zone(ZoneId(9));
        assert!(graph.shortest_path(ZoneId(1), ZoneId(9)).is_none());
        assert!(graph.shortest_path(ZoneId(1), ZoneId(42)).is_none());
    }

    #[test]
    fn test_self_loops_are_dropped() {
        let mut graph = AdjacencyGraph::new();
        graph.add_edge(ZoneId(1), ZoneId(1), 0.5);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_neighbors_in_insertion_order() {
        let mut graph = AdjacencyGraph::new();
        graph.add_edge(ZoneId(1), ZoneId(2), 0.1);
        graph.add_edge(ZoneId(1), ZoneId(3), 0.3);
        assert_eq!(
            graph.neighbors(ZoneId(1)),
            vec![(ZoneId(2), 0.1), (ZoneId(3), 0.3)]
        );
        assert_eq!(graph.out_degree(ZoneId(2)), 0);
    }

    #[test]
    fn test_cheaper_detour_wins() {
        // 1 -> 2 direct is expensive, 1 -> 3 -> 2 is cheap
        let mut graph = AdjacencyGraph::new();
        graph.add_edge(ZoneId(1), ZoneId(2), 5.0);
        graph.add_edge(ZoneId(1), ZoneId(3), 1.0);
        graph.add_edge(ZoneId(3), ZoneId(2), 1.0);
        let route = graph.shortest_path(ZoneId(1), ZoneId(2)).unwrap();
        assert_eq!(route.zones, vec![ZoneId(1), ZoneId(3), ZoneId(2)]);
    }
}
