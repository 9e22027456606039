//! # Corridor Graph
//!
//! Plans a minimal network of dark corridors through a city zone map and
//! decides which street lights fall inside it.
//!
//! ## Features
//!
//! - **Cost model** - blend human and animal risk into a per-zone traversal cost
//! - **Adjacency graph** - directed zone graph from polygon topology (petgraph)
//! - **Least-cost paths** - one search per pair of habitat clusters
//! - **Corridor selection** - Kruskal spanning tree over cluster-pair paths
//! - **Lighting exclusion** - fixtures inside corridor zones are switched off
//!
//! ## Architecture
//!
//! ```text
//! Zone[] ──> CostModel ──> CostTable
//!     │                       │
//!     ├──> AdjacencyGraphBuilder (R-tree pruning + Topology::touches)
//!     │      └─ AdjacencyGraph: A -> B weighs cost(B)
//!     │
//!     ├──> ClusterRegistry (A, B, ..., AA, ...)
//!     │
//!     ├──> find_cluster_paths (Dijkstra per pair, rayon)
//!     │      └─ PairwisePaths keyed by PairKey
//!     │
//!     ├──> select (union-find Kruskal)
//!     │      └─ CorridorSet
//!     │
//!     └──> LightingExclusionMapper (R-tree pruning + Topology::within)
//!            └─ retained / excluded fixtures
//! ```

mod builder;
mod clusters;
mod config;
mod cost;
mod error;
mod exclusion;
mod graph;
mod paths;
mod planner;
mod selector;
mod snapshot;
mod spatial;
mod topology;
mod types;

pub use builder::{isolated_clusters, AdjacencyGraphBuilder};
pub use clusters::{label_for, ClusterRegistry};
pub use config::{LabelScheme, PlannerConfig};
pub use cost::{clamp_importance, compute_cost, CostModel, CostTable};
pub use error::{CorridorError, Result};
pub use exclusion::{ExclusionOutcome, LightingExclusionMapper};
pub use graph::{AdjacencyGraph, Route};
pub use paths::{find_cluster_paths, shortest_path, PairwisePaths};
pub use planner::{
    validate_zones, CorridorPlan, CorridorPlanner, PartialPlan, PathStage, PlanOutcome,
};
pub use selector::{select, ClusterPairCostMatrix, CorridorSet};
pub use snapshot::{CostMatrixRow, CostMatrixSnapshot};
pub use topology::{GeoTopology, Topology};
pub use types::{
    pair_label, Cluster, ClusterLabel, Fixture, FixtureId, PairKey, Path, PlanWarning, Zone,
    ZoneId,
};
