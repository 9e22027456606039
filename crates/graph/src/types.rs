use geo::{Point, Polygon};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable zone identifier from the city zone map
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub u64);

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Street light identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FixtureId(pub u64);

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Atomic spatial unit of the city map with its risk profile
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub id: ZoneId,

    /// Zone outline in a planar coordinate system
    pub geometry: Polygon<f64>,

    /// Risk to humans if the zone is left dark, in [0, 1]
    pub human_score: f64,

    /// Risk to the protected species if the zone is lit, in [0, 1]
    pub animal_score: f64,

    /// Habitat relevance in [0, 1]; drives the per-zone animal importance
    pub relevance: Option<f64>,

    /// Zone hosts a habitat cluster that must be connected
    pub contains_cluster: bool,
}

impl Zone {
    pub fn new(id: u64, geometry: Polygon<f64>, human_score: f64, animal_score: f64) -> Self {
        Self {
            id: ZoneId(id),
            geometry,
            human_score,
            animal_score,
            relevance: None,
            contains_cluster: false,
        }
    }

    pub fn with_relevance(mut self, relevance: f64) -> Self {
        self.relevance = Some(relevance);
        self
    }

    pub fn with_cluster(mut self) -> Self {
        self.contains_cluster = true;
        self
    }
}

/// Point light fixture
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub id: FixtureId,
    pub location: Point<f64>,
}

impl Fixture {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id: FixtureId(id),
            location: Point::new(x, y),
        }
    }
}

/// Cluster label drawn from a deterministic sequence ("A", "B", ..., "AA", ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterLabel(String);

impl ClusterLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_single_symbol(&self) -> bool {
        self.0.chars().count() == 1
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Habitat cluster anchored on one zone
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub label: ClusterLabel,
    pub zone: ZoneId,
    pub centroid: Point<f64>,
}

/// Unordered cluster pair, stored as registry positions with `first < second`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PairKey {
    pub first: usize,
    pub second: usize,
}

impl PairKey {
    /// Normalizes the order so both (a, b) and (b, a) map to the same key
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

/// Joins two cluster labels into a pair label.
///
/// Single-symbol labels concatenate directly ("AB"); multi-symbol labels get a
/// separator so "A" + "AB" and "AA" + "B" stay distinct.
pub fn pair_label(first: &ClusterLabel, second: &ClusterLabel) -> String {
    if first.is_single_symbol() && second.is_single_symbol() {
        format!("{first}{second}")
    } else {
        format!("{first}-{second}")
    }
}

/// Least-cost route between two clusters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    pub key: PairKey,

    /// Concatenated endpoint cluster labels, e.g. "AB"
    pub label: String,

    pub start: ZoneId,
    pub end: ZoneId,

    /// Visited zones from start to end; empty when no route exists
    pub zones: Vec<ZoneId>,

    /// Sum of traversal costs of the zones on the path
    pub score: f64,
}

impl Path {
    pub fn is_found(&self) -> bool {
        !self.zones.is_empty()
    }
}

/// Recoverable conditions surfaced alongside results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanWarning {
    /// Cluster zone with no adjacent zones; nothing can reach it
    IsolatedCluster { label: ClusterLabel, zone: ZoneId },

    /// No route exists between two clusters
    PathNotFound {
        pair: String,
        start: ZoneId,
        end: ZoneId,
    },
}

impl fmt::Display for PlanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsolatedCluster { label, zone } => {
                write!(f, "cluster {label} sits in isolated zone {zone}")
            }
            Self::PathNotFound { pair, start, end } => {
                write!(f, "no path for pair {pair} between zones {start} and {end}")
            }
        }
    }
}
