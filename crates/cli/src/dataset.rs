use anyhow::{bail, Context, Result};
use corridor_graph::{Fixture, Zone};
use geo::{LineString, Polygon};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Zone map and fixture list as stored on disk
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dataset {
    pub zones: Vec<ZoneRecord>,

    #[serde(default)]
    pub fixtures: Vec<FixtureRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZoneRecord {
    pub zone: u64,

    /// Exterior ring as `[x, y]` pairs; closing the ring is optional
    pub polygon: Vec<[f64; 2]>,

    #[serde(default)]
    pub holes: Vec<Vec<[f64; 2]>>,

    pub human_score: f64,
    pub animal_score: f64,

    /// Habitat relevance; required unless a uniform animal weight is configured
    #[serde(default)]
    pub cluster_score: Option<f64>,

    pub contains_cluster: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureRecord {
    pub id: u64,
    pub point: [f64; 2],
}

impl ZoneRecord {
    pub fn into_zone(self) -> Zone {
        let exterior = LineString::from(self.polygon);
        let interiors = self.holes.into_iter().map(LineString::from).collect();
        let mut zone = Zone::new(
            self.zone,
            Polygon::new(exterior, interiors),
            self.human_score,
            self.animal_score,
        );
        zone.relevance = self.cluster_score;
        zone.contains_cluster = self.contains_cluster;
        zone
    }
}

impl FixtureRecord {
    pub fn into_fixture(self) -> Fixture {
        Fixture::new(self.id, self.point[0], self.point[1])
    }
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        let dataset: Self = serde_json::from_str(&data)
            .with_context(|| format!("Invalid dataset JSON in {}", path.display()))?;
        if dataset.zones.is_empty() {
            bail!("Dataset {} contains no zones", path.display());
        }
        log::info!(
            "Loaded {} zones and {} fixtures from {}",
            dataset.zones.len(),
            dataset.fixtures.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn into_parts(self) -> (Vec<Zone>, Vec<Fixture>) {
        let zones = self.zones.into_iter().map(ZoneRecord::into_zone).collect();
        let fixtures = self
            .fixtures
            .into_iter()
            .map(FixtureRecord::into_fixture)
            .collect();
        (zones, fixtures)
    }
}
