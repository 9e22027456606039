use crate::config::LabelScheme;
use crate::error::{CorridorError, Result};
use crate::types::{pair_label, Cluster, ClusterLabel, PairKey, Zone, ZoneId};
use geo::Centroid;
use std::collections::HashMap;

/// Habitat clusters in order of appearance in the zone collection
#[derive(Debug, Clone, Default)]
pub struct ClusterRegistry {
    clusters: Vec<Cluster>,
    by_label: HashMap<ClusterLabel, usize>,
    by_zone: HashMap<ZoneId, usize>,
}

impl ClusterRegistry {
    /// Register one cluster per zone flagged `contains_cluster`
    pub fn from_zones(zones: &[Zone], scheme: LabelScheme) -> Result<Self> {
        let cluster_zones: Vec<&Zone> = zones.iter().filter(|z| z.contains_cluster).collect();

        if let Some(capacity) = scheme.capacity() {
            if cluster_zones.len() > capacity {
                return Err(CorridorError::LabelSpaceExhausted {
                    clusters: cluster_zones.len(),
                    capacity,
                });
            }
        }

        let mut registry = Self::default();
        for (position, zone) in cluster_zones.into_iter().enumerate() {
            if registry.by_zone.contains_key(&zone.id) {
                return Err(CorridorError::DuplicateZone(zone.id));
            }
            let centroid = zone
                .geometry
                .centroid()
                .ok_or_else(|| CorridorError::invalid_zone(zone.id, "cluster zone has no centroid"))?;
            let label = label_for(position);

            registry.by_label.insert(label.clone(), position);
            registry.by_zone.insert(zone.id, position);
            registry.clusters.push(Cluster {
                label,
                zone: zone.id,
                centroid,
            });
        }

        log::info!("Registered {} habitat clusters", registry.len());
        Ok(registry)
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn get(&self, position: usize) -> Option<&Cluster> {
        self.clusters.get(position)
    }

    pub fn position_of_label(&self, label: &str) -> Option<usize> {
        self.by_label.get(&ClusterLabel::new(label)).copied()
    }

    pub fn position_of_zone(&self, zone: ZoneId) -> Option<usize> {
        self.by_zone.get(&zone).copied()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Every unordered pair (i < j), outer loop over i
    pub fn pairs(&self) -> Vec<PairKey> {
        let n = self.clusters.len();
        (0..n)
            .flat_map(|i| (i + 1..n).map(move |j| PairKey { first: i, second: j }))
            .collect()
    }

    /// Display label of a pair, e.g. "AB"
    pub fn pair_label(&self, key: PairKey) -> Option<String> {
        let first = self.clusters.get(key.first)?;
        let second = self.clusters.get(key.second)?;
        Some(pair_label(&first.label, &second.label))
    }
}

/// Bijective base-26 label: 0 -> "A", 25 -> "Z", 26 -> "AA", 27 -> "AB", ...
pub fn label_for(position: usize) -> ClusterLabel {
    let mut n = position + 1;
    let mut symbols = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        symbols.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    symbols.reverse();
    ClusterLabel::new(String::from_utf8_lossy(&symbols).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon};

    fn square(x: f64) -> Polygon<f64> {
        polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]
    }

    fn zones(count: usize, clusters: &[usize]) -> Vec<Zone> {
        (0..count)
            .map(|i| {
                let zone = Zone::new(100 + i as u64, square(i as f64), 0.1, 0.1);
                if clusters.contains(&i) {
                    zone.with_cluster()
                } else {
                    zone
                }
            })
            .collect()
    }

    #[test]
    fn labels_follow_spreadsheet_order() {
        assert_eq!(label_for(0).as_str(), "A");
        assert_eq!(label_for(25).as_str(), "Z");
        assert_eq!(label_for(26).as_str(), "AA");
        assert_eq!(label_for(27).as_str(), "AB");
        assert_eq!(label_for(26 * 27).as_str(), "AAA");
    }

    #[test]
    fn clusters_are_labelled_in_zone_order() {
        let registry = ClusterRegistry::from_zones(&zones(5, &[3, 1]), LabelScheme::Alphabetic)
            .unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.clusters()[0].zone, ZoneId(101));
        assert_eq!(registry.clusters()[0].label.as_str(), "A");
        assert_eq!(registry.clusters()[1].zone, ZoneId(103));
        assert_eq!(registry.position_of_label("B"), Some(1));
        assert_eq!(registry.position_of_zone(ZoneId(103)), Some(1));
        assert_eq!(registry.clusters()[1].centroid.x(), 3.5);
    }

    #[test]
    fn alphabetic_scheme_caps_cluster_count() {
        let all: Vec<usize> = (0..27).collect();
        let err = ClusterRegistry::from_zones(&zones(27, &all), LabelScheme::Alphabetic)
            .unwrap_err();
        assert!(matches!(
            err,
            CorridorError::LabelSpaceExhausted {
                clusters: 27,
                capacity: 26
            }
        ));

        let registry = ClusterRegistry::from_zones(&zones(27, &all), LabelScheme::Extended)
            .unwrap();
        assert_eq!(registry.clusters()[26].label.as_str(), "AA");
    }

    #[test]
    fn pairs_enumerate_upper_triangle() {
        let registry =
            ClusterRegistry::from_zones(&zones(3, &[0, 1, 2]), LabelScheme::Extended).unwrap();
        let labels: Vec<String> = registry
            .pairs()
            .into_iter()
            .filter_map(|key| registry.pair_label(key))
            .collect();
        assert_eq!(labels, vec!["AB", "AC", "BC"]);
    }
}
