use crate::selector::CorridorSet;
use crate::spatial::BoundsIndex;
use crate::topology::Topology;
use crate::types::{Fixture, Zone, ZoneId};
use rayon::prelude::*;
use std::collections::BTreeSet;

/// Fixtures split by whether they fall inside the corridor network
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionOutcome {
    /// Zones whose fixtures are switched off
    pub exclusion_zones: BTreeSet<ZoneId>,

    /// Lighting that stays on, in input order
    pub retained: Vec<Fixture>,

    /// Lighting inside the corridors, in input order
    pub excluded: Vec<Fixture>,
}

/// Maps selected corridors onto the fixture set
pub struct LightingExclusionMapper<'t, T: Topology> {
    topology: &'t T,
    parallel: bool,
}

impl<'t, T: Topology> LightingExclusionMapper<'t, T> {
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

    /// Partition `fixtures` into retained and excluded.
    ///
    /// A fixture is excluded when it lies within any zone visited by a
    /// corridor. Every fixture lands in exactly one of the two outputs.
    pub fn map_exclusions(
        &self,
        corridors: &CorridorSet,
        zones: &[Zone],
        fixtures: &[Fixture],
    ) -> ExclusionOutcome {
        let exclusion_zones = corridors.exclusion_zones();
        let areas: Vec<&Zone> = zones
            .iter()
            .filter(|z| exclusion_zones.contains(&z.id))
            .collect();
        if areas.len() < exclusion_zones.len() {
            log::warn!(
                "{} corridor zones are missing from the zone collection",
                exclusion_zones.len() - areas.len()
            );
        }

        let index = BoundsIndex::build(
            areas
                .iter()
                .enumerate()
                .map(|(i, zone)| (i, self.topology.bounds(&zone.geometry))),
        );

        let is_excluded = |fixture: &Fixture| -> bool {
            index
                .containing(&fixture.location)
                .into_iter()
                .any(|i| self.topology.within(&fixture.location, &areas[i].geometry))
        };

        let flags: Vec<bool> = if self.parallel {
            fixtures.par_iter().map(is_excluded).collect()
        } else {
            fixtures.iter().map(is_excluded).collect()
        };

        let mut outcome = ExclusionOutcome {
            exclusion_zones,
            ..Default::default()
        };
        for (fixture, excluded) in fixtures.iter().zip(flags) {
            if excluded {
                outcome.excluded.push(fixture.clone());
            } else {
                outcome.retained.push(fixture.clone());
            }
        }

        log::info!(
            "Lighting update: {} fixtures retained, {} excluded across {} corridor zones",
            outcome.retained.len(),
            outcome.excluded.len(),
            outcome.exclusion_zones.len()
        );

        outcome
    }
}
