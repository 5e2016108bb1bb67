use std::collections::BTreeSet;

use rand::Rng;
use tracing::{debug, info, trace};

use crate::config::constant::{TRIALS, TRUCK_CAPACITY};
use crate::domain::{DestinationGraph, LocationId, PackageId, PlannedRoute, RoutingContext, Trial};
use crate::error::{Result, RoutingError};
use crate::solver::screening::ScreenedPackages;
use crate::solver::tour::nearest_neighbor_tour;

/// Best-of-K randomized load selection.
#[derive(Debug, Clone, Copy)]
pub struct RouteSampler {
    pub capacity: usize,
    pub trials: usize,
}

impl Default for RouteSampler {
    fn default() -> Self {
        Self {
            capacity: TRUCK_CAPACITY,
            trials: TRIALS,
        }
    }
}

impl RouteSampler {
    pub fn new(capacity: usize, trials: usize) -> Self {
        Self { capacity, trials }
    }

    /// Run every trial and keep the shortest tour; the earliest trial wins ties.
    pub fn best_route<R: Rng>(
        &self,
        ctx: &RoutingContext,
        screened: &ScreenedPackages,
        rng: &mut R,
    ) -> Result<PlannedRoute> {
        let mut best: Option<Trial> = None;
        for trial in self.sample_trials(ctx, screened, rng)? {
            let better = best
                .as_ref()
                .map_or(true, |b| trial.tour.distance < b.tour.distance);
            if better {
                best = Some(trial);
            }
        }

        let best = best.ok_or(RoutingError::NoTrials)?;
        info!(
            "Chose trial {} with {} packages, {:.1} miles: {:?}",
            best.index,
            best.load.len(),
            best.tour.distance,
            best.tour.stops
        );
        Ok(best)
    }

    pub fn sample_trials<R: Rng>(
        &self,
        ctx: &RoutingContext,
        screened: &ScreenedPackages,
        rng: &mut R,
    ) -> Result<Vec<Trial>> {
        let priority = screened.priority_pool();
        let regular = screened.regular_pool();

        (0..self.trials)
            .map(|index| {
                let load = self.build_load(ctx, &priority, regular, &mut *rng)?;
                let destinations = destination_graph(ctx, &load)?;
                let tour = nearest_neighbor_tour(&destinations)?;
                trace!(
                    "trial {}: {} packages, {:.1} miles",
                    index,
                    load.len(),
                    tour.distance
                );
                Ok(Trial {
                    index,
                    load,
                    destinations,
                    tour,
                })
            })
            .collect()
    }

    /// One randomized load: the whole priority pool, then topped up or trimmed
    /// to capacity one location group at a time.
    pub fn build_load<R: Rng>(
        &self,
        ctx: &RoutingContext,
        priority: &BTreeSet<PackageId>,
        regular: &BTreeSet<PackageId>,
        rng: &mut R,
    ) -> Result<BTreeSet<PackageId>> {
        let mut load = priority.clone();

        if load.len() < self.capacity {
            self.fill_load(ctx, &mut load, priority, regular, rng);
        } else if load.len() > self.capacity {
            self.trim_load(ctx, &mut load, priority, rng)?;
        }

        debug_assert!(load.len() <= self.capacity);
        Ok(load)
    }

    fn fill_load<R: Rng>(
        &self,
        ctx: &RoutingContext,
        load: &mut BTreeSet<PackageId>,
        priority: &BTreeSet<PackageId>,
        regular: &BTreeSet<PackageId>,
        rng: &mut R,
    ) {
        while load.len() < self.capacity {
            let room = self.capacity - load.len();

            let mut candidates = qualifying_groups(ctx, priority, load, room);
            if candidates.is_empty() {
                candidates = qualifying_groups(ctx, regular, load, room);
            }
            if candidates.is_empty() {
                break;
            }

            let pick = &candidates[rng.gen_range(0..candidates.len())];
            load.extend(pick.iter().copied());
        }
    }

    fn trim_load<R: Rng>(
        &self,
        ctx: &RoutingContext,
        load: &mut BTreeSet<PackageId>,
        priority: &BTreeSet<PackageId>,
        rng: &mut R,
    ) -> Result<()> {
        while load.len() > self.capacity {
            let outside: Vec<PackageId> = load.difference(priority).copied().collect();
            let pool: Vec<PackageId> = if outside.is_empty() {
                load.iter().copied().collect()
            } else {
                outside
            };

            let victim = pool[rng.gen_range(0..pool.len())];
            let group = ctx
                .index
                .group_of(victim)
                .ok_or(RoutingError::UnknownPackage { package_id: victim })?;
            debug!("Over capacity, dropping group of package {}: {:?}", victim, group);
            load.retain(|id| !group.contains(id));
        }
        Ok(())
    }
}

/// Location groups wholly inside `pool`, untouched by `load`, and no larger
/// than `room`, in location order.
fn qualifying_groups(
    ctx: &RoutingContext,
    pool: &BTreeSet<PackageId>,
    load: &BTreeSet<PackageId>,
    room: usize,
) -> Vec<BTreeSet<PackageId>> {
    ctx.index
        .groups()
        .into_iter()
        .filter(|(_, group)| {
            group.len() <= room && group.is_subset(pool) && group.is_disjoint(load)
        })
        .map(|(_, group)| group.clone())
        .collect()
}

/// Hub plus every location holding a package of `load`.
pub fn destination_graph(ctx: &RoutingContext, load: &BTreeSet<PackageId>) -> Result<DestinationGraph> {
    let locations: BTreeSet<LocationId> = load
        .iter()
        .map(|&id| {
            ctx.index
                .location_of(id)
                .ok_or(RoutingError::UnknownPackage { package_id: id })
        })
        .collect::<Result<_>>()?;

    let graph = DestinationGraph::build(&ctx.graph, &locations)?;
    graph.ensure_hub()?;
    for &package_id in load {
        let location = ctx
            .index
            .location_of(package_id)
            .ok_or(RoutingError::UnknownPackage { package_id })?;
        if !graph.contains(location) {
            return Err(RoutingError::DestinationNotRouted {
                package_id,
                location,
            });
        }
    }
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Deadline, DeliveryStatus, Location, Package, PackageConstraints};
    use crate::evaluation::fitness::is_closed_tour;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::{fixture, rstest};

    /// Six locations on a line; location `i` holds packages listed in `groups[i]`.
    fn line_context(groups: &[&[usize]]) -> RoutingContext {
        let n = groups.len();
        let locations = (0..n)
            .map(|i| Location {
                id: i,
                description: format!("{} Line Rd", i),
                distances: (0..n).map(|j| (i as f64 - j as f64).abs()).collect(),
            })
            .collect();
        let packages = groups
            .iter()
            .enumerate()
            .flat_map(|(loc, ids)| {
                ids.iter().map(move |&id| Package {
                    id,
                    street: format!("{} Line Rd", loc),
                    city: "City".to_string(),
                    state: "UT".to_string(),
                    zip: "84000".to_string(),
                    deadline: Deadline::EndOfDay,
                    mass: 1.0,
                    notes: String::new(),
                    constraints: PackageConstraints::default(),
                    status: DeliveryStatus::AtHub,
                })
            })
            .collect();
        RoutingContext::new(locations, packages).expect("consistent fixture")
    }

    #[fixture]
    fn ctx() -> RoutingContext {
        line_context(&[&[], &[1, 2], &[3], &[4, 5, 6], &[7], &[8, 9]])
    }

    fn set(ids: &[usize]) -> BTreeSet<PackageId> {
        ids.iter().copied().collect()
    }

    #[rstest]
    fn fill_keeps_priority_and_respects_capacity(ctx: RoutingContext) {
        let sampler = RouteSampler::new(5, 10);
        let priority = set(&[3]);
        let regular = set(&[1, 2, 4, 5, 6, 7, 8, 9]);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..20 {
            let load = sampler.build_load(&ctx, &priority, &regular, &mut rng).unwrap();
            assert!(load.contains(&3));
            assert!(load.len() <= 5);
            for (_, group) in ctx.index.groups() {
                assert!(group.is_subset(&load) || group.is_disjoint(&load));
            }
        }
    }

    #[rstest]
    fn fill_stops_when_no_group_fits(ctx: RoutingContext) {
        let sampler = RouteSampler::new(2, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let load = sampler
            .build_load(&ctx, &set(&[3]), &set(&[4, 5, 6]), &mut rng)
            .unwrap();
        assert_eq!(load, set(&[3]));
    }

    #[rstest]
    fn trim_drops_non_priority_groups_first() {
        let ctx = line_context(&[&[], &[1, 2], &[3]]);
        let sampler = RouteSampler::new(2, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut load = set(&[1, 2, 3]);
        sampler.trim_load(&ctx, &mut load, &set(&[1, 2]), &mut rng).unwrap();
        assert_eq!(load, set(&[1, 2]));
    }

    #[rstest]
    fn trim_removes_whole_priority_groups_when_pool_is_too_big(ctx: RoutingContext) {
        let sampler = RouteSampler::new(4, 1);
        let all = set(&[1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let load = sampler.build_load(&ctx, &all, &BTreeSet::new(), &mut rng).unwrap();
        assert!(load.len() <= 4);
        for (_, group) in ctx.index.groups() {
            assert!(group.is_subset(&load) || group.is_disjoint(&load));
        }
    }

    #[rstest]
    fn best_route_is_shortest_trial_and_closed(ctx: RoutingContext) {
        let sampler = RouteSampler::new(4, 12);
        let screened = ScreenedPackages {
            regular: set(&[1, 2, 3, 4, 5, 6, 7, 8, 9]),
            ..ScreenedPackages::default()
        };

        let trials = sampler
            .sample_trials(&ctx, &screened, &mut ChaCha8Rng::seed_from_u64(11))
            .unwrap();
        assert_eq!(trials.len(), 12);
        let shortest = trials
            .iter()
            .map(|t| t.tour.distance)
            .fold(f64::INFINITY, f64::min);

        let best = sampler
            .best_route(&ctx, &screened, &mut ChaCha8Rng::seed_from_u64(11))
            .unwrap();
        assert_eq!(best.tour.distance, shortest);
        let first_shortest = trials.iter().find(|t| t.tour.distance == shortest).unwrap();
        assert_eq!(best.index, first_shortest.index);
        assert!(is_closed_tour(&best.tour.stops, &best.destinations));
    }

    #[rstest]
    fn destination_graph_covers_every_load_package(ctx: RoutingContext) {
        let graph = destination_graph(&ctx, &set(&[3, 8, 9])).unwrap();
        assert_eq!(graph.nodes(), &[0, 2, 5]);
        assert!(matches!(
            destination_graph(&ctx, &set(&[42])),
            Err(RoutingError::UnknownPackage { package_id: 42 })
        ));
    }
}
