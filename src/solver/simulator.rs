//! Time-aware walk of a planned route up to a check time.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveTime};
use tracing::{debug, info};

use crate::clock::{arrival_after, format_clock};
use crate::config::constant::{DEADLINE_WINDOW_MINUTES, HUB};
use crate::domain::{DeliveryStatus, LocationId, PlannedRoute, RoutingContext, TripOutcome};
use crate::error::{Result, RoutingError};
use crate::solver::tour::nearest_unvisited;

/// Where the walk ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct Walk {
    pub distance: f64,
    pub visited: Vec<LocationId>,
    pub outcome: TripOutcome,
    pub clock: NaiveTime,
}

/// Drive `route` from `departure`, stopping before any leg that would arrive
/// after `check_time`.
///
/// Load packages go `AtHub -> InRoute` when the truck leaves and
/// `InRoute -> Delivered` when their location is reached. Nothing changes if
/// the truck has not left by `check_time`.
pub fn simulate_delivery(
    ctx: &mut RoutingContext,
    route: &PlannedRoute,
    departure: NaiveTime,
    check_time: NaiveTime,
) -> Result<Walk> {
    if departure > check_time {
        debug!(
            "Departure {} is after check time {}, truck stays at hub",
            format_clock(departure),
            format_clock(check_time)
        );
        return Ok(Walk {
            distance: 0.0,
            visited: vec![],
            outcome: TripOutcome::NotDeparted,
            clock: departure,
        });
    }

    for &id in &route.load {
        if ctx.registry.status(id).is_some_and(|s| s.is_at_hub()) {
            ctx.registry.set_status(id, DeliveryStatus::InRoute)?;
        }
    }

    let graph = &route.destinations;
    graph.ensure_hub()?;

    let mut visited = BTreeSet::from([HUB]);
    let mut order = vec![HUB];
    let mut current = HUB;
    let mut clock = departure;
    let mut distance = 0.0;

    loop {
        let neighbors = graph.neighbors(current)?;
        let next = due_soon(ctx, route, neighbors, &visited, clock)
            .or_else(|| nearest_unvisited(neighbors, &visited));
        let Some((next, leg)) = next else {
            break;
        };

        let arrival = match arrival_after(clock, leg) {
            Some(arrival) if arrival <= check_time => arrival,
            _ => {
                info!(
                    "Check time {} reached before location {}, delivery still underway",
                    format_clock(check_time),
                    next
                );
                return Ok(Walk {
                    distance,
                    visited: order,
                    outcome: TripOutcome::Underway,
                    clock,
                });
            }
        };

        clock = arrival;
        distance += leg;
        current = next;
        visited.insert(next);
        order.push(next);
        deliver_at(ctx, route, next, arrival)?;
    }

    distance += graph
        .distance(current, HUB)
        .ok_or(RoutingError::MissingHub { hub: HUB })?;
    order.push(HUB);

    Ok(Walk {
        distance,
        visited: order,
        outcome: TripOutcome::Complete,
        clock,
    })
}

/// First unvisited neighbor (lowest id) holding a load package whose deadline
/// is still ahead of `clock` and less than the window away.
fn due_soon(
    ctx: &RoutingContext,
    route: &PlannedRoute,
    neighbors: &[(LocationId, f64)],
    visited: &BTreeSet<LocationId>,
    clock: NaiveTime,
) -> Option<(LocationId, f64)> {
    let window = Duration::minutes(DEADLINE_WINDOW_MINUTES);

    neighbors
        .iter()
        .filter(|(id, _)| !visited.contains(id))
        .find(|(id, _)| {
            ctx.index.packages_at(*id).is_some_and(|packages| {
                packages
                    .iter()
                    .filter(|p| route.load.contains(*p))
                    .filter_map(|p| ctx.registry.get(*p))
                    .filter_map(|p| p.deadline.time())
                    .any(|deadline| deadline > clock && deadline - clock < window)
            })
        })
        .copied()
}

fn deliver_at(
    ctx: &mut RoutingContext,
    route: &PlannedRoute,
    location: LocationId,
    arrival: NaiveTime,
) -> Result<()> {
    let packages: Vec<_> = ctx
        .index
        .packages_at(location)
        .ok_or(RoutingError::UnknownLocation { location })?
        .iter()
        .copied()
        .filter(|id| route.load.contains(id))
        .collect();

    for id in packages {
        if ctx.registry.status(id) == Some(DeliveryStatus::InRoute) {
            ctx.registry.set_status(id, DeliveryStatus::Delivered(arrival))?;
        }
    }
    debug!("Reached location {} at {}", location, format_clock(arrival));
    Ok(())
}
