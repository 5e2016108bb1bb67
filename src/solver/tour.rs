use std::collections::BTreeSet;

use crate::config::constant::HUB;
use crate::domain::{DestinationGraph, LocationId, Tour};
use crate::error::{Result, RoutingError};

/// Closest neighbor not yet in `visited`.
///
/// `neighbors` is ascending by id, so on equal distances the lowest id wins.
pub fn nearest_unvisited(
    neighbors: &[(LocationId, f64)],
    visited: &BTreeSet<LocationId>,
) -> Option<(LocationId, f64)> {
    neighbors
        .iter()
        .filter(|(id, _)| !visited.contains(id))
        .fold(None, |best, &(id, d)| match best {
            Some((_, best_d)) if best_d <= d => best,
            _ => Some((id, d)),
        })
}

/// Nearest-neighbor tour over `graph`: from the hub, always step to the
/// closest unvisited node, then return to the hub.
pub fn nearest_neighbor_tour(graph: &DestinationGraph) -> Result<Tour> {
    graph.ensure_hub()?;

    let mut visited = BTreeSet::from([HUB]);
    let mut stops = vec![HUB];
    let mut distance = 0.0;
    let mut current = HUB;

    while let Some((next, d)) = nearest_unvisited(graph.neighbors(current)?, &visited) {
        visited.insert(next);
        stops.push(next);
        distance += d;
        current = next;
    }

    distance += graph
        .distance(current, HUB)
        .ok_or(RoutingError::MissingHub { hub: HUB })?;
    stops.push(HUB);

    Ok(Tour { stops, distance })
}
