use std::collections::BTreeSet;

use crate::config::constant::HUB;
use crate::domain::{DestinationGraph, LocationId};

/// Length of the walk through `stops`, or `None` if a leg leaves `graph`.
pub fn find_distance(stops: &[LocationId], graph: &DestinationGraph) -> Option<f64> {
    stops
        .windows(2)
        .map(|leg| dist_between(leg[0], leg[1], graph))
        .sum()
}

pub fn dist_between(from_loc: LocationId, to_loc: LocationId, graph: &DestinationGraph) -> Option<f64> {
    graph.distance(from_loc, to_loc)
}

/// Whether `stops` starts and ends at the hub and visits every other node of
/// `graph` exactly once.
pub fn is_closed_tour(stops: &[LocationId], graph: &DestinationGraph) -> bool {
    let (Some(&first), Some(&last)) = (stops.first(), stops.last()) else {
        return false;
    };
    if first != HUB || last != HUB || stops.len() < 2 {
        return false;
    }

    let inner = &stops[1..stops.len() - 1];
    let unique: BTreeSet<LocationId> = inner.iter().copied().collect();
    let expected: BTreeSet<LocationId> = graph.nodes().iter().copied().filter(|&id| id != HUB).collect();

    unique.len() == inner.len() && unique == expected
}
