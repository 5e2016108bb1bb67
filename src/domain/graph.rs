use std::collections::BTreeSet;

use crate::config::constant::HUB;
use crate::domain::types::{Location, LocationId};
use crate::error::{Result, RoutingError};
use crate::store::ChainingTable;

const SYMMETRY_TOLERANCE: f64 = 1e-9;

/// Every location and the full distance matrix between them.
#[derive(Debug, Clone)]
pub struct LocationGraph {
    table: ChainingTable<Location>,
}

impl LocationGraph {
    /// Build the graph from locations whose ids are `0..n`.
    ///
    /// The matrix must be square, symmetric, non-negative and zero on the
    /// diagonal.
    pub fn from_locations(locations: Vec<Location>) -> Result<Self> {
        let n = locations.len();
        if n == 0 {
            return Err(RoutingError::NoLocations);
        }

        for (row, loc) in locations.iter().enumerate() {
            if loc.id != row {
                return Err(RoutingError::MalformedMatrix {
                    from: loc.id,
                    to: row,
                    reason: "location ids must be dense and ordered",
                });
            }
            if loc.distances.len() != n {
                return Err(RoutingError::MalformedMatrix {
                    from: row,
                    to: loc.distances.len(),
                    reason: "row length differs from location count",
                });
            }
        }

        for i in 0..n {
            for j in 0..n {
                let d = locations[i].distances[j];
                if !d.is_finite() || d < 0.0 {
                    return Err(RoutingError::MalformedMatrix {
                        from: i,
                        to: j,
                        reason: "distance must be finite and non-negative",
                    });
                }
                if i == j && d != 0.0 {
                    return Err(RoutingError::MalformedMatrix {
                        from: i,
                        to: j,
                        reason: "diagonal must be zero",
                    });
                }
                if (d - locations[j].distances[i]).abs() > SYMMETRY_TOLERANCE {
                    return Err(RoutingError::MalformedMatrix {
                        from: i,
                        to: j,
                        reason: "matrix is not symmetric",
                    });
                }
            }
        }

        let mut table = ChainingTable::new(n);
        for loc in locations {
            table.insert(loc.id, loc);
        }
        Ok(Self { table })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.table.lookup(id)
    }

    pub fn distance(&self, from: LocationId, to: LocationId) -> Option<f64> {
        self.location(from)
            .and_then(|loc| loc.distances.get(to))
            .copied()
    }

    pub fn ids(&self) -> Vec<LocationId> {
        self.table.keys()
    }

    /// Id of the location whose description is `street`, ignoring case and
    /// surrounding whitespace.
    pub fn find_by_address(&self, street: &str) -> Option<LocationId> {
        let wanted = street.trim();
        self.ids().into_iter().find(|id| {
            self.location(*id)
                .is_some_and(|loc| loc.description.trim().eq_ignore_ascii_case(wanted))
        })
    }
}

/// The hub plus the locations one load visits, with edges restricted to them.
#[derive(Debug, Clone)]
pub struct DestinationGraph {
    adjacency: ChainingTable<Vec<(LocationId, f64)>>,
    nodes: Vec<LocationId>,
}

impl DestinationGraph {
    /// Restrict `graph` to `destinations` and the hub.
    pub fn build(graph: &LocationGraph, destinations: &BTreeSet<LocationId>) -> Result<Self> {
        let mut nodes: BTreeSet<LocationId> = destinations.clone();
        nodes.insert(HUB);
        let nodes: Vec<LocationId> = nodes.into_iter().collect();

        let mut adjacency = ChainingTable::new(graph.len());
        for &from in &nodes {
            let row = graph
                .location(from)
                .ok_or(RoutingError::UnknownLocation { location: from })?;
            let edges: Vec<(LocationId, f64)> = nodes
                .iter()
                .filter(|&&to| to != from)
                .map(|&to| {
                    row.distances
                        .get(to)
                        .map(|d| (to, *d))
                        .ok_or(RoutingError::UnknownLocation { location: to })
                })
                .collect::<Result<_>>()?;
            adjacency.insert(from, edges);
        }

        Ok(Self { adjacency, nodes })
    }

    /// Node ids, ascending. Always includes the hub.
    pub fn nodes(&self) -> &[LocationId] {
        &self.nodes
    }

    pub fn contains(&self, id: LocationId) -> bool {
        self.adjacency.contains_key(id)
    }

    /// Other nodes reachable from `id`, ascending by id.
    pub fn neighbors(&self, id: LocationId) -> Result<&[(LocationId, f64)]> {
        self.adjacency
            .lookup(id)
            .map(Vec::as_slice)
            .ok_or(RoutingError::UnknownLocation { location: id })
    }

    pub fn distance(&self, from: LocationId, to: LocationId) -> Option<f64> {
        if from == to {
            return self.contains(from).then_some(0.0);
        }
        self.adjacency
            .lookup(from)?
            .iter()
            .find(|(id, _)| *id == to)
            .map(|(_, d)| *d)
    }

    pub fn ensure_hub(&self) -> Result<()> {
        if self.contains(HUB) {
            Ok(())
        } else {
            Err(RoutingError::MissingHub { hub: HUB })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn loc(id: usize, name: &str, distances: &[f64]) -> Location {
        Location {
            id,
            description: name.to_string(),
            distances: distances.to_vec(),
        }
    }

    #[fixture]
    fn square() -> LocationGraph {
        LocationGraph::from_locations(vec![
            loc(0, "Hub", &[0.0, 1.0, 2.0, 3.0]),
            loc(1, "1 Elm St", &[1.0, 0.0, 1.5, 2.5]),
            loc(2, "2 Oak St", &[2.0, 1.5, 0.0, 1.0]),
            loc(3, "3 Ash St", &[3.0, 2.5, 1.0, 0.0]),
        ])
        .expect("valid matrix")
    }

    #[rstest]
    fn looks_up_distances_and_addresses(square: LocationGraph) {
        assert_eq!(square.len(), 4);
        assert_eq!(square.distance(1, 3), Some(2.5));
        assert_eq!(square.find_by_address("  2 oak st "), Some(2));
        assert_eq!(square.find_by_address("9 Nowhere"), None);
    }

    #[rstest]
    fn rejects_asymmetric_matrix() {
        let err = LocationGraph::from_locations(vec![
            loc(0, "Hub", &[0.0, 1.0]),
            loc(1, "A", &[2.0, 0.0]),
        ])
        .unwrap_err();
        assert!(matches!(err, RoutingError::MalformedMatrix { .. }));
    }

    #[rstest]
    fn rejects_nonzero_diagonal_and_short_rows() {
        assert!(LocationGraph::from_locations(vec![
            loc(0, "Hub", &[1.0, 1.0]),
            loc(1, "A", &[1.0, 0.0]),
        ])
        .is_err());
        assert!(LocationGraph::from_locations(vec![
            loc(0, "Hub", &[0.0]),
            loc(1, "A", &[1.0, 0.0]),
        ])
        .is_err());
        assert!(matches!(
            LocationGraph::from_locations(vec![]),
            Err(RoutingError::NoLocations)
        ));
    }

    #[rstest]
    fn destination_graph_always_has_hub(square: LocationGraph) {
        let dests: BTreeSet<LocationId> = [3].into_iter().collect();
        let sub = DestinationGraph::build(&square, &dests).expect("known locations");
        assert_eq!(sub.nodes(), &[0, 3]);
        sub.ensure_hub().expect("hub present");
        assert_eq!(sub.neighbors(0).unwrap(), &[(3, 3.0)]);
        assert_eq!(sub.distance(3, 0), Some(3.0));
        assert_eq!(sub.distance(1, 0), None);
    }

    #[rstest]
    fn destination_graph_rejects_unknown_location(square: LocationGraph) {
        let dests: BTreeSet<LocationId> = [9].into_iter().collect();
        assert!(matches!(
            DestinationGraph::build(&square, &dests),
            Err(RoutingError::UnknownLocation { location: 9 })
        ));
    }
}
