use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::config::constant::HUB;
use crate::domain::graph::LocationGraph;
use crate::domain::solution::PackageStatusRow;
use crate::domain::types::{DeliveryStatus, LocationId, Location, Package, PackageId};
use crate::error::{Result, RoutingError, StoreError};
use crate::store::ChainingTable;

/// Every package of the run, keyed by package id.
#[derive(Debug, Clone)]
pub struct PackageRegistry {
    table: ChainingTable<Package>,
}

impl PackageRegistry {
    pub fn from_packages(packages: Vec<Package>) -> Result<Self> {
        let mut table = ChainingTable::new(packages.len());
        for package in packages {
            let id = package.id;
            if table.insert(id, package).is_some() {
                return Err(RoutingError::DuplicatePackage { package_id: id });
            }
        }
        Ok(Self { table })
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn get(&self, id: PackageId) -> Option<&Package> {
        self.table.lookup(id)
    }

    /// Package ids, ascending.
    pub fn ids(&self) -> Vec<PackageId> {
        self.table.keys()
    }

    pub fn status(&self, id: PackageId) -> Option<DeliveryStatus> {
        self.get(id).map(|p| p.status)
    }

    pub fn set_status(&mut self, id: PackageId, status: DeliveryStatus) -> Result<(), StoreError> {
        trace!("package {} -> {}", id, status);
        self.table.update(id, |package| package.status = status)
    }

    /// Status view of every package, ascending by id.
    pub fn status_rows(&self) -> Vec<PackageStatusRow> {
        self.ids()
            .into_iter()
            .filter_map(|id| self.get(id))
            .map(PackageStatusRow::from)
            .collect()
    }
}

/// Location id to the packages addressed there, plus the reverse lookup.
#[derive(Debug, Clone)]
pub struct LocationPackageIndex {
    by_location: ChainingTable<BTreeSet<PackageId>>,
    by_package: ChainingTable<LocationId>,
}

impl LocationPackageIndex {
    /// Match each package's street against the location descriptions.
    ///
    /// Packages must be addressed to a location other than the hub.
    pub fn build(graph: &LocationGraph, registry: &PackageRegistry) -> Result<Self> {
        let mut by_location = ChainingTable::new(graph.len());
        for id in graph.ids() {
            by_location.insert(id, BTreeSet::new());
        }
        let mut by_package = ChainingTable::new(registry.len());

        for package_id in registry.ids() {
            let package = registry
                .get(package_id)
                .ok_or(RoutingError::UnknownPackage { package_id })?;
            let location = graph.find_by_address(&package.street).ok_or_else(|| {
                RoutingError::UnmatchedPackage {
                    package_id,
                    street: package.street.clone(),
                }
            })?;
            if location == HUB {
                return Err(RoutingError::PackageAtHub { package_id });
            }

            by_location.update(location, |set| {
                set.insert(package_id);
            })?;
            by_package.insert(package_id, location);
        }

        debug!(
            "Indexed {} packages across {} locations",
            by_package.len(),
            by_location.len()
        );
        Ok(Self {
            by_location,
            by_package,
        })
    }

    pub fn location_of(&self, package: PackageId) -> Option<LocationId> {
        self.by_package.lookup(package).copied()
    }

    pub fn packages_at(&self, location: LocationId) -> Option<&BTreeSet<PackageId>> {
        self.by_location.lookup(location)
    }

    /// Every package sharing `package`'s location, itself included.
    pub fn group_of(&self, package: PackageId) -> Option<&BTreeSet<PackageId>> {
        self.location_of(package)
            .and_then(|loc| self.packages_at(loc))
    }

    /// Non-empty location groups, ascending by location id.
    pub fn groups(&self) -> Vec<(LocationId, &BTreeSet<PackageId>)> {
        self.by_location
            .keys()
            .into_iter()
            .filter_map(|loc| self.packages_at(loc).map(|set| (loc, set)))
            .filter(|(_, set)| !set.is_empty())
            .collect()
    }
}

/// The location graph, the package registry and the index joining them.
///
/// Built once per run. Every truck plans against `&RoutingContext` and
/// delivers through `&mut RoutingContext`, so status changes made by one truck
/// are seen by the next one's screening.
#[derive(Debug, Clone)]
pub struct RoutingContext {
    pub graph: LocationGraph,
    pub registry: PackageRegistry,
    pub index: LocationPackageIndex,
}

impl RoutingContext {
    pub fn new(locations: Vec<Location>, packages: Vec<Package>) -> Result<Self> {
        let graph = LocationGraph::from_locations(locations)?;
        let registry = PackageRegistry::from_packages(packages)?;
        let index = LocationPackageIndex::build(&graph, &registry)?;
        Ok(Self {
            graph,
            registry,
            index,
        })
    }
}
