use std::collections::BTreeSet;

use chrono::NaiveTime;
use serde::Serialize;

use crate::domain::graph::DestinationGraph;
use crate::domain::types::{LocationId, Package, PackageId, TruckId};

/// A closed walk from the hub back to the hub and its length.
#[derive(Debug, Clone, PartialEq)]
pub struct Tour {
    pub stops: Vec<LocationId>,
    pub distance: f64,
}

/// One randomized load and the tour through its destinations.
#[derive(Debug, Clone)]
pub struct Trial {
    pub index: usize,
    pub load: BTreeSet<PackageId>,
    pub destinations: DestinationGraph,
    pub tour: Tour,
}

/// The winning trial, kept by the truck until it drives.
pub type PlannedRoute = Trial;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripOutcome {
    /// Departure is after the check time; nothing moved.
    NotDeparted,
    /// The check time fell before the next stop could be reached.
    Underway,
    /// Every stop was served and the truck returned to the hub.
    Complete,
}

#[derive(Debug, Clone)]
pub struct TripReport {
    pub truck: TruckId,
    pub name: String,
    pub distance: f64,
    /// Locations in visiting order, starting at the hub.
    pub visited: Vec<LocationId>,
    pub outcome: TripOutcome,
    /// Truck clock when the walk stopped.
    pub clock: NaiveTime,
}

impl TripReport {
    pub fn is_complete(&self) -> bool {
        self.outcome == TripOutcome::Complete
    }

    pub fn still_underway(&self) -> bool {
        self.outcome == TripOutcome::Underway
    }
}

#[derive(Debug, Clone, Default)]
pub struct FleetReport {
    pub trips: Vec<TripReport>,
}

impl FleetReport {
    pub fn total_distance(&self) -> f64 {
        self.trips.iter().map(|t| t.distance).sum()
    }
}

/// One line of the package status table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageStatusRow {
    #[serde(rename = "ID")]
    pub id: PackageId,
    #[serde(rename = "Street")]
    pub street: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Zip")]
    pub zip: String,
    #[serde(rename = "Kgs")]
    pub mass: f64,
    #[serde(rename = "Deadline")]
    pub deadline: String,
    #[serde(rename = "Delivery Status")]
    pub status: String,
}

impl From<&Package> for PackageStatusRow {
    fn from(p: &Package) -> Self {
        Self {
            id: p.id,
            street: p.street.clone(),
            city: p.city.clone(),
            zip: p.zip.clone(),
            mass: p.mass,
            deadline: p.deadline.to_string(),
            status: p.status.to_string(),
        }
    }
}
