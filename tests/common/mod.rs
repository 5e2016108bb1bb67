#![allow(dead_code)]

use parcel_routing::domain::RoutingContext;
use parcel_routing::setup::init::build_context;
use parcel_routing::setup::init_types::{LocationRecord, PackageRecord};

/// Miles between neighboring stops on the test line (ten minutes of driving).
pub const SPACING: f64 = 3.0;

/// 27 locations on a straight road with the hub at one end. Location `i` is
/// `SPACING * i` miles out, stored as a lower-triangular table.
pub fn line_locations() -> Vec<LocationRecord> {
    (0..27)
        .map(|i: usize| LocationRecord {
            description: format!("{} Line Rd", i * 100),
            distances: (0..=i)
                .map(|j| Some(SPACING * (i - j) as f64))
                .collect(),
        })
        .collect()
}

pub fn package(id: usize, location: usize, deadline: &str, notes: &str) -> PackageRecord {
    PackageRecord {
        id,
        street: format!("{} Line Rd", location * 100),
        city: "Salt Lake City".to_string(),
        state: "UT".to_string(),
        zip: "84115".to_string(),
        deadline: deadline.to_string(),
        mass: 5.0,
        notes: notes.to_string(),
    }
}

/// Forty packages along the line. Package `special` sits at `location` with
/// `deadline`; every other package is due at end of day.
pub fn line_context(special: usize, location: usize, deadline: &str) -> RoutingContext {
    let packages = (1..=40)
        .map(|id| {
            if id == special {
                package(id, location, deadline, "")
            } else {
                package(id, id % 26 + 1, "EOD", "")
            }
        })
        .collect();
    build_context(line_locations(), packages).expect("line fixture is consistent")
}
