use serde::{Deserialize, Serialize};

/// One row of the distance table: an address and its distances to every
/// location, blank where the table only lists the lower triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    pub description: String,
    pub distances: Vec<Option<f64>>,
}

/// One row of the package file, matching its header names.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PackageRecord {
    #[serde(rename = "Package ID")]
    pub id: usize,
    #[serde(rename = "Address")]
    pub street: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "Zip")]
    pub zip: String,
    #[serde(rename = "Delivery Deadline")]
    pub deadline: String,
    #[serde(rename = "Mass KILO")]
    pub mass: f64,
    #[serde(rename = "Special Notes", default)]
    pub notes: String,
}
