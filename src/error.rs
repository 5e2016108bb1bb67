//! Error types for loading, planning and simulating routes.

use thiserror::Error;

/// Failure reported by [`crate::store::ChainingTable`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// No entry is stored under the key.
    #[error("no entry stored under key {key}")]
    KeyNotFound { key: usize },
}

/// Errors raised while building the routing context or running a truck.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Reading or parsing one of the input CSV files failed.
    #[error("failed to read {path}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// Writing the status export failed.
    #[error("failed to write status export to {path}")]
    Export {
        path: String,
        #[source]
        source: csv::Error,
    },

    /// A distance cell could not be parsed as a number.
    #[error("location {location}: distance cell {column} ({raw:?}) is not a number")]
    InvalidDistance {
        location: usize,
        column: usize,
        raw: String,
    },

    /// The distance matrix is not square, symmetric, non-negative with a zero diagonal.
    #[error("distance matrix is malformed at ({from}, {to}): {reason}")]
    MalformedMatrix {
        from: usize,
        to: usize,
        reason: &'static str,
    },

    #[error("location table is empty")]
    NoLocations,

    #[error("package {package_id} has an unrecognised deadline {raw:?}")]
    InvalidDeadline { package_id: usize, raw: String },

    #[error("package id {raw:?} is not a positive integer")]
    InvalidPackageId { raw: String },

    #[error("package {package_id} appears more than once")]
    DuplicatePackage { package_id: usize },

    /// A package address matched no location in the graph.
    #[error("package {package_id} address {street:?} matches no location")]
    UnmatchedPackage { package_id: usize, street: String },

    /// A package address is the hub itself, which no route ever visits.
    #[error("package {package_id} is addressed to the hub")]
    PackageAtHub { package_id: usize },

    #[error("location {location} is not in the graph")]
    UnknownLocation { location: usize },

    #[error("package {package_id} is not registered")]
    UnknownPackage { package_id: usize },

    /// A destination subgraph was built without the hub.
    #[error("destination graph is missing hub location {hub}")]
    MissingHub { hub: usize },

    /// A load package's location is not part of its destination subgraph.
    #[error("package {package_id} destination {location} is absent from the route graph")]
    DestinationNotRouted { package_id: usize, location: usize },

    #[error("route sampler is configured with zero trials")]
    NoTrials,

    #[error("{truck} has no planned route")]
    NoRoute { truck: String },

    #[error("invalid check time {raw:?}: {reason}")]
    InvalidCheckTime { raw: String, reason: &'static str },

    #[error("invalid departure clock {raw:?}")]
    InvalidDeparture { raw: String },
}

pub type Result<T, E = RoutingError> = std::result::Result<T, E>;
