pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod evaluation;
pub mod fixtures;
pub mod report;
pub mod setup;
pub mod solver;
pub mod store;
