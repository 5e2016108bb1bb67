pub mod chaining;

pub use chaining::*;
