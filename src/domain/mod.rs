pub mod graph;
pub mod registry;
pub mod solution;
pub mod types;

pub use graph::*;
pub use registry::*;
pub use solution::*;
pub use types::*;
