//! Aggregation of loaded and generated data into dashboard rollups.
//!
//! Every function here is a pure transform over borrowed input.

pub mod aggregator;
pub mod cells;
pub mod trend;

pub use aggregator::*;
pub use cells::*;
pub use trend::*;
