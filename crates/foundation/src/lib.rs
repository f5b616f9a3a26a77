//! Coordinate math shared by the roster and the map store.

pub mod error;
pub mod math;

pub use error::*;
