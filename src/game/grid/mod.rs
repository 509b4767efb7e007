//! Board geometry and occupancy.

mod grid;

pub use grid::*;
