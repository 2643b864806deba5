//! Layout module orchestrator.
//!
//! Downstream code imports the engine and its occupancy grid from here while
//! the packing logic lives in the private `core` module.

mod core;
pub mod grid;
pub mod sections;

pub use self::core::GridEngine;
pub use grid::OccupancyGrid;
