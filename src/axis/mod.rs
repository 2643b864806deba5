//! Direction abstraction: one packing algorithm, two orientations.
//!
//! All engine algorithms work on `LaneRect` values; `AxisMapping` is the only
//! place that knows whether the primary axis is `x` or `y`.

mod core;

pub use self::core::{AxisMapping, Direction, LaneRect};
