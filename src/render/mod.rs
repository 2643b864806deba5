//! Debug rendering of the occupancy matrix.

mod core;

pub use self::core::{render_table, write_table};
