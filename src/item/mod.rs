//! Item records handed to and mutated by the engine.

mod core;

pub use self::core::{GridItem, clone_items, clone_items_into};
