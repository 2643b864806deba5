//! Change detection between two layouts.

mod core;

pub use self::core::{LayoutSnapshot, layout_fingerprint};
