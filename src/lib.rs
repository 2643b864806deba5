//! Lane-based packing engine for dashboard tiles.
//!
//! Items live on a grid that is fixed along one axis (the lanes) and grows
//! without bound along the other. The engine keeps the layout compact: every
//! move and resize resolves collisions first by nudging neighbours next to
//! the changed item, then by pulling everything towards the origin.
//!
//! Modules follow an orchestrator pattern: `mod.rs` files re-export the
//! public surface while implementations live in private `core` modules.

pub mod axis;
pub mod config;
pub mod diff;
pub mod error;
pub mod geometry;
pub mod item;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod navigation;
pub mod render;
pub mod session;

pub use axis::{AxisMapping, Direction, LaneRect};
pub use config::{DEFAULT_LANES, GridOptions};
pub use diff::{LayoutSnapshot, layout_fingerprint};
pub use error::{GridError, Result};
pub use geometry::{Position, Resize, Span};
pub use item::{GridItem, clone_items, clone_items_into};
pub use layout::{GridEngine, OccupancyGrid};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{EngineMetrics, MetricSnapshot};
pub use navigation::{FocusCursor, Heading};
pub use render::render_table;
pub use session::DragSession;
