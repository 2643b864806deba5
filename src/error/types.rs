use thiserror::Error;

/// Unified result type for the grid engine.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors surfaced by the grid engine.
///
/// Slots refer to an item's position in the list handed to the engine at
/// construction; they never change for the lifetime of the engine.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("lane count must be at least 1")]
    InvalidLanes,
    #[error("section span must be at least 1")]
    InvalidSectionSpan,
    #[error("item {slot} has a zero span along the primary axis")]
    InvalidItemSpan { slot: usize },
    #[error("item {slot} at lane {lane} spanning {lane_span} lanes exceeds {lanes} lanes")]
    ItemOutOfBounds {
        slot: usize,
        lane: usize,
        lane_span: usize,
        lanes: usize,
    },
    #[error("item {slot} spans {index_span} columns but sections are {section_span} wide")]
    SpanExceedsSection {
        slot: usize,
        index_span: usize,
        section_span: usize,
    },
    #[error("item {slot} at index {index} spanning {index_span} crosses a {section_span}-wide section")]
    ItemCrossesSection {
        slot: usize,
        index: usize,
        index_span: usize,
        section_span: usize,
    },
    #[error("items {first} and {second} overlap")]
    OverlappingItems { first: usize, second: usize },
    #[error("item slot {0} not found")]
    ItemNotFound(usize),
    #[error("invalid grid options: {0}")]
    Config(#[from] serde_json::Error),
}
