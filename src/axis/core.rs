use serde::{Deserialize, Serialize};

use crate::geometry::{Position, Span};

/// Orientation of the primary (packing) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Items flow left to right; lanes are rows.
    #[default]
    Horizontal,
    /// Items flow top to bottom; lanes are columns.
    Vertical,
}

/// Rectangle expressed in abstract grid coordinates.
///
/// `index` runs along the primary axis, `lane` along the fixed-size
/// secondary axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LaneRect {
    pub index: usize,
    pub lane: usize,
    pub index_span: usize,
    pub lane_span: usize,
}

impl LaneRect {
    pub const fn new(index: usize, lane: usize, index_span: usize, lane_span: usize) -> Self {
        Self {
            index,
            lane,
            index_span,
            lane_span,
        }
    }

    /// Same size, different origin.
    pub const fn at(self, index: usize, lane: usize) -> Self {
        Self {
            index,
            lane,
            ..self
        }
    }

    /// One past the last occupied index.
    pub const fn end_index(&self) -> usize {
        self.index.saturating_add(self.index_span)
    }

    /// One past the last occupied lane.
    pub const fn end_lane(&self) -> usize {
        self.lane.saturating_add(self.lane_span)
    }

    /// Whether the two rectangles share at least one cell.
    pub fn collides(&self, other: &LaneRect) -> bool {
        !(other.index >= self.end_index()
            || other.end_index() <= self.index
            || other.lane >= self.end_lane()
            || other.end_lane() <= self.lane)
    }
}

/// Translation between physical `x/y/w/h` and abstract `index/lane`
/// coordinates, fixed once per engine.
#[derive(Clone, Copy)]
pub struct AxisMapping {
    direction: Direction,
    to_lanes: fn(Position, Span) -> LaneRect,
    to_physical: fn(&LaneRect) -> (Position, Span),
}

impl AxisMapping {
    pub fn new(direction: Direction) -> Self {
        match direction {
            Direction::Horizontal => Self {
                direction,
                to_lanes: |pos, span| LaneRect::new(pos.x, pos.y, span.w, span.h),
                to_physical: |rect| {
                    (
                        Position::new(rect.index, rect.lane),
                        Span::new(rect.index_span, rect.lane_span),
                    )
                },
            },
            Direction::Vertical => Self {
                direction,
                to_lanes: |pos, span| LaneRect::new(pos.y, pos.x, span.h, span.w),
                to_physical: |rect| {
                    (
                        Position::new(rect.lane, rect.index),
                        Span::new(rect.lane_span, rect.index_span),
                    )
                },
            },
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn to_lanes(&self, position: Position, span: Span) -> LaneRect {
        (self.to_lanes)(position, span)
    }

    pub fn to_physical(&self, rect: &LaneRect) -> (Position, Span) {
        (self.to_physical)(rect)
    }

    /// Physical position of an abstract `(index, lane)` pair.
    pub fn position_of(&self, index: usize, lane: usize) -> Position {
        self.to_physical(&LaneRect::new(index, lane, 1, 1)).0
    }
}

impl std::fmt::Debug for AxisMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AxisMapping")
            .field("direction", &self.direction)
            .finish()
    }
}
