use serde::{Deserialize, Serialize};

/// Cell coordinate on the physical grid (`x` is the column, `y` the row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Item size measured in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub w: usize,
    pub h: usize,
}

impl Span {
    pub const fn new(w: usize, h: usize) -> Self {
        Self { w, h }
    }
}

/// Requested size change for an item. Missing or zero dimensions keep the
/// item's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resize {
    pub w: Option<usize>,
    pub h: Option<usize>,
}

impl Resize {
    pub const fn width(w: usize) -> Self {
        Self {
            w: Some(w),
            h: None,
        }
    }

    pub const fn height(h: usize) -> Self {
        Self {
            w: None,
            h: Some(h),
        }
    }

    pub const fn both(w: usize, h: usize) -> Self {
        Self {
            w: Some(w),
            h: Some(h),
        }
    }

    pub(crate) fn apply(&self, current: Span) -> Span {
        Span {
            w: self.w.filter(|w| *w > 0).unwrap_or(current.w),
            h: self.h.filter(|h| *h > 0).unwrap_or(current.h),
        }
    }
}
