use serde::{Deserialize, Serialize};

use crate::geometry::{Position, Span};

/// A positioned tile.
///
/// `data` is an opaque caller payload (an id, a widget handle, ...). The
/// engine never reads it except through caller-supplied lookup closures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridItem<T> {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
    /// Derived on first sight: `true` when the item arrived with a zero
    /// secondary span and must always fill every lane.
    #[serde(default)]
    pub auto_span: Option<bool>,
    pub data: T,
}

impl<T> GridItem<T> {
    /// Unplaced item; its position is assigned by packing.
    pub fn new(w: usize, h: usize, data: T) -> Self {
        Self::at(0, 0, w, h, data)
    }

    pub fn at(x: usize, y: usize, w: usize, h: usize, data: T) -> Self {
        Self {
            x,
            y,
            w,
            h,
            auto_span: None,
            data,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn span(&self) -> Span {
        Span::new(self.w, self.h)
    }

    pub(crate) fn set_geometry(&mut self, position: Position, span: Span) {
        self.x = position.x;
        self.y = position.y;
        self.w = span.w;
        self.h = span.h;
    }

    /// Whether position or size differs from `other`.
    pub fn geometry_differs<U>(&self, other: &GridItem<U>) -> bool {
        self.x != other.x || self.y != other.y || self.w != other.w || self.h != other.h
    }
}

/// Copy every record one level deep.
pub fn clone_items<T: Clone>(items: &[GridItem<T>]) -> Vec<GridItem<T>> {
    let mut dest = Vec::with_capacity(items.len());
    clone_items_into(items, &mut dest);
    dest
}

/// Overwrite `dest` with the records of `items`, reusing existing slots and
/// appending missing ones. Extra destination records are left untouched.
pub fn clone_items_into<'a, T: Clone>(
    items: &[GridItem<T>],
    dest: &'a mut Vec<GridItem<T>>,
) -> &'a mut Vec<GridItem<T>> {
    for (idx, item) in items.iter().enumerate() {
        match dest.get_mut(idx) {
            Some(existing) => existing.clone_from(item),
            None => dest.push(item.clone()),
        }
    }
    dest
}
