//! Keyboard focus stepping across the occupied cells of a layout.

use crate::geometry::Position;
use crate::layout::GridEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Left,
    Right,
    Up,
    Down,
}

impl Heading {
    fn delta(self) -> (isize, isize) {
        match self {
            Heading::Left => (-1, 0),
            Heading::Right => (1, 0),
            Heading::Up => (0, -1),
            Heading::Down => (0, 1),
        }
    }
}

/// Focused physical cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FocusCursor {
    position: Position,
}

impl FocusCursor {
    pub fn new(position: Position) -> Self {
        Self { position }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn focused_slot<T>(&self, engine: &GridEngine<T>) -> Option<usize> {
        engine.slot_at(self.position)
    }

    /// Walk towards `heading`, skipping empty cells and cells of the item
    /// already in focus. Returns the newly focused slot; at the grid edge the
    /// cursor stays put and `None` is returned.
    pub fn step<T>(&mut self, engine: &GridEngine<T>, heading: Heading) -> Option<usize> {
        let current = engine.slot_at(self.position);
        let extent = engine.extent();
        let (dx, dy) = heading.delta();
        let mut x = self.position.x;
        let mut y = self.position.y;
        loop {
            x = x.checked_add_signed(dx)?;
            y = y.checked_add_signed(dy)?;
            if x >= extent.w || y >= extent.h {
                return None;
            }
            let candidate = Position::new(x, y);
            match engine.slot_at(candidate) {
                Some(slot) if Some(slot) != current => {
                    self.position = candidate;
                    return Some(slot);
                }
                _ => {}
            }
        }
    }
}
