//! Section mode: the primary axis is cut into fixed-width sections that no
//! item may straddle.

use std::collections::BTreeSet;

use serde_json::json;

use crate::axis::LaneRect;
use crate::logging::{LogLevel, json_kv};

use super::core::GridEngine;

pub fn section_of(index: usize, section_span: usize) -> usize {
    index / section_span
}

pub fn section_start(index: usize, section_span: usize) -> usize {
    section_of(index, section_span) * section_span
}

/// Whether the rectangle's first and last index fall in different sections.
pub fn crosses(rect: &LaneRect, section_span: usize) -> bool {
    let last = rect.end_index().saturating_sub(1).max(rect.index);
    section_of(rect.index, section_span) != section_of(last, section_span)
}

/// First column at or after `column` where an item `index_span` wide stays
/// inside one section.
pub fn align_to_section(column: usize, index_span: usize, section_span: usize) -> usize {
    let rect = LaneRect::new(column, 0, index_span, 1);
    if crosses(&rect, section_span) {
        section_start(column, section_span) + section_span
    } else {
        column
    }
}

/// Pull `index` left until an item `index_span` wide ends at or before the
/// boundary of the section `index` lies in.
pub fn snap_into_section(index: usize, index_span: usize, section_span: usize) -> usize {
    let rect = LaneRect::new(index, 0, index_span, 1);
    if crosses(&rect, section_span) {
        section_start(index, section_span) + section_span.saturating_sub(index_span)
    } else {
        index
    }
}

impl<T: Clone> GridEngine<T> {
    /// Shift every item in `section` and beyond one section to the right,
    /// leaving `section` empty. No-op without section mode.
    pub fn move_all_sections_to_the_right(&mut self, section: usize) {
        let Some(section_span) = self.options.section_span else {
            return;
        };
        self.shift_sections_right(section * section_span, section_span, None);
        self.generate_grid();
    }

    /// Number of sections spanned by the current grid.
    pub fn section_count(&self) -> usize {
        match self.options.section_span {
            Some(section_span) => self.grid.len().div_ceil(section_span),
            None => 0,
        }
    }

    /// Give `slot` a section of its own by pushing everything else from its
    /// section onwards one section to the right.
    pub(super) fn open_section_for(&mut self, slot: usize, section_span: usize) {
        let from = section_start(self.rect(slot).index, section_span);
        self.shift_sections_right(from, section_span, Some(slot));
        self.generate_grid();
    }

    fn shift_sections_right(&mut self, from: usize, section_span: usize, keep: Option<usize>) {
        for slot in 0..self.items.len() {
            if Some(slot) == keep {
                continue;
            }
            let rect = self.rect(slot);
            if rect.index >= from {
                self.set_rect(slot, rect.at(rect.index + section_span, rect.lane));
            }
        }
    }

    /// Remove empty sections lying before the last occupied one. Returns the
    /// number of sections removed.
    pub(super) fn compact_sections(&mut self, section_span: usize) -> usize {
        let occupied: BTreeSet<usize> = (0..self.items.len())
            .map(|slot| section_of(self.rect(slot).index, section_span))
            .collect();
        let Some(&last) = occupied.iter().next_back() else {
            return 0;
        };
        let removed = last + 1 - occupied.len();
        if removed == 0 {
            return 0;
        }

        for slot in 0..self.items.len() {
            let rect = self.rect(slot);
            let section = section_of(rect.index, section_span);
            let target = occupied.range(..section).count();
            let index = target * section_span + rect.index % section_span;
            self.set_rect(slot, rect.at(index, rect.lane));
        }
        self.generate_grid();
        self.metrics.record_sections_removed(removed);
        self.emit(
            LogLevel::Debug,
            "sections_compacted",
            [
                json_kv("removed", json!(removed)),
                json_kv("sections", json!(occupied.len())),
            ],
        );
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridOptions;
    use crate::geometry::{Position, Resize};
    use crate::item::GridItem;

    fn positions(engine: &GridEngine<u32>) -> Vec<(usize, usize)> {
        engine.items().iter().map(|item| (item.x, item.y)).collect()
    }

    fn sectioned(items: Vec<GridItem<u32>>) -> GridEngine<u32> {
        GridEngine::new(items, GridOptions::new(4).with_section_span(3)).expect("engine")
    }

    #[test]
    fn boundary_helpers() {
        assert!(crosses(&LaneRect::new(2, 0, 2, 1), 3));
        assert!(!crosses(&LaneRect::new(3, 0, 3, 1), 3));
        assert_eq!(align_to_section(2, 2, 3), 3);
        assert_eq!(align_to_section(3, 2, 3), 3);
        assert_eq!(snap_into_section(5, 2, 3), 4);
        assert_eq!(snap_into_section(4, 2, 3), 4);
        assert_eq!(section_start(7, 3), 6);
    }

    #[test]
    fn crossing_items_rejected_at_construction() {
        let items = vec![GridItem::at(2, 0, 2, 1, 0u32)];
        let err = GridEngine::new(items, GridOptions::new(4).with_section_span(3)).unwrap_err();
        assert!(matches!(
            err,
            crate::GridError::ItemCrossesSection { slot: 0, .. }
        ));
    }

    #[test]
    fn wide_items_rejected_at_construction() {
        let items = vec![GridItem::at(0, 0, 4, 1, 0u32)];
        let err = GridEngine::new(items, GridOptions::new(4).with_section_span(3)).unwrap_err();
        assert!(matches!(
            err,
            crate::GridError::SpanExceedsSection { slot: 0, .. }
        ));
    }

    #[test]
    fn move_all_sections_to_the_right_opens_a_gap() {
        let mut engine = sectioned(vec![
            GridItem::at(0, 0, 3, 1, 0),
            GridItem::at(3, 0, 1, 1, 1),
            GridItem::at(6, 0, 2, 1, 2),
        ]);
        engine.move_all_sections_to_the_right(1);
        assert_eq!(positions(&engine), vec![(0, 0), (6, 0), (9, 0)]);
        assert_eq!(engine.grid().len(), 11);
        assert_eq!(engine.section_count(), 4);
    }

    #[test]
    fn empty_sections_are_removed_after_a_move() {
        let mut engine = sectioned(vec![
            GridItem::at(0, 0, 3, 1, 0),
            GridItem::at(3, 0, 1, 1, 1),
        ]);
        // The target is clamped to the first empty section.
        engine.move_item_to_position(1, Position::new(9, 0)).unwrap();
        assert_eq!(positions(&engine), vec![(0, 0), (3, 0)]);
        assert_eq!(engine.metrics().sections_removed, 1);

        engine
            .move_item_to_position(1, Position::new(usize::MAX, 0))
            .unwrap();
        assert_eq!(positions(&engine), vec![(0, 0), (3, 0)]);
        assert_eq!(engine.metrics().sections_removed, 2);
    }

    #[test]
    fn moving_into_a_new_section_and_back_restores_layout() {
        let initial = vec![
            GridItem::at(0, 0, 3, 1, 0),
            GridItem::at(3, 0, 1, 1, 1),
            GridItem::at(4, 0, 1, 1, 2),
        ];
        let mut engine = sectioned(initial.clone());
        engine.move_item_to_position(2, Position::new(6, 0)).unwrap();
        assert_eq!(positions(&engine), vec![(0, 0), (3, 0), (6, 0)]);
        engine.move_item_to_position(2, Position::new(4, 0)).unwrap();
        assert_eq!(positions(&engine), vec![(0, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn crossing_move_is_snapped_into_section() {
        let mut engine = sectioned(vec![
            GridItem::at(0, 0, 1, 1, 0),
            GridItem::at(3, 0, 2, 1, 1),
        ]);
        engine.move_item_to_position(1, Position::new(5, 0)).unwrap();
        let moved = &engine.items()[1];
        assert_eq!((moved.x, moved.w), (4, 2));
    }

    #[test]
    fn local_resolution_stays_inside_section() {
        let mut engine = sectioned(vec![
            GridItem::at(0, 0, 1, 1, 0),
            GridItem::at(3, 0, 1, 1, 1),
            GridItem::at(4, 0, 1, 1, 2),
        ]);
        engine.move_item_to_position(2, Position::new(3, 0)).unwrap();
        assert_eq!(positions(&engine), vec![(0, 0), (3, 1), (3, 0)]);
        assert_eq!(engine.metrics().local_resolutions, 1);
    }

    #[test]
    fn failed_local_resolution_opens_a_section() {
        // Section 1 is full on every candidate around the moved item.
        let mut engine = sectioned(vec![
            GridItem::at(0, 0, 3, 4, 0),
            GridItem::at(3, 0, 3, 4, 1),
            GridItem::at(6, 0, 3, 4, 2),
        ]);
        engine.move_item_to_position(2, Position::new(3, 0)).unwrap();
        assert_eq!(positions(&engine), vec![(0, 0), (6, 0), (3, 0)]);
        assert_eq!(engine.metrics().fallback_compactions, 1);
    }

    #[test]
    fn resizing_past_section_width_fails() {
        let mut engine = sectioned(vec![GridItem::at(0, 0, 1, 1, 0)]);
        let err = engine.resize_item(0, Resize::width(4)).unwrap_err();
        assert!(matches!(err, crate::GridError::SpanExceedsSection { .. }));
    }

    #[test]
    fn resizing_across_boundary_pushes_neighbours_to_next_section() {
        let mut engine = sectioned(vec![
            GridItem::at(0, 0, 1, 4, 0),
            GridItem::at(1, 0, 2, 4, 1),
            GridItem::at(3, 0, 1, 1, 2),
        ]);
        engine.resize_item(0, Resize::width(3)).unwrap();
        assert_eq!(positions(&engine), vec![(0, 0), (3, 0), (5, 0)]);
        assert!(engine.items().iter().all(|item| {
            !crosses(&LaneRect::new(item.x, item.y, item.w, item.h), 3)
        }));
    }
}
