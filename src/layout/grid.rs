//! Occupancy matrix - a growable sequence of columns, one cell per lane.
//!
//! Cells hold the slot of the occupying item, never the item itself; the
//! engine's item list stays the sole owner of item data. Key properties:
//! - Columns are created on demand when an item is marked past the end
//! - Reads outside the matrix report an empty cell
//! - Clearing only releases cells still owned by the given slot

use crate::axis::LaneRect;

/// Slot-indexed occupancy matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    lanes: usize,
    columns: Vec<Vec<Option<usize>>>,
}

impl OccupancyGrid {
    pub fn new(lanes: usize) -> Self {
        Self {
            lanes,
            columns: Vec::new(),
        }
    }

    /// Number of columns along the primary axis.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Drop every column, optionally switching to a new lane count.
    pub fn reset(&mut self, lanes: usize) {
        self.lanes = lanes;
        self.columns.clear();
    }

    /// Slot occupying a cell, or `None` for empty and out-of-range cells.
    pub fn cell(&self, index: usize, lane: usize) -> Option<usize> {
        self.columns
            .get(index)
            .and_then(|column| column.get(lane))
            .copied()
            .flatten()
    }

    pub fn column(&self, index: usize) -> Option<&[Option<usize>]> {
        self.columns.get(index).map(Vec::as_slice)
    }

    pub fn ensure_columns(&mut self, required: usize) {
        while self.columns.len() < required {
            self.columns.push(vec![None; self.lanes]);
        }
    }

    /// Claim every cell of `rect` for `slot`, overwriting previous owners.
    pub fn mark(&mut self, slot: usize, rect: &LaneRect) {
        self.ensure_columns(rect.end_index());
        let lanes = self.lanes;
        for column in &mut self.columns[rect.index..rect.end_index()] {
            let end = rect.end_lane().min(lanes);
            for cell in column.iter_mut().take(end).skip(rect.lane) {
                *cell = Some(slot);
            }
        }
    }

    /// Release the cells of `rect` that still belong to `slot`.
    pub fn clear(&mut self, slot: usize, rect: &LaneRect) {
        // Positions that were never materialised (e.g. stale persisted
        // coordinates) have nothing to release.
        let end_index = rect.end_index().min(self.columns.len());
        for index in rect.index.min(end_index)..end_index {
            let column = &mut self.columns[index];
            let end = rect.end_lane().min(column.len());
            for cell in column.iter_mut().take(end).skip(rect.lane) {
                if *cell == Some(slot) {
                    *cell = None;
                }
            }
        }
    }

    /// Whether `rect` is free of every slot other than `owner`.
    pub fn is_free_for(&self, owner: Option<usize>, rect: &LaneRect) -> bool {
        for index in rect.index..rect.end_index() {
            let Some(column) = self.columns.get(index) else {
                // Columns that don't exist yet are empty.
                continue;
            };
            for lane in rect.lane..rect.end_lane() {
                if let Some(Some(occupant)) = column.get(lane) {
                    if Some(*occupant) != owner {
                        return false;
                    }
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_grows_columns() {
        let mut grid = OccupancyGrid::new(3);
        grid.mark(0, &LaneRect::new(2, 1, 2, 2));
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.cell(2, 1), Some(0));
        assert_eq!(grid.cell(3, 2), Some(0));
        assert_eq!(grid.cell(1, 1), None);
        assert_eq!(grid.column(0), Some(&[None, None, None][..]));
    }

    #[test]
    fn out_of_range_reads_are_empty() {
        let grid = OccupancyGrid::new(2);
        assert_eq!(grid.cell(10, 0), None);
        assert_eq!(grid.cell(0, 10), None);
        assert!(grid.column(0).is_none());
    }

    #[test]
    fn clear_leaves_cells_taken_over_by_others() {
        let mut grid = OccupancyGrid::new(2);
        let first = LaneRect::new(0, 0, 2, 1);
        grid.mark(0, &first);
        grid.mark(1, &LaneRect::new(1, 0, 1, 1));
        grid.clear(0, &first);
        assert_eq!(grid.cell(0, 0), None);
        assert_eq!(grid.cell(1, 0), Some(1));
    }

    #[test]
    fn clear_beyond_grid_is_noop() {
        let mut grid = OccupancyGrid::new(2);
        grid.clear(0, &LaneRect::new(5, 0, 2, 1));
        assert!(grid.is_empty());
    }

    #[test]
    fn own_cells_do_not_block() {
        let mut grid = OccupancyGrid::new(2);
        grid.mark(4, &LaneRect::new(0, 0, 1, 2));
        let probe = LaneRect::new(0, 1, 2, 1);
        assert!(grid.is_free_for(Some(4), &probe));
        assert!(!grid.is_free_for(Some(5), &probe));
        assert!(!grid.is_free_for(None, &probe));
    }
}
