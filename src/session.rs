//! Interactive drag cycle on top of [`GridEngine`].
//!
//! Every intermediate drag target is applied to the layout as it was when the
//! drag started, so dragging back and forth never accumulates displacement.

use serde_json::json;

use crate::error::{GridError, Result};
use crate::geometry::Position;
use crate::item::{GridItem, clone_items, clone_items_into};
use crate::layout::GridEngine;
use crate::logging::{LogLevel, json_kv};

#[derive(Debug, Clone)]
pub struct DragSession<T> {
    slot: usize,
    snapshot: Vec<GridItem<T>>,
    order: Vec<usize>,
    max_index: usize,
    previous: Option<Position>,
}

impl<T: Clone> DragSession<T> {
    /// Start dragging `slot`, remembering the layout, its array order and
    /// the grid length.
    pub fn begin(engine: &GridEngine<T>, slot: usize) -> Result<Self> {
        if engine.item(slot).is_none() {
            return Err(GridError::ItemNotFound(slot));
        }
        Ok(Self {
            slot,
            snapshot: clone_items(engine.items()),
            order: engine.order().to_vec(),
            max_index: engine.grid().len(),
            previous: None,
        })
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn snapshot(&self) -> &[GridItem<T>] {
        &self.snapshot
    }

    /// Preview the dragged item at `target`. Returns `false` when the clamped
    /// target equals the previous one and nothing was recomputed.
    pub fn drag_to(&mut self, engine: &mut GridEngine<T>, target: Position) -> Result<bool> {
        let Some(origin) = self.snapshot.get(self.slot) else {
            return Err(GridError::ItemNotFound(self.slot));
        };
        let axis = engine.axis();
        let rect = axis.to_lanes(target, origin.span());
        let lane_span = rect.lane_span.min(engine.lanes());
        let index = rect.index.min(self.max_index);
        let lane = rect.lane.min(engine.lanes() - lane_span);
        let position = axis.position_of(index, lane);

        if self.previous == Some(position) {
            return Ok(false);
        }
        self.previous = Some(position);

        engine.restore_layout(&self.snapshot, &self.order);
        engine.move_item_to_position(self.slot, position)?;
        Ok(true)
    }

    /// End the drag. Returns the slots that moved or changed size since the
    /// drag began; the session's snapshot is refreshed to the final layout.
    pub fn finish(&mut self, engine: &GridEngine<T>) -> Vec<usize> {
        let changed: Vec<usize> = engine
            .items()
            .iter()
            .enumerate()
            .filter(|(slot, item)| {
                self.snapshot
                    .get(*slot)
                    .is_none_or(|before| item.geometry_differs(before))
            })
            .map(|(slot, _)| slot)
            .collect();

        clone_items_into(engine.items(), &mut self.snapshot);
        self.order.clear();
        self.order.extend_from_slice(engine.order());
        self.max_index = engine.grid().len();
        self.previous = None;
        engine.emit(
            LogLevel::Debug,
            "drag_finished",
            [
                json_kv("slot", json!(self.slot)),
                json_kv("changed", json!(changed.len())),
            ],
        );
        changed
    }

    /// Abandon the drag, restoring the layout it started from.
    pub fn cancel(self, engine: &mut GridEngine<T>) {
        engine.restore_layout(&self.snapshot, &self.order);
    }
}
