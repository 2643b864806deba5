use serde_json::{Value, json};

use crate::axis::{AxisMapping, Direction, LaneRect};
use crate::config::GridOptions;
use crate::error::{GridError, Result};
use crate::geometry::{Position, Resize, Span};
use crate::item::{GridItem, clone_items_into};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::{EngineMetrics, MetricSnapshot};

use super::grid::OccupancyGrid;
use super::sections;

pub(crate) const LOG_TARGET: &str = "lane_grid::engine";

/// Outcome of trying to displace colliders next to a moved item.
enum LocalOutcome {
    Clear,
    Resolved,
    Failed,
}

/// Lane-based packing engine.
///
/// Items keep the slot they were supplied in for the engine's lifetime;
/// every operation addresses items by that slot. A separate "array order"
/// (see [`GridEngine::order`]) is re-sorted by position during compaction.
#[derive(Debug, Clone)]
pub struct GridEngine<T> {
    pub(super) items: Vec<GridItem<T>>,
    pub(super) order: Vec<usize>,
    pub(super) grid: OccupancyGrid,
    pub(super) options: GridOptions,
    pub(super) axis: AxisMapping,
    pub(super) logger: Option<Logger>,
    pub(super) metrics: EngineMetrics,
}

impl<T> GridEngine<T> {
    pub fn items(&self) -> &[GridItem<T>] {
        &self.items
    }

    pub fn item(&self, slot: usize) -> Option<&GridItem<T>> {
        self.items.get(slot)
    }

    pub fn into_items(self) -> Vec<GridItem<T>> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Slots in the order the last compaction pass visited them.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    pub fn lanes(&self) -> usize {
        self.options.lanes
    }

    pub fn direction(&self) -> Direction {
        self.axis.direction()
    }

    pub fn axis(&self) -> AxisMapping {
        self.axis
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn metrics(&self) -> MetricSnapshot {
        self.metrics.snapshot()
    }

    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    pub fn set_logger(&mut self, logger: Option<Logger>) {
        self.logger = logger;
    }

    /// Attach a logger and report the adopted layout through it.
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self.emit(
            LogLevel::Debug,
            "engine_constructed",
            [
                json_kv("items", json!(self.items.len())),
                json_kv("lanes", json!(self.options.lanes)),
                json_kv("columns", json!(self.grid.len())),
            ],
        );
        self
    }

    /// Physical width and height covered by the occupancy grid.
    pub fn extent(&self) -> Span {
        let (_, span) = self
            .axis
            .to_physical(&LaneRect::new(0, 0, self.grid.len(), self.options.lanes));
        span
    }

    /// Slot occupying the physical cell at `position`.
    pub fn slot_at(&self, position: Position) -> Option<usize> {
        let rect = self.axis.to_lanes(position, Span::new(1, 1));
        self.grid.cell(rect.index, rect.lane)
    }

    /// First slot whose payload satisfies `predicate`.
    pub fn slot_where<F>(&self, mut predicate: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.items.iter().position(|item| predicate(&item.data))
    }

    /// Item whose payload key equals `key`.
    pub fn item_by_key<K, F>(&self, key: &K, key_of: F) -> Option<&GridItem<T>>
    where
        K: PartialEq,
        F: Fn(&T) -> K,
    {
        self.items.iter().find(|item| key_of(&item.data) == *key)
    }

    pub(crate) fn rect(&self, slot: usize) -> LaneRect {
        let item = &self.items[slot];
        self.axis.to_lanes(item.position(), item.span())
    }

    pub(crate) fn set_rect(&mut self, slot: usize, rect: LaneRect) {
        let (position, span) = self.axis.to_physical(&rect);
        self.items[slot].set_geometry(position, span);
    }

    pub(crate) fn emit<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let Some(logger) = &self.logger else {
            return;
        };
        if logger.enabled(level) {
            // Sink failures never abort a layout operation.
            let _ = logger.log_event(event_with_fields(level, LOG_TARGET, message, fields));
        }
    }

    fn ensure_slot(&self, slot: usize) -> Result<()> {
        if slot < self.items.len() {
            Ok(())
        } else {
            Err(GridError::ItemNotFound(slot))
        }
    }
}

impl<T: Clone> GridEngine<T> {
    /// Adopt items at the positions they carry.
    ///
    /// Positions must already form a valid layout: in bounds, not
    /// overlapping and, in section mode, not straddling a boundary.
    pub fn new(items: Vec<GridItem<T>>, options: GridOptions) -> Result<Self> {
        let mut engine = Self::unplaced(items, options)?;
        engine.validate_layout()?;
        engine.generate_grid();
        Ok(engine)
    }

    /// Pack items from scratch, ignoring overlaps in their current positions.
    pub fn pack(items: Vec<GridItem<T>>, options: GridOptions) -> Result<Self> {
        let mut engine = Self::unplaced(items, options)?;
        engine.repack();
        if let Some(section_span) = engine.options.section_span {
            engine.compact_sections(section_span);
        }
        Ok(engine)
    }

    fn unplaced(items: Vec<GridItem<T>>, options: GridOptions) -> Result<Self> {
        options.validate()?;
        let order = (0..items.len()).collect();
        let mut engine = Self {
            items,
            order,
            grid: OccupancyGrid::new(options.lanes),
            options,
            axis: AxisMapping::new(options.direction),
            logger: None,
            metrics: EngineMetrics::new(),
        };
        engine.normalize_spans()?;
        Ok(engine)
    }

    /// Rebuild the occupancy grid from item positions.
    pub fn generate_grid(&mut self) {
        self.grid.reset(self.options.lanes);
        for idx in 0..self.order.len() {
            let slot = self.order[idx];
            let rect = self.rect(slot);
            self.grid.mark(slot, &rect);
        }
    }

    /// Snap every item to the left-most free spot, preserving its relative
    /// order. Equivalent to resizing the grid to its current lane count.
    pub fn reflow(&mut self) -> Result<()> {
        self.resize_grid(self.options.lanes)
    }

    /// Change the lane count and repack every item from scratch.
    pub fn resize_grid(&mut self, lanes: usize) -> Result<()> {
        if lanes == 0 {
            return Err(GridError::InvalidLanes);
        }
        let previous = self.options.lanes;
        self.options.lanes = lanes;
        self.normalize_spans()?;
        self.repack();
        if let Some(section_span) = self.options.section_span {
            self.compact_sections(section_span);
        }

        self.metrics.record_grid_resize();
        self.emit(
            LogLevel::Info,
            "grid_resized",
            [
                json_kv("from", json!(previous)),
                json_kv("lanes", json!(lanes)),
                json_kv("items", json!(self.items.len())),
                json_kv("columns", json!(self.grid.len())),
            ],
        );
        Ok(())
    }

    /// First position where an item of `span` fits, searching from `start`.
    ///
    /// With `fixed_lane` only that lane is tried at existing columns. When
    /// nothing fits, a new column is opened after the grid.
    pub fn find_position_for_item(
        &self,
        span: Span,
        start: Position,
        fixed_lane: Option<usize>,
    ) -> Position {
        let probe = self.axis.to_lanes(start, span);
        let lanes = self.options.lanes;
        let probe = LaneRect {
            index_span: probe.index_span.max(1),
            lane_span: match probe.lane_span {
                0 => lanes,
                lane_span => lane_span.min(lanes),
            },
            ..probe
        };
        let (index, lane) = self.search(None, probe, probe.index, probe.lane, fixed_lane);
        self.axis.position_of(index, lane)
    }

    /// Move `slot` to `position` and resolve the resulting collisions.
    ///
    /// The target is clamped to the grid: the lane so the item stays inside
    /// the lanes, the index to the first free column (or, in section mode,
    /// the first empty section). A move onto the item's current spot leaves
    /// the layout untouched.
    pub fn move_item_to_position(&mut self, slot: usize, position: Position) -> Result<()> {
        self.ensure_slot(slot)?;
        let current = self.rect(slot);
        let target = self.axis.to_lanes(position, self.items[slot].span());
        let lane = target.lane.min(self.options.lanes - current.lane_span);
        let limit = match self.options.section_span {
            Some(section_span) => self.grid.len().div_ceil(section_span) * section_span,
            None => self.grid.len(),
        };
        let mut rect = current.at(target.index.min(limit), lane);
        if let Some(section_span) = self.options.section_span {
            rect.index = sections::snap_into_section(rect.index, rect.index_span, section_span);
        }

        if rect != current {
            self.update_rect(slot, rect);
            self.resolve_collisions(slot);
        }

        self.metrics.record_move();
        let landed = self.items[slot].position();
        self.emit(
            LogLevel::Debug,
            "item_moved",
            [
                json_kv("slot", json!(slot)),
                json_kv("x", json!(landed.x)),
                json_kv("y", json!(landed.y)),
            ],
        );
        Ok(())
    }

    /// Resize `slot`, keeping its position where possible, and resolve the
    /// resulting collisions. Missing or zero dimensions keep their value.
    pub fn resize_item(&mut self, slot: usize, resize: Resize) -> Result<()> {
        self.ensure_slot(slot)?;
        let current = self.rect(slot);
        let item = &self.items[slot];
        let sized = self
            .axis
            .to_lanes(item.position(), resize.apply(item.span()));
        let lanes = self.options.lanes;
        let lane_span = if item.auto_span == Some(true) {
            lanes
        } else {
            sized.lane_span.min(lanes)
        };
        let mut rect = LaneRect::new(
            current.index,
            current.lane.min(lanes - lane_span),
            sized.index_span,
            lane_span,
        );
        if let Some(section_span) = self.options.section_span {
            if rect.index_span > section_span {
                return Err(GridError::SpanExceedsSection {
                    slot,
                    index_span: rect.index_span,
                    section_span,
                });
            }
            rect.index = sections::snap_into_section(rect.index, rect.index_span, section_span);
        }

        self.update_rect(slot, rect);
        self.resolve_collisions(slot);
        if let Some(section_span) = self.options.section_span {
            self.pull_items_to_left(None);
            self.compact_sections(section_span);
        }

        self.metrics.record_item_resize();
        let item = &self.items[slot];
        self.emit(
            LogLevel::Debug,
            "item_resized",
            [
                json_kv("slot", json!(slot)),
                json_kv("w", json!(item.w)),
                json_kv("h", json!(item.h)),
            ],
        );
        Ok(())
    }

    /// Put every item back to the geometry recorded in `snapshot`, restore
    /// the array order captured with it and rebuild the grid. Records past
    /// the engine's item count are ignored, as is an `order` of the wrong
    /// length.
    pub fn restore_layout(&mut self, snapshot: &[GridItem<T>], order: &[usize]) {
        let count = snapshot.len().min(self.items.len());
        clone_items_into(&snapshot[..count], &mut self.items);
        if order.len() == self.items.len() {
            self.order.clear();
            self.order.extend_from_slice(order);
        }
        self.generate_grid();
    }

    fn normalize_spans(&mut self) -> Result<()> {
        let lanes = self.options.lanes;
        for slot in 0..self.items.len() {
            let mut rect = self.rect(slot);
            let auto = *self.items[slot]
                .auto_span
                .get_or_insert(rect.lane_span == 0);
            rect.lane_span = if auto {
                lanes
            } else {
                rect.lane_span.clamp(1, lanes)
            };

            if rect.index_span == 0 {
                return Err(GridError::InvalidItemSpan { slot });
            }
            if let Some(section_span) = self.options.section_span {
                if rect.index_span > section_span {
                    return Err(GridError::SpanExceedsSection {
                        slot,
                        index_span: rect.index_span,
                        section_span,
                    });
                }
            }
            self.set_rect(slot, rect);
        }
        Ok(())
    }

    fn validate_layout(&self) -> Result<()> {
        let lanes = self.options.lanes;
        let rects: Vec<LaneRect> = (0..self.items.len()).map(|slot| self.rect(slot)).collect();
        for (slot, rect) in rects.iter().enumerate() {
            if rect.end_lane() > lanes {
                return Err(GridError::ItemOutOfBounds {
                    slot,
                    lane: rect.lane,
                    lane_span: rect.lane_span,
                    lanes,
                });
            }
            let Some(section_span) = self.options.section_span else {
                continue;
            };
            if sections::crosses(rect, section_span) {
                return Err(GridError::ItemCrossesSection {
                    slot,
                    index: rect.index,
                    index_span: rect.index_span,
                    section_span,
                });
            }
        }
        for (first, a) in rects.iter().enumerate() {
            for (offset, b) in rects[first + 1..].iter().enumerate() {
                if a.collides(b) {
                    return Err(GridError::OverlappingItems {
                        first,
                        second: first + 1 + offset,
                    });
                }
            }
        }
        Ok(())
    }

    fn update_rect(&mut self, slot: usize, rect: LaneRect) {
        let current = self.rect(slot);
        self.grid.clear(slot, &current);
        self.set_rect(slot, rect);
        self.grid.mark(slot, &rect);
    }

    fn update_position(&mut self, slot: usize, index: usize, lane: usize) {
        let rect = self.rect(slot).at(index, lane);
        self.update_rect(slot, rect);
    }

    fn fits(&self, owner: Option<usize>, rect: &LaneRect) -> bool {
        if rect.end_lane() > self.options.lanes {
            return false;
        }
        let crosses = match self.options.section_span {
            Some(section_span) => sections::crosses(rect, section_span),
            None => false,
        };
        !crosses && self.grid.is_free_for(owner, rect)
    }

    fn search(
        &self,
        owner: Option<usize>,
        probe: LaneRect,
        start_index: usize,
        start_lane: usize,
        fixed_lane: Option<usize>,
    ) -> (usize, usize) {
        for index in start_index..self.grid.len() {
            match fixed_lane {
                Some(lane) => {
                    if self.fits(owner, &probe.at(index, lane)) {
                        return (index, lane);
                    }
                }
                None => {
                    for lane in start_lane..self.options.lanes {
                        if self.fits(owner, &probe.at(index, lane)) {
                            return (index, lane);
                        }
                    }
                }
            }
        }

        let column = match self.options.section_span {
            Some(section_span) => {
                sections::align_to_section(self.grid.len(), probe.index_span, section_span)
            }
            None => self.grid.len(),
        };
        let lane = fixed_lane
            .filter(|lane| self.fits(owner, &probe.at(column, *lane)))
            .unwrap_or(0);
        (column, lane)
    }

    fn sort_order_by_position(&mut self) {
        let rects: Vec<LaneRect> = (0..self.items.len()).map(|slot| self.rect(slot)).collect();
        self.order
            .sort_by_key(|&slot| (rects[slot].index, rects[slot].lane));
    }

    /// Place every item again in position order. Each item lands at or after
    /// the spot of the item placed before it, so repacking a packed layout
    /// leaves it unchanged.
    fn repack(&mut self) {
        self.sort_order_by_position();
        self.grid.reset(self.options.lanes);
        let mut cursor = (0, 0);
        for idx in 0..self.order.len() {
            let slot = self.order[idx];
            let probe = self.rect(slot);
            let (index, lane) = self.search_from_cursor(slot, probe, cursor);
            self.update_position(slot, index, lane);
            cursor = (index, lane);
        }
        self.metrics.record_compaction();
    }

    fn search_from_cursor(
        &self,
        slot: usize,
        probe: LaneRect,
        (index, lane): (usize, usize),
    ) -> (usize, usize) {
        if index >= self.grid.len() {
            return self.search(Some(slot), probe, index, 0, None);
        }
        for lane in lane..self.options.lanes {
            if self.fits(Some(slot), &probe.at(index, lane)) {
                return (index, lane);
            }
        }
        self.search(Some(slot), probe, index + 1, 0, None)
    }

    fn resolve_collisions(&mut self, slot: usize) {
        match self.options.section_span {
            None => {
                if let LocalOutcome::Failed = self.try_resolve_locally(slot) {
                    self.pull_items_to_left(Some(slot));
                    self.record_fallback(slot);
                }
                self.pull_items_to_left(None);
            }
            Some(section_span) => {
                if let LocalOutcome::Failed = self.try_resolve_locally(slot) {
                    self.open_section_for(slot, section_span);
                    self.pull_items_to_left(None);
                    self.record_fallback(slot);
                }
                self.compact_sections(section_span);
            }
        }
    }

    fn record_fallback(&mut self, slot: usize) {
        self.metrics.record_fallback();
        self.emit(
            LogLevel::Info,
            "collision_fallback",
            [json_kv("slot", json!(slot))],
        );
    }

    fn colliding_slots(&self, slot: usize) -> Vec<usize> {
        let moving = self.rect(slot);
        self.order
            .iter()
            .copied()
            .filter(|&other| other != slot && self.rect(other).collides(&moving))
            .collect()
    }

    /// Try to move each collider to a free spot right next to `slot`. Works on
    /// a private copy of the layout that is only committed when every
    /// collider found a spot.
    fn try_resolve_locally(&mut self, slot: usize) -> LocalOutcome {
        let colliding = self.colliding_slots(slot);
        if colliding.is_empty() {
            return LocalOutcome::Clear;
        }

        let moving = self.rect(slot);
        let mut scratch = self.working_copy();
        for &other in &colliding {
            let displaced = scratch.rect(other);
            let Some(target) = scratch.displacement_for(other, &moving, &displaced) else {
                return LocalOutcome::Failed;
            };
            scratch.update_position(other, target.index, target.lane);
        }

        self.items = scratch.items;
        self.generate_grid();
        self.metrics.record_local_resolution();
        self.emit(
            LogLevel::Debug,
            "collisions_resolved_locally",
            [
                json_kv("slot", json!(slot)),
                json_kv("displaced", json!(colliding.len())),
            ],
        );
        LocalOutcome::Resolved
    }

    fn working_copy(&self) -> Self {
        let mut copy = Self {
            items: self.items.clone(),
            order: self.order.clone(),
            grid: OccupancyGrid::new(self.options.lanes),
            options: self.options,
            axis: self.axis,
            logger: None,
            metrics: EngineMetrics::new(),
        };
        copy.generate_grid();
        copy
    }

    /// Candidate spots for a collider, in priority order: left of, above,
    /// below and right of the moved item.
    fn displacement_for(
        &self,
        slot: usize,
        moving: &LaneRect,
        displaced: &LaneRect,
    ) -> Option<LaneRect> {
        let left = moving
            .index
            .checked_sub(displaced.index_span)
            .map(|index| displaced.at(index, displaced.lane));
        let above = moving
            .lane
            .checked_sub(displaced.lane_span)
            .map(|lane| displaced.at(displaced.index, lane));
        let below = Some(displaced.at(displaced.index, moving.end_lane()));
        let right = Some(displaced.at(moving.end_index(), displaced.lane));

        let home = self
            .options
            .section_span
            .map(|section_span| (section_span, sections::section_of(displaced.index, section_span)));
        [left, above, below, right]
            .into_iter()
            .flatten()
            .find(|candidate| {
                let in_home_section = match home {
                    Some((section_span, section)) => {
                        sections::section_of(candidate.index, section_span) == section
                    }
                    None => true,
                };
                in_home_section && self.fits(Some(slot), candidate)
            })
    }

    /// Compact every item towards index 0 in position order, each one staying
    /// in its lane. A `fixed` item keeps its spot and is placed first.
    fn pull_items_to_left(&mut self, fixed: Option<usize>) {
        self.sort_order_by_position();
        self.grid.reset(self.options.lanes);

        let mut rank = vec![0; self.items.len()];
        for (position, &slot) in self.order.iter().enumerate() {
            rank[slot] = position;
        }

        if let Some(fixed) = fixed {
            let rect = self.rect(fixed);
            self.grid.mark(fixed, &rect);
        }

        for idx in 0..self.order.len() {
            let slot = self.order[idx];
            if Some(slot) == fixed {
                continue;
            }
            let rect = self.rect(slot);
            let mut start = self.leftmost_index(slot, rect.lane, &rank);
            if let Some(section_span) = self.options.section_span {
                start = start.max(sections::section_start(rect.index, section_span));
            }
            let (index, lane) = self.search(Some(slot), rect, start, 0, Some(rect.lane));
            self.update_position(slot, index, lane);
        }
        self.metrics.record_compaction();
    }

    /// End of the last item already placed in `lane` ahead of `slot`.
    fn leftmost_index(&self, slot: usize, lane: usize, rank: &[usize]) -> usize {
        let mut tail = 0;
        for index in 0..self.grid.len() {
            match self.grid.cell(index, lane) {
                Some(other) if rank[other] < rank[slot] => {
                    tail = self.rect(other).end_index();
                }
                _ => {}
            }
        }
        tail
    }
}
