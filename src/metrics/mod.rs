use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Running counters for engine operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EngineMetrics {
    moves: u64,
    item_resizes: u64,
    grid_resizes: u64,
    local_resolutions: u64,
    fallback_compactions: u64,
    compaction_passes: u64,
    sections_removed: u64,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_move(&mut self) {
        self.moves = self.moves.saturating_add(1);
    }

    pub fn record_item_resize(&mut self) {
        self.item_resizes = self.item_resizes.saturating_add(1);
    }

    pub fn record_grid_resize(&mut self) {
        self.grid_resizes = self.grid_resizes.saturating_add(1);
    }

    pub fn record_local_resolution(&mut self) {
        self.local_resolutions = self.local_resolutions.saturating_add(1);
    }

    pub fn record_fallback(&mut self) {
        self.fallback_compactions = self.fallback_compactions.saturating_add(1);
    }

    pub fn record_compaction(&mut self) {
        self.compaction_passes = self.compaction_passes.saturating_add(1);
    }

    pub fn record_sections_removed(&mut self, count: usize) {
        if count > 0 {
            self.sections_removed = self.sections_removed.saturating_add(count as u64);
        }
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            moves: self.moves,
            item_resizes: self.item_resizes,
            grid_resizes: self.grid_resizes,
            local_resolutions: self.local_resolutions,
            fallback_compactions: self.fallback_compactions,
            compaction_passes: self.compaction_passes,
            sections_removed: self.sections_removed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub moves: u64,
    pub item_resizes: u64,
    pub grid_resizes: u64,
    pub local_resolutions: u64,
    pub fallback_compactions: u64,
    pub compaction_passes: u64,
    pub sections_removed: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "engine_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("moves".to_string(), json!(self.moves));
        map.insert("item_resizes".to_string(), json!(self.item_resizes));
        map.insert("grid_resizes".to_string(), json!(self.grid_resizes));
        map.insert("local_resolutions".to_string(), json!(self.local_resolutions));
        map.insert(
            "fallback_compactions".to_string(),
            json!(self.fallback_compactions),
        );
        map.insert("compaction_passes".to_string(), json!(self.compaction_passes));
        map.insert("sections_removed".to_string(), json!(self.sections_removed));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let mut metrics = EngineMetrics::new();
        metrics.record_move();
        metrics.record_move();
        metrics.record_fallback();
        metrics.record_sections_removed(0);
        metrics.record_sections_removed(2);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.moves, 2);
        assert_eq!(snapshot.fallback_compactions, 1);
        assert_eq!(snapshot.sections_removed, 2);

        let event = snapshot.to_log_event("lane_grid::metrics");
        assert_eq!(event.message, "engine_metrics");
        assert_eq!(event.fields["moves"], json!(2));
    }
}
