//! Grid configuration.
//!
//! Every engine owns its own validated copy of [`GridOptions`]; nothing is
//! shared between instances.

use serde::{Deserialize, Serialize};

use crate::axis::Direction;
use crate::error::{GridError, Result};

/// Lane count used when none is supplied.
pub const DEFAULT_LANES: usize = 5;

/// Configuration knobs for a grid engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridOptions {
    /// Number of lanes perpendicular to the primary axis.
    pub lanes: usize,
    /// Which physical axis items are packed along.
    pub direction: Direction,
    /// Optional section width along the primary axis. Items never straddle
    /// a section boundary.
    pub section_span: Option<usize>,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            lanes: DEFAULT_LANES,
            direction: Direction::Horizontal,
            section_span: None,
        }
    }
}

impl GridOptions {
    pub fn new(lanes: usize) -> Self {
        Self {
            lanes,
            ..Self::default()
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_section_span(mut self, section_span: usize) -> Self {
        self.section_span = Some(section_span);
        self
    }

    /// Parse options from JSON, filling missing fields with defaults.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(raw)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.lanes == 0 {
            return Err(GridError::InvalidLanes);
        }
        if self.section_span == Some(0) {
            return Err(GridError::InvalidSectionSpan);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_five_horizontal_lanes() {
        let options = GridOptions::default();
        assert_eq!(options.lanes, 5);
        assert_eq!(options.direction, Direction::Horizontal);
        assert!(options.section_span.is_none());
    }

    #[test]
    fn json_fills_missing_fields() {
        let options = GridOptions::from_json_str(r#"{"lanes": 3, "direction": "vertical"}"#)
            .expect("options");
        assert_eq!(options.lanes, 3);
        assert_eq!(options.direction, Direction::Vertical);
        assert_eq!(options.section_span, None);
    }

    #[test]
    fn zero_lanes_rejected() {
        let err = GridOptions::from_json_str(r#"{"lanes": 0}"#).unwrap_err();
        assert!(matches!(err, GridError::InvalidLanes));
    }

    #[test]
    fn zero_section_span_rejected() {
        let err = GridOptions::new(3).with_section_span(0).validate().unwrap_err();
        assert!(matches!(err, GridError::InvalidSectionSpan));
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = GridOptions::from_json_str("{lanes").unwrap_err();
        assert!(matches!(err, GridError::Config(_)));
    }
}
