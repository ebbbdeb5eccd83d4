//! Layout and policy constants, overridable from JSON.
//!
//! Lengths are in game-area pixels.

use serde::{Deserialize, Serialize};

use crate::error::SortError;
use crate::geometry::Point;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Edge length of the (square) image tile.
    pub image_size: f64,
    /// Gap between neighbouring groups; half of it surrounds the grid.
    pub group_margin: f64,
    /// Extra space reserved above the grid.
    pub banner_height: f64,
    /// Groups per grid row. Grid index `i` sits in column `i % grid_columns`.
    pub grid_columns: usize,
    pub grid_rows: usize,
    /// Where the next image waits before its first drag. Usually off-grid.
    pub staging_position: Point,
    /// Once placed, an image may only be repositioned inside its own group.
    pub one_placement_per_image: bool,
    /// Floor for computed group width/height on tiny viewports.
    pub min_group_extent: f64,
    /// z-index images start at; groups render one below.
    pub base_z_index: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            image_size: 102.0,
            group_margin: 32.0,
            banner_height: 16.0,
            grid_columns: 4,
            grid_rows: 2,
            staging_position: Point::new(-116.0, 30.0),
            one_placement_per_image: true,
            min_group_extent: 1.0,
            base_z_index: 2,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON object over the defaults.
    pub fn from_json(text: &str) -> Result<Self, SortError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SortError> {
        let lengths = [
            ("image_size", self.image_size),
            ("group_margin", self.group_margin),
            ("banner_height", self.banner_height),
            ("min_group_extent", self.min_group_extent),
        ];
        if let Some((name, value)) = lengths.iter().find(|(_, v)| !v.is_finite()) {
            return Err(SortError::InvalidConfig(format!(
                "{name} must be finite, got {value}"
            )));
        }
        if !(self.image_size > 0.0) {
            return Err(SortError::InvalidConfig(format!(
                "image_size must be positive, got {}",
                self.image_size
            )));
        }
        if !(self.group_margin >= 0.0) || !(self.banner_height >= 0.0) {
            return Err(SortError::InvalidConfig(
                "margins must be non-negative".into(),
            ));
        }
        if self.grid_columns == 0 || self.grid_rows == 0 {
            return Err(SortError::InvalidConfig(
                "grid must have at least one row and column".into(),
            ));
        }
        // Group ids are u32 grid indices.
        let cells = self.grid_columns.checked_mul(self.grid_rows);
        if !cells.is_some_and(|n| u32::try_from(n).is_ok()) {
            return Err(SortError::InvalidConfig(format!(
                "grid of {} x {} groups is too large",
                self.grid_columns, self.grid_rows
            )));
        }
        if !(self.min_group_extent > 0.0) {
            return Err(SortError::InvalidConfig(
                "min_group_extent must be positive".into(),
            ));
        }
        if !self.staging_position.is_finite() {
            return Err(SortError::InvalidConfig(
                "staging_position must be finite".into(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn max_groups(&self) -> usize {
        self.grid_columns.saturating_mul(self.grid_rows)
    }

    /// Image extent used when clamping a top-left position into a box:
    /// the tile plus its one-pixel border.
    #[must_use]
    pub fn image_footprint(&self) -> f64 {
        self.image_size + 1.0
    }
}
