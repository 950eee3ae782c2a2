//! Level generation parameters.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest grid that leaves room for distinct start and goal corners.
pub const MIN_GRID_SIZE: u32 = 2;

/// Controls where, if anywhere, the goal pickup is placed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPlacement {
    /// Goal occupies the corner opposite the start selection.
    #[default]
    Corner,
    /// Goal is drawn at random from the floors left after enemy placement.
    Scattered,
    /// No goal; the second corner only anchors the far side of the level.
    Absent,
}

impl GoalPlacement {
    /// Reports whether the layout carries a goal cell.
    #[must_use]
    pub const fn has_goal(self) -> bool {
        !matches!(self, Self::Absent)
    }

    /// Number of goal cells still unplaced once the corners are chosen.
    #[must_use]
    pub const fn scattered_cells(self) -> u32 {
        match self {
            Self::Scattered => 1,
            Self::Corner | Self::Absent => 0,
        }
    }
}

/// Tuning knobs for a single level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Side length of the square grid; must be at least two.
    pub size: u32,
    /// Requested fraction of cells converted to walls, in `[0, 1]`.
    pub wall_fraction: f32,
    /// Requested enemy count; capped by the available floor space.
    pub desired_enemies: u32,
    /// Goal placement variant.
    pub goal_placement: GoalPlacement,
    /// Distance between neighbouring cell centres in world units.
    pub cell_size: f32,
    /// World-space centre of the level footprint.
    pub origin: [f32; 3],
    /// Radius of the agent's local observation window.
    pub observation_radius: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            size: 10,
            wall_fraction: 0.3,
            desired_enemies: 3,
            goal_placement: GoalPlacement::Corner,
            cell_size: 1.0,
            origin: [0.0, 0.0, 0.0],
            observation_radius: 2,
        }
    }
}

impl LevelConfig {
    /// Creates a configuration with the three generation parameters set and
    /// every other field at its default.
    #[must_use]
    pub fn new(size: u32, wall_fraction: f32, desired_enemies: u32) -> Self {
        Self {
            size,
            wall_fraction,
            desired_enemies,
            ..Self::default()
        }
    }

    /// Replaces the goal placement variant.
    #[must_use]
    pub fn with_goal_placement(mut self, goal_placement: GoalPlacement) -> Self {
        self.goal_placement = goal_placement;
        self
    }

    /// Checks the preconditions generation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.size < MIN_GRID_SIZE {
            return Err(ConfigError::GridTooSmall { size: self.size });
        }
        if !(0.0..=1.0).contains(&self.wall_fraction) {
            return Err(ConfigError::WallFractionOutOfRange {
                value: self.wall_fraction,
            });
        }
        if self.cell_size <= 0.0 || !self.cell_size.is_finite() {
            return Err(ConfigError::NonPositiveCellSize {
                value: self.cell_size,
            });
        }
        Ok(())
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> u64 {
        u64::from(self.size) * u64::from(self.size)
    }
}

/// Configuration values generation cannot work with.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid has no room for two distinct corners.
    #[error("grid size must be at least 2 (received {size})")]
    GridTooSmall {
        /// Requested side length.
        size: u32,
    },
    /// The wall fraction lies outside `[0, 1]`.
    #[error("wall fraction must lie within [0, 1] (received {value})")]
    WallFractionOutOfRange {
        /// Requested fraction.
        value: f32,
    },
    /// Cell spacing must be a positive finite number.
    #[error("cell size must be positive (received {value})")]
    NonPositiveCellSize {
        /// Requested spacing.
        value: f32,
    },
}
