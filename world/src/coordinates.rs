//! Conversions between grid indices, world positions and normalized percentages.

use delve_core::{CellCoord, LevelConfig};
use glam::{Vec2, Vec3};

/// Signed grid index that may fall outside the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridOffset {
    /// Column index; negative or too large when off-grid.
    pub column: i32,
    /// Row index; negative or too large when off-grid.
    pub row: i32,
}

impl GridOffset {
    /// Creates a new signed index.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// Shifts the index by the provided deltas.
    #[must_use]
    pub const fn shifted(self, columns: i32, rows: i32) -> Self {
        Self {
            column: self.column.saturating_add(columns),
            row: self.row.saturating_add(rows),
        }
    }

    /// Converts the index into a cell when it lies inside a grid of side `size`.
    #[must_use]
    pub fn to_cell(self, size: u32) -> Option<CellCoord> {
        let column = u32::try_from(self.column).ok()?;
        let row = u32::try_from(self.row).ok()?;
        (column < size && row < size).then(|| CellCoord::new(column, row))
    }
}

impl From<CellCoord> for GridOffset {
    fn from(cell: CellCoord) -> Self {
        Self {
            column: i32::try_from(cell.column()).unwrap_or(i32::MAX),
            row: i32::try_from(cell.row()).unwrap_or(i32::MAX),
        }
    }
}

/// Maps grid cells onto a square footprint centred on the level origin.
///
/// Columns run along world `x` and rows along world `z`; the `y` component of
/// every produced position is the origin's height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridCoordinateMapper {
    origin: Vec3,
    cell_size: f32,
    size: u32,
}

impl GridCoordinateMapper {
    /// Creates a mapper for a `size × size` grid with `cell_size` spacing.
    #[must_use]
    pub const fn new(origin: Vec3, cell_size: f32, size: u32) -> Self {
        Self {
            origin,
            cell_size,
            size,
        }
    }

    /// Creates a mapper matching the provided configuration.
    #[must_use]
    pub fn from_config(config: &LevelConfig) -> Self {
        Self::new(
            Vec3::from_array(config.origin),
            config.cell_size,
            config.size,
        )
    }

    /// World-space centre of the footprint.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Distance between neighbouring cell centres.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Side length of the grid in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    fn centering_shift(&self) -> f32 {
        self.size.saturating_sub(1) as f32 * 0.5 * self.cell_size
    }

    /// Centre of the provided cell in world space.
    #[must_use]
    pub fn index_to_position(&self, cell: CellCoord) -> Vec3 {
        let shift = self.centering_shift();
        self.origin
            + Vec3::new(
                cell.column() as f32 * self.cell_size - shift,
                0.0,
                cell.row() as f32 * self.cell_size - shift,
            )
    }

    /// Nearest grid index to the position, without clamping.
    #[must_use]
    pub fn position_to_offset(&self, position: Vec3) -> GridOffset {
        let shift = self.centering_shift();
        let local = position - self.origin;
        GridOffset::new(
            ((local.x + shift) / self.cell_size).round() as i32,
            ((local.z + shift) / self.cell_size).round() as i32,
        )
    }

    /// Nearest grid cell to the position, clamped onto the grid.
    #[must_use]
    pub fn position_to_cell(&self, position: Vec3) -> CellCoord {
        let offset = self.position_to_offset(position);
        let last = self.size.saturating_sub(1);
        let last = i32::try_from(last).unwrap_or(i32::MAX);
        CellCoord::new(
            offset.column.clamp(0, last) as u32,
            offset.row.clamp(0, last) as u32,
        )
    }

    /// Nearest grid index to the position; clamped onto the grid when `clamp` is set.
    #[must_use]
    pub fn position_to_index(&self, position: Vec3, clamp: bool) -> GridOffset {
        if clamp {
            self.position_to_cell(position).into()
        } else {
            self.position_to_offset(position)
        }
    }

    /// Position expressed as a fraction of the footprint, half-cell margins included.
    ///
    /// Both components are clamped to `[0, 1]`.
    #[must_use]
    pub fn position_to_percentage(&self, position: Vec3) -> Vec2 {
        let extent = self.size as f32 * self.cell_size;
        if extent <= f32::EPSILON {
            return Vec2::ZERO;
        }
        let half = extent * 0.5;
        let local = position - self.origin;
        Vec2::new(
            ((local.x + half) / extent).clamp(0.0, 1.0),
            ((local.z + half) / extent).clamp(0.0, 1.0),
        )
    }

    /// Minimum and maximum world-space corners of the footprint.
    #[must_use]
    pub fn footprint(&self) -> (Vec3, Vec3) {
        let half = self.size as f32 * self.cell_size * 0.5;
        let extent = Vec3::new(half, 0.0, half);
        (self.origin - extent, self.origin + extent)
    }
}
