//! Local observation windows sampled around a world position.

use delve_core::{cell_index, PassabilityMap};

use crate::coordinates::GridOffset;

/// Value reported for a cell holding an active, non-eliminated enemy.
pub const ENEMY_CODE: f32 = 0.0;
/// Value reported for a traversable cell without a live enemy.
pub const PASSABLE_CODE: f32 = 1.0;
/// Value reported for a wall.
pub const WALL_CODE: f32 = 0.5;
/// Value reported for window cells that fall outside the grid.
pub const OUT_OF_BOUNDS_CODE: f32 = WALL_CODE;

/// Square window of encoded cells centred on an observer.
///
/// Values are stored row by row, starting at the north-west corner.
#[derive(Clone, Debug, PartialEq)]
pub struct ObservationWindow {
    radius: u32,
    values: Vec<f32>,
}

impl ObservationWindow {
    pub(crate) fn new(radius: u32, values: Vec<f32>) -> Self {
        Self { radius, values }
    }

    /// Number of cells sampled on each side of the centre.
    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    /// Side length of the window, `2 * radius + 1`.
    #[must_use]
    pub const fn side(&self) -> u32 {
        window_side(self.radius)
    }

    /// Encoded values in row-major order.
    #[must_use]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Encoded value at the provided offset from the centre.
    #[must_use]
    pub fn at(&self, columns: i32, rows: i32) -> Option<f32> {
        let radius = i64::from(self.radius);
        let column = i64::from(columns) + radius;
        let row = i64::from(rows) + radius;
        let side = i64::from(self.side());
        if !(0..side).contains(&column) || !(0..side).contains(&row) {
            return None;
        }
        let index = usize::try_from(row * side + column).ok()?;
        self.values.get(index).copied()
    }

    /// Consumes the window and returns its flat buffer.
    #[must_use]
    pub fn into_values(self) -> Vec<f32> {
        self.values
    }
}

const fn window_side(radius: u32) -> u32 {
    radius.saturating_mul(2).saturating_add(1)
}

/// Writes the encoded window around `center` into `out`, replacing its contents.
///
/// `enemies` is a row-major occupancy buffer matching `passability`.
pub(crate) fn sample_window(
    center: GridOffset,
    radius: u32,
    passability: &PassabilityMap,
    enemies: &[bool],
    out: &mut Vec<f32>,
) {
    let side = usize::try_from(window_side(radius)).unwrap_or(0);
    out.clear();
    out.reserve(side.saturating_mul(side));

    let reach = i32::try_from(radius).unwrap_or(i32::MAX);
    let size = passability.size();
    for rows in -reach..=reach {
        for columns in -reach..=reach {
            let value = match center.shifted(columns, rows).to_cell(size) {
                None => OUT_OF_BOUNDS_CODE,
                Some(cell) if !passability.is_passable(cell) => WALL_CODE,
                Some(cell) => {
                    let occupied = cell_index(cell, size)
                        .and_then(|index| enemies.get(index).copied())
                        .unwrap_or(false);
                    if occupied {
                        ENEMY_CODE
                    } else {
                        PASSABLE_CODE
                    }
                }
            };
            out.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delve_core::{Cell, CellCoord, GridBuilder};

    fn fixture() -> (PassabilityMap, Vec<bool>) {
        let mut builder = GridBuilder::filled(3, Cell::Floor);
        builder.set(CellCoord::new(1, 0), Cell::Wall);
        builder.set(CellCoord::new(2, 2), Cell::Enemy);
        let grid = builder.build();
        let enemies = grid
            .cells()
            .iter()
            .map(|cell| *cell == Cell::Enemy)
            .collect();
        (grid.passability(), enemies)
    }

    #[test]
    fn window_encodes_walls_enemies_and_floors() {
        let (passability, enemies) = fixture();
        let mut out = Vec::new();
        sample_window(GridOffset::new(1, 1), 1, &passability, &enemies, &mut out);

        let rows = [
            [PASSABLE_CODE, WALL_CODE, PASSABLE_CODE],
            [PASSABLE_CODE, PASSABLE_CODE, PASSABLE_CODE],
            [PASSABLE_CODE, PASSABLE_CODE, ENEMY_CODE],
        ];
        assert_eq!(out, rows.concat());
    }

    #[test]
    fn cells_beyond_the_edge_read_as_walls() {
        let (passability, enemies) = fixture();
        let mut out = vec![9.0; 3];
        sample_window(GridOffset::new(0, 0), 1, &passability, &enemies, &mut out);

        let window = ObservationWindow::new(1, out);
        assert_eq!(window.values().len(), 9);
        assert_eq!(window.at(-1, -1), Some(OUT_OF_BOUNDS_CODE));
        assert_eq!(window.at(-1, 1), Some(OUT_OF_BOUNDS_CODE));
        assert_eq!(window.at(1, 0), Some(WALL_CODE));
        assert_eq!(window.at(0, 0), Some(PASSABLE_CODE));
        assert_eq!(window.at(2, 0), None);
    }

    #[test]
    fn zero_radius_samples_only_the_centre() {
        let (passability, enemies) = fixture();
        let mut out = Vec::new();
        sample_window(GridOffset::new(2, 2), 0, &passability, &enemies, &mut out);
        assert_eq!(out, vec![ENEMY_CODE]);
    }

    #[test]
    fn centre_far_outside_grid_is_all_out_of_bounds() {
        let (passability, enemies) = fixture();
        let mut out = Vec::new();
        let far_away = GridOffset::new(-10, 40);
        sample_window(far_away, 2, &passability, &enemies, &mut out);
        assert_eq!(out.len(), 25);
        assert!(out.iter().all(|value| *value == OUT_OF_BOUNDS_CODE));
    }
}
