//! Breadth-first fields computed over dungeon grids.

use std::collections::VecDeque;

use delve_core::{cell_index, CellCoord, GridView};

/// Distance recorded for cells the search never reached.
pub const UNREACHED: i32 = -1;

/// Reusable scratch buffers for 4-directional flood fills.
///
/// The generator validates connectivity once per wall attempt, so the visited
/// buffer and frontier queue are kept between calls instead of reallocated.
/// The inspected grid is never mutated.
#[derive(Clone, Debug, Default)]
pub struct FloodFill {
    visited: Vec<bool>,
    queue: VecDeque<CellCoord>,
}

impl FloodFill {
    /// Creates an empty flood fill workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts the non-wall cells reachable from `source`.
    ///
    /// Returns zero when the source lies outside the grid or on a wall.
    pub fn reachable_count(&mut self, grid: GridView<'_>, source: CellCoord) -> usize {
        let size = grid.size();
        let side = usize::try_from(size).unwrap_or(0);
        let cell_count = side.saturating_mul(side);

        self.visited.clear();
        self.visited.resize(cell_count, false);
        self.queue.clear();

        let Some(source_index) = grid.index(source) else {
            return 0;
        };
        if !grid.is_passable(source) {
            return 0;
        }

        self.visited[source_index] = true;
        self.queue.push_back(source);
        let mut visited_count = 1;

        while let Some(cell) = self.queue.pop_front() {
            for neighbor in neighbors(cell, size) {
                let Some(index) = cell_index(neighbor, size) else {
                    continue;
                };
                if self.visited[index] || !grid.is_passable(neighbor) {
                    continue;
                }
                self.visited[index] = true;
                visited_count += 1;
                self.queue.push_back(neighbor);
            }
        }

        visited_count
    }

    /// Reports whether exactly `expected_reachable` cells are reachable from `source`.
    pub fn is_fully_connected(
        &mut self,
        grid: GridView<'_>,
        source: CellCoord,
        expected_reachable: usize,
    ) -> bool {
        self.reachable_count(grid, source) == expected_reachable
    }
}

/// One-shot connectivity check using a fresh workspace.
#[must_use]
pub fn is_fully_connected(grid: GridView<'_>, source: CellCoord, expected: usize) -> bool {
    FloodFill::new().is_fully_connected(grid, source, expected)
}

/// Dense step-distance grid seeded from a single source cell.
///
/// Distances are stored in row-major order. Walls and cells the search never
/// reached hold [`UNREACHED`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistanceField {
    size: u32,
    distances: Vec<i32>,
}

impl DistanceField {
    /// Runs a breadth-first search from `source` treating walls as barriers.
    #[must_use]
    pub fn compute(grid: GridView<'_>, source: CellCoord) -> Self {
        let size = grid.size();
        let side = usize::try_from(size).unwrap_or(0);
        let mut distances = vec![UNREACHED; side.saturating_mul(side)];

        let mut queue = VecDeque::new();
        if let Some(index) = grid.index(source) {
            if grid.is_passable(source) {
                distances[index] = 0;
                queue.push_back(source);
            }
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = cell_index(cell, size) else {
                continue;
            };
            let next_distance = distances[current_index] + 1;

            for neighbor in neighbors(cell, size) {
                if !grid.is_passable(neighbor) {
                    continue;
                }
                let Some(neighbor_index) = cell_index(neighbor, size) else {
                    continue;
                };
                if distances[neighbor_index] != UNREACHED {
                    continue;
                }
                distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }

        Self { size, distances }
    }

    /// Side length of the field in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Dense distances stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[i32] {
        &self.distances
    }

    /// Distance captured for the provided cell, if it lies within the field.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<i32> {
        let index = cell_index(cell, self.size)?;
        self.distances.get(index).copied()
    }

    /// Largest finite distance in the field.
    #[must_use]
    pub fn max_distance(&self) -> Option<i32> {
        self.distances
            .iter()
            .copied()
            .filter(|distance| *distance != UNREACHED)
            .max()
    }

    /// Reached cells accepted by `include`, ordered farthest first.
    ///
    /// Ties keep row-major scan order.
    pub fn farthest_first<F>(&self, mut include: F) -> Vec<(CellCoord, i32)>
    where
        F: FnMut(CellCoord) -> bool,
    {
        let width = self.size.max(1);
        let mut ranked: Vec<(CellCoord, i32)> = self
            .distances
            .iter()
            .enumerate()
            .filter(|(_, distance)| **distance != UNREACHED)
            .map(|(index, distance)| {
                let index = index as u32;
                (CellCoord::new(index % width, index / width), *distance)
            })
            .filter(|(cell, _)| include(*cell))
            .collect();
        ranked.sort_by(|left, right| right.1.cmp(&left.1));
        ranked
    }
}

/// In-bounds 4-directional neighbours of `cell` in north, east, south, west order.
pub fn neighbors(cell: CellCoord, size: u32) -> impl Iterator<Item = CellCoord> {
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < size {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < size {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}
