#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Delve dungeon engine.
//!
//! This crate defines the grid data model and the message surface that
//! connects adapters, the authoritative level state, and pure systems.
//! Adapters submit [`Command`] values describing desired mutations, the level
//! executes those commands via its `apply` entry point, and then broadcasts
//! [`Event`] values describing what changed. Generation itself is a pure
//! system that consumes a [`LevelConfig`] and an injected random source and
//! produces an immutable [`Grid`].

pub mod config;

pub use config::{ConfigError, GoalPlacement, LevelConfig};

/// Contents of a single dungeon cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Cell {
    /// Traversable, unoccupied cell.
    Floor,
    /// Impassable cell.
    Wall,
    /// Cell where the agent spawns.
    Start,
    /// Cell holding the goal pickup.
    Goal,
    /// Cell occupied by an enemy at generation time.
    Enemy,
    /// Cell holding the weapon chest.
    Weapon,
}

impl Cell {
    /// Reports whether agents can traverse the cell.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Single-character glyph used by text adapters.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Floor => '.',
            Self::Wall => '#',
            Self::Start => 'S',
            Self::Goal => 'G',
            Self::Enemy => 'E',
            Self::Weapon => 'W',
        }
    }
}

/// Cardinal directions used for adjacency and piece orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [Self::North, Self::East, Self::South, Self::West];

    /// Yaw expressed in degrees, clockwise from north.
    #[must_use]
    pub const fn yaw_degrees(self) -> f32 {
        match self {
            Self::North => 0.0,
            Self::East => 90.0,
            Self::South => 180.0,
            Self::West => 270.0,
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Cardinal direction that leads from `self` toward `other`, favouring the
    /// dominant axis. Returns `None` when both coordinates coincide.
    #[must_use]
    pub fn direction_toward(self, other: CellCoord) -> Option<Direction> {
        let column_diff = self.column.abs_diff(other.column);
        let row_diff = self.row.abs_diff(other.row);

        if column_diff == 0 && row_diff == 0 {
            return None;
        }

        if column_diff >= row_diff {
            if other.column > self.column {
                Some(Direction::East)
            } else {
                Some(Direction::West)
            }
        } else if other.row > self.row {
            Some(Direction::South)
        } else {
            Some(Direction::North)
        }
    }
}

/// Immutable square grid of cells produced by a single generation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    size: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Wraps a row-major cell buffer of `size × size` entries.
    ///
    /// Returns `None` when the buffer length does not match the side length.
    #[must_use]
    pub fn from_cells(size: u32, cells: Vec<Cell>) -> Option<Self> {
        let side = usize::try_from(size).ok()?;
        if side.checked_mul(side)? != cells.len() {
            return None;
        }
        Some(Self { size, cells })
    }

    /// Side length of the grid measured in cells.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Row-major view over the cells.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Borrowed view used by field computations.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.size)
    }

    /// Returns the cell stored at the provided coordinate, if it lies inside the grid.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<Cell> {
        self.view().get(cell)
    }

    /// Iterates every coordinate together with its cell in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .map(move |(index, cell)| (coord_from_index(index, size), *cell))
    }

    /// Number of cells holding the provided contents.
    #[must_use]
    pub fn count(&self, kind: Cell) -> usize {
        self.cells.iter().filter(|cell| **cell == kind).count()
    }

    /// First coordinate, in scan order, holding the provided contents.
    #[must_use]
    pub fn find(&self, kind: Cell) -> Option<CellCoord> {
        self.iter()
            .find(|(_, cell)| *cell == kind)
            .map(|(coord, _)| coord)
    }

    /// Derives the boolean passability map for navigation consumers.
    #[must_use]
    pub fn passability(&self) -> PassabilityMap {
        PassabilityMap {
            size: self.size,
            cells: self.cells.iter().map(|cell| cell.is_passable()).collect(),
        }
    }
}

/// Mutable cell buffer used while a generation pass is in progress.
///
/// Only [`GridBuilder::build`] produces a [`Grid`], so a published grid is
/// never edited in place.
#[derive(Clone, Debug)]
pub struct GridBuilder {
    size: u32,
    cells: Vec<Cell>,
}

impl GridBuilder {
    /// Creates a `size × size` buffer with every cell set to `fill`.
    #[must_use]
    pub fn filled(size: u32, fill: Cell) -> Self {
        let side = usize::try_from(size).unwrap_or(0);
        Self {
            size,
            cells: vec![fill; side.saturating_mul(side)],
        }
    }

    /// Side length of the buffer.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the cell stored at the provided coordinate.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<Cell> {
        self.view().get(cell)
    }

    /// Overwrites the cell at the provided coordinate. Out-of-range writes are ignored.
    pub fn set(&mut self, cell: CellCoord, contents: Cell) {
        if let Some(index) = cell_index(cell, self.size) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = contents;
            }
        }
    }

    /// Borrowed view used by field computations.
    #[must_use]
    pub fn view(&self) -> GridView<'_> {
        GridView::new(&self.cells, self.size)
    }

    /// Coordinates currently holding `kind`, in row-major order.
    #[must_use]
    pub fn positions_of(&self, kind: Cell) -> Vec<CellCoord> {
        let size = self.size;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell == kind)
            .map(|(index, _)| coord_from_index(index, size))
            .collect()
    }

    /// Freezes the buffer into an immutable grid.
    #[must_use]
    pub fn build(self) -> Grid {
        Grid {
            size: self.size,
            cells: self.cells,
        }
    }
}

/// Read-only view over a row-major cell buffer.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [Cell],
    size: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new view backed by the provided cell slice.
    #[must_use]
    pub const fn new(cells: &'a [Cell], size: u32) -> Self {
        Self { cells, size }
    }

    /// Side length of the viewed grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Returns the cell stored at the provided coordinate.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<Cell> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the coordinate lies inside the grid and is not a wall.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        self.get(cell).is_some_and(Cell::is_passable)
    }

    /// Number of non-wall cells in the view.
    #[must_use]
    pub fn passable_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_passable()).count()
    }

    /// Row-major offset of the coordinate, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        cell_index(cell, self.size)
    }
}

/// Boolean traversability grid handed to navigation consumers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassabilityMap {
    size: u32,
    cells: Vec<bool>,
}

impl PassabilityMap {
    /// Side length of the map.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Row-major traversability flags.
    #[must_use]
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    /// Reports whether the coordinate is inside the map and traversable.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord) -> bool {
        cell_index(cell, self.size)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Number of traversable cells.
    #[must_use]
    pub fn traversable_count(&self) -> usize {
        self.cells.iter().filter(|passable| **passable).count()
    }
}

/// Row-major offset of `cell` within a square grid of side `size`.
#[must_use]
pub fn cell_index(cell: CellCoord, size: u32) -> Option<usize> {
    if cell.column() >= size || cell.row() >= size {
        return None;
    }
    let row = usize::try_from(cell.row()).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let width = usize::try_from(size).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn coord_from_index(index: usize, size: u32) -> CellCoord {
    let width = size.max(1) as usize;
    CellCoord::new((index % width) as u32, (index / width) as u32)
}

/// Visual/behavioural piece families managed by the instance pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PieceCategory {
    /// Ground tile placed under every traversable cell.
    Floor,
    /// Wall block.
    Wall,
    /// Enemy actor.
    Enemy,
    /// Weapon chest pickup.
    Weapon,
    /// Goal coin pickup.
    Goal,
}

impl PieceCategory {
    /// Every category in release order.
    pub const ALL: [PieceCategory; 5] = [
        Self::Floor,
        Self::Wall,
        Self::Enemy,
        Self::Weapon,
        Self::Goal,
    ];
}

/// Stable handle to a pooled piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(u32);

impl PieceId {
    /// Creates a new piece identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Commands that express all permissible level mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Releases every piece and generates a fresh level from the provided seed.
    Regenerate {
        /// Seed for the generation random source.
        seed: u64,
    },
    /// Marks an enemy piece as eliminated for the remainder of the episode.
    EliminateEnemy {
        /// Handle of the enemy piece.
        piece: PieceId,
    },
    /// Records that the agent picked up the weapon chest.
    CollectWeapon,
}

/// Events broadcast by the level after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Every active piece of a category returned to the pool.
    PiecesReleased {
        /// Category that was released.
        category: PieceCategory,
        /// Number of pieces deactivated.
        count: usize,
    },
    /// A new level layout was generated and materialized.
    LevelGenerated {
        /// Summary of the generated layout.
        summary: LevelSummary,
    },
    /// An enemy was eliminated.
    EnemyEliminated {
        /// Handle of the eliminated enemy.
        piece: PieceId,
        /// Cell the enemy occupied.
        cell: CellCoord,
    },
    /// An elimination request was rejected.
    EliminationRejected {
        /// Handle named in the request.
        piece: PieceId,
        /// Specific reason the request failed.
        reason: EliminationError,
    },
    /// The weapon chest was collected.
    WeaponCollected {
        /// Cell the weapon occupied.
        cell: CellCoord,
    },
    /// A weapon collection request was rejected.
    CollectionRejected {
        /// Specific reason the request failed.
        reason: CollectionError,
    },
}

/// Compact description of a generated level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LevelSummary {
    /// Seed that produced the layout.
    pub seed: u64,
    /// Side length of the grid.
    pub size: u32,
    /// Agent spawn cell.
    pub start: CellCoord,
    /// Goal cell, when the layout has one.
    pub goal: Option<CellCoord>,
    /// Weapon cell, when one could be placed.
    pub weapon: Option<CellCoord>,
    /// Number of enemies placed.
    pub enemies: u32,
    /// Number of walls placed.
    pub walls: u32,
}

/// Reasons an elimination request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EliminationError {
    /// No active enemy carries the provided handle.
    MissingEnemy,
    /// The enemy was already eliminated during this episode.
    AlreadyEliminated,
}

/// Reasons a weapon collection request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollectionError {
    /// The current layout has no weapon.
    MissingWeapon,
    /// The weapon was already collected during this episode.
    AlreadyCollected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaw_turns_clockwise_in_quarter_steps() {
        let yaws: Vec<f32> = Direction::ALL.iter().map(|d| d.yaw_degrees()).collect();
        assert_eq!(yaws, vec![0.0, 90.0, 180.0, 270.0]);
    }

    #[test]
    fn direction_toward_prefers_dominant_axis() {
        let origin = CellCoord::new(2, 2);
        assert_eq!(
            origin.direction_toward(CellCoord::new(5, 3)),
            Some(Direction::East)
        );
        assert_eq!(
            origin.direction_toward(CellCoord::new(2, 0)),
            Some(Direction::North)
        );
        assert_eq!(origin.direction_toward(origin), None);
    }

    #[test]
    fn grid_rejects_mismatched_buffer() {
        assert!(Grid::from_cells(3, vec![Cell::Floor; 8]).is_none());
        assert!(Grid::from_cells(3, vec![Cell::Floor; 9]).is_some());
    }

    #[test]
    fn grid_iterates_in_row_major_order() {
        let mut cells = vec![Cell::Floor; 4];
        cells[1] = Cell::Wall;
        let grid = Grid::from_cells(2, cells).expect("valid grid");

        let coords: Vec<CellCoord> = grid.iter().map(|(coord, _)| coord).collect();
        assert_eq!(
            coords,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(1, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 1),
            ]
        );
        assert_eq!(grid.get(CellCoord::new(1, 0)), Some(Cell::Wall));
        assert_eq!(grid.find(Cell::Wall), Some(CellCoord::new(1, 0)));
        assert_eq!(grid.get(CellCoord::new(2, 0)), None);
    }

    #[test]
    fn builder_ignores_out_of_range_writes() {
        let mut builder = GridBuilder::filled(3, Cell::Floor);
        builder.set(CellCoord::new(1, 2), Cell::Wall);
        builder.set(CellCoord::new(3, 0), Cell::Wall);

        assert_eq!(builder.positions_of(Cell::Wall), vec![CellCoord::new(1, 2)]);
        let grid = builder.build();
        assert_eq!(grid.count(Cell::Wall), 1);
        assert_eq!(grid.count(Cell::Floor), 8);
    }

    #[test]
    fn passability_marks_only_walls_blocked() {
        let cells = vec![Cell::Start, Cell::Wall, Cell::Enemy, Cell::Goal];
        let grid = Grid::from_cells(2, cells).expect("valid grid");
        let map = grid.passability();

        assert_eq!(map.cells(), &[true, false, true, true]);
        assert_eq!(map.traversable_count(), 3);
        assert!(!map.is_passable(CellCoord::new(5, 5)));
    }
}
