#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure level generation system for Delve.
//!
//! The generator turns a [`LevelConfig`] and an injected random source into an
//! immutable [`Grid`] whose traversable cells are all reachable from the start
//! corner. Walls are carved by rejection sampling: each candidate wall is kept
//! only if a flood fill from the start still reaches every remaining
//! traversable cell. Enemies are then placed on the floors farthest from the
//! start, and the weapon (plus a scattered goal, when configured) is drawn from
//! what is left.

pub mod field;

use delve_core::{Cell, CellCoord, ConfigError, GoalPlacement, Grid, GridBuilder, LevelConfig};
use log::{debug, trace};
use rand::Rng;
use thiserror::Error;

pub use field::{is_fully_connected, neighbors, DistanceField, FloodFill, UNREACHED};

/// Number of carving attempts granted per requested wall.
pub const WALL_ATTEMPTS_PER_TARGET: usize = 10;

/// Reasons a generation request cannot be served.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum GenerationError {
    /// The configuration violates a generation precondition.
    #[error("invalid level configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Statistics describing a single wall carving pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CarvingReport {
    /// Walls the pass aimed for after reserving room for entities.
    pub target_walls: usize,
    /// Walls that survived the connectivity check.
    pub placed_walls: usize,
    /// Random cells inspected before the pass stopped.
    pub attempts: usize,
}

/// Result of a generation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedLevel {
    /// Final immutable layout.
    pub grid: Grid,
    /// Cell tagged [`Cell::Start`].
    pub start: CellCoord,
    /// Second corner drawn alongside the start. Holds the goal for corner
    /// placement and anchors the far side of the level otherwise.
    pub far_corner: CellCoord,
    /// Enemy cells in placement order, farthest first.
    pub enemies: Vec<CellCoord>,
    /// Wall carving statistics.
    pub carving: CarvingReport,
}

/// Generation system that keeps its flood fill workspace between passes.
#[derive(Debug, Default)]
pub struct LevelGenerator {
    flood: FloodFill,
}

impl LevelGenerator {
    /// Creates a generator with an empty workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generates a fully connected layout for the provided configuration.
    pub fn generate<R>(
        &mut self,
        config: &LevelConfig,
        rng: &mut R,
    ) -> Result<GeneratedLevel, GenerationError>
    where
        R: Rng + ?Sized,
    {
        config.validate()?;

        let size = config.size;
        let mut builder = GridBuilder::filled(size, Cell::Floor);

        let (start, far_corner) = pick_corners(size, rng);
        builder.set(start, Cell::Start);
        if config.goal_placement == GoalPlacement::Corner {
            builder.set(far_corner, Cell::Goal);
        }

        let carving = self.carve_walls(&mut builder, config, start, rng);
        debug!(
            "carved {} of {} walls in {} attempts",
            carving.placed_walls, carving.target_walls, carving.attempts
        );

        let enemies = place_enemies(&mut builder, config, start);
        place_pickups(&mut builder, config, rng);

        Ok(GeneratedLevel {
            grid: builder.build(),
            start,
            far_corner,
            enemies,
            carving,
        })
    }

    fn carve_walls<R>(
        &mut self,
        builder: &mut GridBuilder,
        config: &LevelConfig,
        start: CellCoord,
        rng: &mut R,
    ) -> CarvingReport
    where
        R: Rng + ?Sized,
    {
        let size = builder.size();
        let target_walls = target_wall_count(config);
        let attempt_budget = target_walls.saturating_mul(WALL_ATTEMPTS_PER_TARGET);
        let mut traversable = builder.view().passable_count();
        let mut report = CarvingReport {
            target_walls,
            ..CarvingReport::default()
        };

        while report.placed_walls < target_walls && report.attempts < attempt_budget {
            report.attempts += 1;
            let candidate = CellCoord::new(rng.gen_range(0..size), rng.gen_range(0..size));
            if builder.get(candidate) != Some(Cell::Floor) {
                continue;
            }

            builder.set(candidate, Cell::Wall);
            let remaining = traversable - 1;
            let view = builder.view();
            if self.flood.is_fully_connected(view, start, remaining) {
                traversable = remaining;
                report.placed_walls += 1;
            } else {
                trace!("wall at {candidate:?} would split the level");
                builder.set(candidate, Cell::Floor);
            }
        }

        report
    }
}

/// Generates a level with a throwaway workspace and returns only its grid.
pub fn generate<R>(config: &LevelConfig, rng: &mut R) -> Result<Grid, GenerationError>
where
    R: Rng + ?Sized,
{
    LevelGenerator::new()
        .generate(config, rng)
        .map(|level| level.grid)
}

/// Walls requested by the configuration after reserving the start, goal,
/// weapon and every desired enemy a floor cell.
#[must_use]
pub fn target_wall_count(config: &LevelConfig) -> usize {
    let total = usize::try_from(config.cell_count()).unwrap_or(usize::MAX);
    let requested = (total as f32 * config.wall_fraction).floor() as usize;
    let goal_cells = usize::from(config.goal_placement.has_goal());
    let reserved = 2usize
        .saturating_add(goal_cells)
        .saturating_add(desired_enemies(config));
    requested.min(total.saturating_sub(reserved))
}

/// Enemies that fit once the weapon (and a scattered goal) keep a floor each.
#[must_use]
pub fn enemy_capacity(config: &LevelConfig, available_floors: usize) -> usize {
    let fixed_purpose = 1 + config.goal_placement.scattered_cells() as usize;
    let available = available_floors.saturating_sub(fixed_purpose);
    desired_enemies(config).min(available)
}

fn desired_enemies(config: &LevelConfig) -> usize {
    let desired = config.desired_enemies;
    usize::try_from(desired).unwrap_or(usize::MAX)
}

fn corners(size: u32) -> [CellCoord; 4] {
    let last = size.saturating_sub(1);
    [
        CellCoord::new(0, 0),
        CellCoord::new(last, 0),
        CellCoord::new(0, last),
        CellCoord::new(last, last),
    ]
}

fn pick_corners<R>(size: u32, rng: &mut R) -> (CellCoord, CellCoord)
where
    R: Rng + ?Sized,
{
    let corners = corners(size);
    let first = rng.gen_range(0..corners.len());
    let mut second = rng.gen_range(0..corners.len());
    while second == first {
        second = rng.gen_range(0..corners.len());
    }
    (corners[first], corners[second])
}

fn place_enemies(
    builder: &mut GridBuilder,
    config: &LevelConfig,
    start: CellCoord,
) -> Vec<CellCoord> {
    let field = DistanceField::compute(builder.view(), start);
    let is_floor = |cell: CellCoord| builder.get(cell) == Some(Cell::Floor);
    let ranked = field.farthest_first(is_floor);
    let count = enemy_capacity(config, ranked.len());

    let enemies: Vec<CellCoord> = ranked
        .into_iter()
        .take(count)
        .map(|(cell, _)| cell)
        .collect();
    for cell in &enemies {
        builder.set(*cell, Cell::Enemy);
    }
    enemies
}

fn place_pickups<R>(builder: &mut GridBuilder, config: &LevelConfig, rng: &mut R)
where
    R: Rng + ?Sized,
{
    let mut leftovers = builder.positions_of(Cell::Floor);

    if let Some(cell) = draw(&mut leftovers, rng) {
        builder.set(cell, Cell::Weapon);
    }

    if config.goal_placement.scattered_cells() > 0 {
        if let Some(cell) = draw(&mut leftovers, rng) {
            builder.set(cell, Cell::Goal);
        }
    }
}

fn draw<R>(cells: &mut Vec<CellCoord>, rng: &mut R) -> Option<CellCoord>
where
    R: Rng + ?Sized,
{
    if cells.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..cells.len());
    Some(cells.swap_remove(index))
}
