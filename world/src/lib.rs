#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state for Delve.
//!
//! A [`Level`] owns the immutable grid produced by the generation system, the
//! pool of visual pieces materialized from it, and the per-episode state of
//! enemies and the weapon chest. Mutations flow exclusively through [`apply`];
//! everything else is read through the functions in [`query`].

pub mod coordinates;
pub mod pool;
pub mod sensor;

use delve_core::{
    cell_index, Cell, CellCoord, CollectionError, Command, Direction, EliminationError, Event,
    Grid, GridBuilder, LevelConfig, PassabilityMap, PieceCategory, PieceId,
};
use delve_system_generation::{GeneratedLevel, LevelGenerator};
use log::{debug, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use coordinates::{GridCoordinateMapper, GridOffset};
pub use delve_system_generation::GenerationError;
pub use pool::{Piece, PiecePool};
pub use sensor::{ObservationWindow, ENEMY_CODE, OUT_OF_BOUNDS_CODE, PASSABLE_CODE, WALL_CODE};

/// Cell bound to the pooled piece standing on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Binding {
    cell: CellCoord,
    piece: PieceId,
}

/// Represents the authoritative state of a generated dungeon level.
#[derive(Debug)]
pub struct Level {
    config: LevelConfig,
    mapper: GridCoordinateMapper,
    generator: LevelGenerator,
    grid: Grid,
    passability: PassabilityMap,
    enemy_occupancy: Vec<bool>,
    pool: PiecePool,
    start: CellCoord,
    goal: Option<Binding>,
    weapon: Option<Binding>,
    enemies: Vec<Binding>,
    weapon_collected: bool,
    seed: u64,
}

impl Level {
    /// Validates the configuration and generates the first layout from `seed`.
    pub fn generate(config: LevelConfig, seed: u64) -> Result<Self, GenerationError> {
        config.validate()?;

        let placeholder = GridBuilder::filled(config.size, Cell::Floor).build();
        let mut level = Self {
            mapper: GridCoordinateMapper::from_config(&config),
            generator: LevelGenerator::new(),
            passability: placeholder.passability(),
            enemy_occupancy: vec![false; placeholder.cells().len()],
            grid: placeholder,
            pool: PiecePool::new(),
            start: CellCoord::new(0, 0),
            goal: None,
            weapon: None,
            enemies: Vec::new(),
            weapon_collected: false,
            seed,
            config,
        };

        let mut events = Vec::new();
        level.regenerate(seed, &mut events)?;
        Ok(level)
    }

    fn regenerate(
        &mut self,
        seed: u64,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GenerationError> {
        for category in PieceCategory::ALL {
            let count = self.pool.release_all(category);
            out_events.push(Event::PiecesReleased { category, count });
        }
        self.goal = None;
        self.weapon = None;
        self.enemies.clear();
        self.enemy_occupancy.fill(false);
        self.weapon_collected = false;

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let generated = self.generator.generate(&self.config, &mut rng)?;
        self.install(generated, &mut rng);
        self.seed = seed;

        let summary = query::summary(self);
        info!(
            "generated level seed={} size={} walls={} enemies={} goal={:?} weapon={:?}",
            summary.seed, summary.size, summary.walls, summary.enemies, summary.goal, summary.weapon
        );
        out_events.push(Event::LevelGenerated { summary });
        Ok(())
    }

    fn install<R>(&mut self, generated: GeneratedLevel, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        let GeneratedLevel {
            grid,
            start,
            enemies,
            ..
        } = generated;
        let size = grid.size();

        self.passability = grid.passability();
        self.enemy_occupancy.clear();
        self.enemy_occupancy.resize(grid.cells().len(), false);
        self.start = start;

        for (cell, contents) in grid.iter() {
            let category = if contents.is_passable() {
                PieceCategory::Floor
            } else {
                PieceCategory::Wall
            };
            let _ = self.pool.place(category, cell, random_facing(rng));
        }

        for cell in enemies {
            let piece = self
                .pool
                .place(PieceCategory::Enemy, cell, facing_toward(cell, start));
            mark_occupancy(&mut self.enemy_occupancy, cell, size, true);
            self.enemies.push(Binding { cell, piece });
        }

        if let Some(cell) = grid.find(Cell::Weapon) {
            let piece = self
                .pool
                .place(PieceCategory::Weapon, cell, facing_toward(cell, start));
            self.weapon = Some(Binding { cell, piece });
        }

        if let Some(cell) = grid.find(Cell::Goal) {
            let piece = self
                .pool
                .place(PieceCategory::Goal, cell, facing_toward(cell, start));
            self.goal = Some(Binding { cell, piece });
        }

        self.grid = grid;
    }

    fn eliminate(&mut self, piece: PieceId) -> Result<CellCoord, EliminationError> {
        if !self.enemies.iter().any(|binding| binding.piece == piece) {
            return Err(EliminationError::MissingEnemy);
        }

        let cell = self.pool.mark_eliminated(piece)?;
        mark_occupancy(&mut self.enemy_occupancy, cell, self.grid.size(), false);
        Ok(cell)
    }

    fn collect_weapon(&mut self) -> Result<CellCoord, CollectionError> {
        let weapon = self.weapon.ok_or(CollectionError::MissingWeapon)?;
        if self.weapon_collected {
            return Err(CollectionError::AlreadyCollected);
        }

        self.weapon_collected = true;
        let _ = self.pool.release(weapon.piece);
        Ok(weapon.cell)
    }
}

fn mark_occupancy(occupancy: &mut [bool], cell: CellCoord, size: u32, occupied: bool) {
    let index = cell_index(cell, size);
    if let Some(slot) = index.and_then(|index| occupancy.get_mut(index)) {
        *slot = occupied;
    }
}

fn random_facing<R>(rng: &mut R) -> Direction
where
    R: Rng + ?Sized,
{
    Direction::ALL[rng.gen_range(0..Direction::ALL.len())]
}

fn facing_toward(cell: CellCoord, target: CellCoord) -> Direction {
    cell.direction_toward(target).unwrap_or(Direction::North)
}

/// Applies the provided command to the level, mutating state deterministically.
pub fn apply(level: &mut Level, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Regenerate { seed } => {
            if let Err(error) = level.regenerate(seed, out_events) {
                warn!("regeneration with seed {seed} failed: {error}");
            }
        }
        Command::EliminateEnemy { piece } => match level.eliminate(piece) {
            Ok(cell) => {
                debug!("enemy {} eliminated at {cell:?}", piece.get());
                out_events.push(Event::EnemyEliminated { piece, cell });
            }
            Err(reason) => {
                debug!("enemy {} not eliminated: {reason:?}", piece.get());
                let event = Event::EliminationRejected { piece, reason };
                out_events.push(event);
            }
        },
        Command::CollectWeapon => match level.collect_weapon() {
            Ok(cell) => {
                debug!("weapon collected at {cell:?}");
                out_events.push(Event::WeaponCollected { cell });
            }
            Err(reason) => out_events.push(Event::CollectionRejected { reason }),
        },
    }
}

/// Query functions that provide read-only access to the level state.
pub mod query {
    use delve_core::{
        Cell, CellCoord, Direction, Grid, LevelConfig, LevelSummary, PassabilityMap, PieceCategory,
        PieceId,
    };
    use glam::{Vec2, Vec3};
    use rand::Rng;

    use super::{
        sensor, Binding, GridCoordinateMapper, GridOffset, Level, ObservationWindow, PiecePool,
    };

    /// Configuration the level was generated with.
    #[must_use]
    pub fn config(level: &Level) -> &LevelConfig {
        &level.config
    }

    /// Seed that produced the current layout.
    #[must_use]
    pub fn seed(level: &Level) -> u64 {
        level.seed
    }

    /// Immutable grid of the current layout.
    #[must_use]
    pub fn grid(level: &Level) -> &Grid {
        &level.grid
    }

    /// Boolean traversability map of the current layout.
    #[must_use]
    pub fn passability_map(level: &Level) -> &PassabilityMap {
        &level.passability
    }

    /// Mapper between grid indices and world positions.
    #[must_use]
    pub fn mapper(level: &Level) -> &GridCoordinateMapper {
        &level.mapper
    }

    /// Read-only access to the piece pool.
    #[must_use]
    pub fn pool(level: &Level) -> &PiecePool {
        &level.pool
    }

    /// Encoded window of `(2 * radius + 1)²` cells centred on the cell nearest `center`.
    #[must_use]
    pub fn observation_window(level: &Level, center: Vec3, radius: u32) -> ObservationWindow {
        let mut values = Vec::new();
        observation_window_into(level, center, radius, &mut values);
        ObservationWindow::new(radius, values)
    }

    /// Writes the encoded observation window into a caller-owned buffer.
    pub fn observation_window_into(level: &Level, center: Vec3, radius: u32, out: &mut Vec<f32>) {
        sensor::sample_window(
            level.mapper.position_to_offset(center),
            radius,
            &level.passability,
            &level.enemy_occupancy,
            out,
        );
    }

    /// Fractional location of `position` within the level footprint.
    #[must_use]
    pub fn position_to_percentage(level: &Level, position: Vec3) -> Vec2 {
        level.mapper.position_to_percentage(position)
    }

    /// Nearest signed grid index to `position`, which may lie outside the grid.
    #[must_use]
    pub fn position_to_offset(level: &Level, position: Vec3) -> GridOffset {
        level.mapper.position_to_offset(position)
    }

    /// Nearest grid cell to `position`, clamped onto the grid.
    #[must_use]
    pub fn position_to_cell(level: &Level, position: Vec3) -> CellCoord {
        level.mapper.position_to_cell(position)
    }

    /// World-space centre of `cell`.
    #[must_use]
    pub fn index_to_position(level: &Level, cell: CellCoord) -> Vec3 {
        level.mapper.index_to_position(cell)
    }

    /// World position of a uniformly chosen active floor piece.
    pub fn random_walkable_position<R>(level: &Level, rng: &mut R) -> Option<Vec3>
    where
        R: Rng + ?Sized,
    {
        let floors = level.pool.active_ids(PieceCategory::Floor);
        if floors.is_empty() {
            return None;
        }
        let id = floors[rng.gen_range(0..floors.len())];
        level
            .pool
            .piece(id)
            .map(|piece| level.mapper.index_to_position(piece.cell))
    }

    /// Agent spawn location.
    #[must_use]
    pub fn start(level: &Level) -> Placement {
        Placement {
            cell: level.start,
            position: level.mapper.index_to_position(level.start),
            piece: None,
        }
    }

    /// Goal location, when the layout has one.
    #[must_use]
    pub fn goal(level: &Level) -> Option<Placement> {
        level.goal.map(|binding| placement(level, binding))
    }

    /// Weapon chest location, when one was placed.
    ///
    /// The location remains available after collection, but the released piece
    /// is no longer reported.
    #[must_use]
    pub fn weapon(level: &Level) -> Option<Placement> {
        level.weapon.map(|binding| {
            let mut placement = placement(level, binding);
            if level.weapon_collected {
                placement.piece = None;
            }
            placement
        })
    }

    /// Reports whether the weapon was collected during the current episode.
    #[must_use]
    pub fn weapon_collected(level: &Level) -> bool {
        level.weapon_collected
    }

    /// Snapshots of every enemy placed in the current layout, farthest first.
    #[must_use]
    pub fn enemies(level: &Level) -> Vec<EnemySnapshot> {
        level
            .enemies
            .iter()
            .map(|binding| EnemySnapshot {
                piece: binding.piece,
                cell: binding.cell,
                position: level.mapper.index_to_position(binding.cell),
                facing: facing(level, binding.piece),
                eliminated: is_eliminated(level, binding.piece),
            })
            .collect()
    }

    /// Compact description of the current layout.
    #[must_use]
    pub fn summary(level: &Level) -> LevelSummary {
        let walls = level.grid.count(Cell::Wall);
        LevelSummary {
            seed: level.seed,
            size: level.grid.size(),
            start: level.start,
            goal: level.goal.map(|binding| binding.cell),
            weapon: level.weapon.map(|binding| binding.cell),
            enemies: u32::try_from(level.enemies.len()).unwrap_or(u32::MAX),
            walls: u32::try_from(walls).unwrap_or(u32::MAX),
        }
    }

    /// Episode progress toward clearing the level.
    #[must_use]
    pub fn progress(level: &Level) -> Progress {
        let enemies_remaining = level
            .enemies
            .iter()
            .filter(|binding| !is_eliminated(level, binding.piece))
            .count();
        Progress {
            enemies_total: level.enemies.len(),
            enemies_remaining,
            weapon_present: level.weapon.is_some(),
            weapon_collected: level.weapon_collected,
        }
    }

    /// Reports whether every enemy is eliminated and the weapon collected.
    #[must_use]
    pub fn win_condition(level: &Level) -> bool {
        progress(level).is_complete()
    }

    fn is_eliminated(level: &Level, piece: PieceId) -> bool {
        level
            .pool
            .piece(piece)
            .is_some_and(|piece| piece.eliminated)
    }

    fn facing(level: &Level, piece: PieceId) -> Direction {
        level
            .pool
            .piece(piece)
            .map_or(Direction::North, |piece| piece.facing)
    }

    fn placement(level: &Level, binding: Binding) -> Placement {
        Placement {
            cell: binding.cell,
            position: level.mapper.index_to_position(binding.cell),
            piece: Some(binding.piece),
        }
    }

    /// Location of a notable cell in grid and world space.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct Placement {
        /// Grid cell.
        pub cell: CellCoord,
        /// World-space centre of the cell.
        pub position: Vec3,
        /// Pooled piece bound to the cell, if any.
        pub piece: Option<PieceId>,
    }

    /// Read-only snapshot of an enemy.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct EnemySnapshot {
        /// Handle of the enemy piece.
        pub piece: PieceId,
        /// Cell the enemy occupies.
        pub cell: CellCoord,
        /// World-space centre of the cell.
        pub position: Vec3,
        /// Direction the enemy piece faces.
        pub facing: Direction,
        /// Whether the enemy was eliminated during the current episode.
        pub eliminated: bool,
    }

    /// Episode progress counters.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct Progress {
        /// Enemies placed in the layout.
        pub enemies_total: usize,
        /// Enemies not yet eliminated.
        pub enemies_remaining: usize,
        /// Whether the layout holds a weapon chest.
        pub weapon_present: bool,
        /// Whether the weapon chest was collected.
        pub weapon_collected: bool,
    }

    impl Progress {
        /// Reports whether no enemies remain and any weapon has been collected.
        #[must_use]
        pub const fn is_complete(&self) -> bool {
            self.enemies_remaining == 0 && (self.weapon_collected || !self.weapon_present)
        }
    }
}
