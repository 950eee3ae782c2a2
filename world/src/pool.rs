//! Pooled piece instances reused across level regenerations.

use std::collections::BTreeMap;

use delve_core::{CellCoord, Direction, EliminationError, PieceCategory, PieceId};
use log::trace;

/// Snapshot of a pooled piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    /// Identifier allocated when the piece was first created.
    pub id: PieceId,
    /// Family the piece belongs to. Never changes after creation.
    pub category: PieceCategory,
    /// Cell the piece was last placed on.
    pub cell: CellCoord,
    /// Orientation applied on the last placement.
    pub facing: Direction,
    /// Whether the piece is part of the current layout.
    pub active: bool,
    /// Whether an enemy piece was eliminated during the current episode.
    pub eliminated: bool,
}

#[derive(Clone, Debug, Default)]
struct CategorySlots {
    active: Vec<PieceId>,
    free: Vec<PieceId>,
}

/// Registry that stores pieces per category and recycles inactive ones.
///
/// Pieces are created on demand and never destroyed. Releasing a category
/// deactivates its pieces and parks them on a free list that later
/// placements draw from before allocating new identifiers.
#[derive(Debug)]
pub struct PiecePool {
    entries: BTreeMap<PieceId, Piece>,
    slots: BTreeMap<PieceCategory, CategorySlots>,
    next_piece_id: PieceId,
}

impl Default for PiecePool {
    fn default() -> Self {
        Self::new()
    }
}

impl PiecePool {
    /// Creates an empty pool with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            slots: BTreeMap::new(),
            next_piece_id: PieceId::new(0),
        }
    }

    /// Activates a piece of `category` on `cell`, reusing an inactive one when possible.
    ///
    /// Reused pieces have their eliminated flag cleared.
    pub fn place(
        &mut self,
        category: PieceCategory,
        cell: CellCoord,
        facing: Direction,
    ) -> PieceId {
        let slots = self.slots.entry(category).or_default();

        let id = match slots.free.pop() {
            Some(id) => {
                if let Some(piece) = self.entries.get_mut(&id) {
                    piece.cell = cell;
                    piece.facing = facing;
                    piece.active = true;
                    piece.eliminated = false;
                }
                trace!("reused {category:?} piece {} at {cell:?}", id.get());
                id
            }
            None => {
                let id = self.next_piece_id;
                self.next_piece_id = PieceId::new(id.get().saturating_add(1));
                let _ = self.entries.insert(
                    id,
                    Piece {
                        id,
                        category,
                        cell,
                        facing,
                        active: true,
                        eliminated: false,
                    },
                );
                trace!("created {category:?} piece {} at {cell:?}", id.get());
                id
            }
        };

        slots.active.push(id);
        id
    }

    /// Deactivates every active piece of `category`, returning how many were released.
    pub fn release_all(&mut self, category: PieceCategory) -> usize {
        let Some(slots) = self.slots.get_mut(&category) else {
            return 0;
        };

        let released = slots.active.len();
        for id in slots.active.drain(..) {
            if let Some(piece) = self.entries.get_mut(&id) {
                piece.active = false;
            }
            slots.free.push(id);
        }
        released
    }

    /// Deactivates a single piece. Returns `false` when it was not active.
    pub fn release(&mut self, id: PieceId) -> bool {
        let Some(piece) = self.entries.get_mut(&id) else {
            return false;
        };
        if !piece.active {
            return false;
        }
        piece.active = false;

        let slots = self.slots.entry(piece.category).or_default();
        slots.active.retain(|active| *active != id);
        slots.free.push(id);
        true
    }

    /// Flags an active enemy piece as eliminated and returns the cell it occupies.
    pub fn mark_eliminated(&mut self, id: PieceId) -> Result<CellCoord, EliminationError> {
        let piece = self
            .entries
            .get_mut(&id)
            .ok_or(EliminationError::MissingEnemy)?;
        if !piece.active || piece.category != PieceCategory::Enemy {
            return Err(EliminationError::MissingEnemy);
        }
        if piece.eliminated {
            return Err(EliminationError::AlreadyEliminated);
        }
        piece.eliminated = true;
        Ok(piece.cell)
    }

    /// Looks up a piece, active or not.
    #[must_use]
    pub fn piece(&self, id: PieceId) -> Option<&Piece> {
        self.entries.get(&id)
    }

    /// Identifiers of the active pieces of `category` in placement order.
    #[must_use]
    pub fn active_ids(&self, category: PieceCategory) -> &[PieceId] {
        self.slots
            .get(&category)
            .map(|slots| slots.active.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates the active pieces of `category` in placement order.
    pub fn active(&self, category: PieceCategory) -> impl Iterator<Item = &Piece> + '_ {
        self.active_ids(category)
            .iter()
            .filter_map(|id| self.entries.get(id))
    }

    /// Number of active pieces of `category`.
    #[must_use]
    pub fn active_count(&self, category: PieceCategory) -> usize {
        self.active_ids(category).len()
    }

    /// Number of pieces of `category` ever created.
    #[must_use]
    pub fn created_count(&self, category: PieceCategory) -> usize {
        self.slots
            .get(&category)
            .map_or(0, |slots| slots.active.len() + slots.free.len())
    }

    /// Number of pieces ever created across every category.
    #[must_use]
    pub fn total_created(&self) -> usize {
        self.entries.len()
    }
}
