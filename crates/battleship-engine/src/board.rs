//! Boards: a player's private grid, the ships on it, and the shots
//! taken against it.
//!
//! A board owns two rules:
//!
//! - **Placement** ([`Board::place_ship`]): a ship is a non-empty,
//!   duplicate-free, in-bounds, unoccupied, straight and gap-free run of
//!   cells. Validation happens before anything is touched, so a rejected
//!   placement leaves the board exactly as it was.
//! - **Shot resolution** ([`Board::resolve_shot`]): each cell can be shot
//!   once. Hitting the last intact cell of a ship sinks it and turns all
//!   of its cells to [`CellState::Sunk`].

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use battleship_protocol::{Coordinate, ShipId, ShotOutcome};
use serde::{Deserialize, Serialize};

use crate::{EngineError, Ship};

/// A unique identifier for a board.
///
/// Boards never appear on the wire; the id only ties a player to the
/// board the repository holds for them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BoardId(pub u64);

impl fmt::Display for BoardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B-{}", self.0)
    }
}

/// What has happened to a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellState {
    /// Not shot yet.
    Unshot,
    /// Shot, nothing there.
    Water,
    /// Shot, part of a ship that still floats.
    Hit,
    /// Part of a ship that has been sunk.
    Sunk,
}

/// One grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub coordinate: Coordinate,
    /// The ship occupying this cell, if any.
    pub ship: Option<ShipId>,
    pub state: CellState,
}

/// The result of one resolved shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotResult {
    pub outcome: ShotOutcome,
    /// The ship that was hit or sunk. `None` on water.
    pub ship: Option<ShipId>,
}

/// A fixed-size grid of cells plus the ships placed on it.
#[derive(Debug, Clone)]
pub struct Board {
    id: BoardId,
    rows: u32,
    cols: u32,
    /// Row-major; `cells[row * cols + col]`.
    cells: Vec<Cell>,
    ships: BTreeMap<ShipId, Ship>,
    next_ship_id: u64,
}

impl Board {
    /// Creates an empty board with every cell unshot.
    pub fn new(id: BoardId, rows: u32, cols: u32) -> Self {
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Coordinate::new(row, col)))
            .map(|coordinate| Cell {
                coordinate,
                ship: None,
                state: CellState::Unshot,
            })
            .collect();
        Self {
            id,
            rows,
            cols,
            cells,
            ships: BTreeMap::new(),
            next_ship_id: 1,
        }
    }

    pub fn id(&self) -> BoardId {
        self.id
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Returns `true` if the coordinate lies on the board.
    pub fn contains(&self, at: Coordinate) -> bool {
        at.row < self.rows && at.col < self.cols
    }

    /// The cell at `at`, or `None` if it is off the board.
    pub fn cell(&self, at: Coordinate) -> Option<&Cell> {
        self.index(at).map(|i| &self.cells[i])
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.get(&id)
    }

    /// Ships in the order they were placed.
    pub fn ships(&self) -> impl Iterator<Item = &Ship> {
        self.ships.values()
    }

    /// Returns `true` if no placed ship is still floating. An empty
    /// board has nothing left to sink, so this holds for it too.
    pub fn all_sunk(&self) -> bool {
        self.ships.values().all(Ship::is_sunk)
    }

    /// Places a ship on `cells` and returns it.
    ///
    /// # Errors
    /// - [`EngineError::EmptyPlacement`] for an empty list
    /// - [`EngineError::OutOfBounds`], [`EngineError::DuplicateCoordinate`]
    ///   or [`EngineError::CellOccupied`] for the first offending cell
    /// - [`EngineError::NotStraight`] / [`EngineError::NotContiguous`]
    ///   for a multi-cell run that bends, goes diagonal or has a gap
    ///
    /// On error the board is unchanged.
    pub fn place_ship(
        &mut self,
        cells: &[Coordinate],
    ) -> Result<Ship, EngineError> {
        self.validate_placement(cells)?;

        let id = ShipId(self.next_ship_id);
        self.next_ship_id += 1;

        for &at in cells {
            if let Some(i) = self.index(at) {
                self.cells[i].ship = Some(id);
            }
        }
        let ship = Ship::new(id, cells.to_vec());
        self.ships.insert(id, ship.clone());

        tracing::debug!(board_id = %self.id, ship_id = %id, size = ship.size(), "ship placed");
        Ok(ship)
    }

    fn validate_placement(&self, cells: &[Coordinate]) -> Result<(), EngineError> {
        if cells.is_empty() {
            return Err(EngineError::EmptyPlacement);
        }

        let mut seen = HashSet::with_capacity(cells.len());
        for &at in cells {
            let cell = self.cell(at).ok_or(EngineError::OutOfBounds(at))?;
            if !seen.insert(at) {
                return Err(EngineError::DuplicateCoordinate(at));
            }
            if cell.ship.is_some() {
                return Err(EngineError::CellOccupied(at));
            }
        }

        if cells.len() == 1 {
            return Ok(());
        }

        let first = cells[0];
        let mut along: Vec<u32> = if cells.iter().all(|c| c.row == first.row) {
            cells.iter().map(|c| c.col).collect()
        } else if cells.iter().all(|c| c.col == first.col) {
            cells.iter().map(|c| c.row).collect()
        } else {
            return Err(EngineError::NotStraight);
        };

        along.sort_unstable();
        if along.windows(2).any(|pair| pair[1] != pair[0] + 1) {
            return Err(EngineError::NotContiguous);
        }
        Ok(())
    }

    /// Fires at `at`.
    ///
    /// # Errors
    /// - [`EngineError::OutOfBounds`] if `at` is off the board
    /// - [`EngineError::AlreadyShot`] if the cell was shot before
    pub fn resolve_shot(
        &mut self,
        at: Coordinate,
    ) -> Result<ShotResult, EngineError> {
        let i = self.index(at).ok_or(EngineError::OutOfBounds(at))?;
        if self.cells[i].state != CellState::Unshot {
            return Err(EngineError::AlreadyShot(at));
        }

        let Some(ship_id) = self.cells[i].ship else {
            self.cells[i].state = CellState::Water;
            return Ok(ShotResult {
                outcome: ShotOutcome::Water,
                ship: None,
            });
        };
        self.cells[i].state = CellState::Hit;

        let Some(ship) = self.ships.get_mut(&ship_id) else {
            // Cells only ever point at ships this board holds.
            return Ok(ShotResult {
                outcome: ShotOutcome::Hit,
                ship: Some(ship_id),
            });
        };

        let cells = &mut self.cells;
        let cols = self.cols;
        let slot = |c: &Coordinate| (c.row * cols + c.col) as usize;

        let intact = ship
            .cells()
            .iter()
            .any(|c| cells[slot(c)].state == CellState::Unshot);
        if intact {
            return Ok(ShotResult {
                outcome: ShotOutcome::Hit,
                ship: Some(ship_id),
            });
        }

        for c in ship.cells() {
            cells[slot(c)].state = CellState::Sunk;
        }
        ship.mark_sunk();
        tracing::debug!(board_id = %self.id, %ship_id, "ship sunk");

        Ok(ShotResult {
            outcome: ShotOutcome::Sunk,
            ship: Some(ship_id),
        })
    }

    fn index(&self, at: Coordinate) -> Option<usize> {
        self.contains(at)
            .then(|| (at.row * self.cols + at.col) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: u32, col: u32) -> Coordinate {
        Coordinate::new(row, col)
    }

    fn board() -> Board {
        Board::new(BoardId(1), 10, 10)
    }

    fn state(board: &Board, row: u32, col: u32) -> CellState {
        board.cell(c(row, col)).unwrap().state
    }

    // =====================================================================
    // place_ship()
    // =====================================================================

    #[test]
    fn test_place_ship_horizontal_succeeds() {
        let mut b = board();

        let ship = b.place_ship(&[c(0, 0), c(0, 1), c(0, 2)]).unwrap();

        assert_eq!(ship.id(), ShipId(1));
        assert_eq!(ship.size(), 3);
        assert_eq!(b.cell(c(0, 1)).unwrap().ship, Some(ShipId(1)));
        assert_eq!(b.cell(c(1, 1)).unwrap().ship, None);
    }

    #[test]
    fn test_place_ship_vertical_unordered_succeeds() {
        let mut b = board();

        let ship = b.place_ship(&[c(4, 2), c(2, 2), c(3, 2)]).unwrap();

        assert_eq!(ship.size(), 3);
        assert_eq!(ship.cells()[0], c(4, 2), "placement order is kept");
    }

    #[test]
    fn test_place_ship_single_cell_succeeds() {
        let mut b = board();
        assert_eq!(b.place_ship(&[c(9, 9)]).unwrap().size(), 1);
    }

    #[test]
    fn test_place_ship_ids_increase_per_board() {
        let mut b = board();
        let first = b.place_ship(&[c(0, 0)]).unwrap();
        let second = b.place_ship(&[c(2, 2)]).unwrap();
        assert_eq!(first.id(), ShipId(1));
        assert_eq!(second.id(), ShipId(2));
    }

    #[test]
    fn test_place_ship_rejections() {
        let mut b = board();
        b.place_ship(&[c(5, 5), c(5, 6)]).unwrap();

        assert_eq!(b.place_ship(&[]), Err(EngineError::EmptyPlacement));
        assert_eq!(
            b.place_ship(&[c(0, 0), c(0, 0)]),
            Err(EngineError::DuplicateCoordinate(c(0, 0)))
        );
        assert_eq!(
            b.place_ship(&[c(0, 9), c(0, 10)]),
            Err(EngineError::OutOfBounds(c(0, 10)))
        );
        assert_eq!(
            b.place_ship(&[c(5, 4), c(5, 5)]),
            Err(EngineError::CellOccupied(c(5, 5)))
        );
        assert_eq!(
            b.place_ship(&[c(0, 0), c(1, 1)]),
            Err(EngineError::NotStraight)
        );
        assert_eq!(
            b.place_ship(&[c(0, 0), c(0, 1), c(1, 1)]),
            Err(EngineError::NotStraight)
        );
        assert_eq!(
            b.place_ship(&[c(0, 0), c(0, 2)]),
            Err(EngineError::NotContiguous)
        );
    }

    #[test]
    fn test_place_ship_rejected_leaves_board_unchanged() {
        let mut b = board();

        let _ = b.place_ship(&[c(1, 1), c(1, 2), c(1, 4)]);

        assert_eq!(b.ships().count(), 0);
        assert!(b.cell(c(1, 1)).unwrap().ship.is_none());
        assert!(b.cell(c(1, 2)).unwrap().ship.is_none());
        // The id was not consumed either.
        assert_eq!(b.place_ship(&[c(1, 1)]).unwrap().id(), ShipId(1));
    }

    // =====================================================================
    // resolve_shot()
    // =====================================================================

    #[test]
    fn test_resolve_shot_water() {
        let mut b = board();

        let result = b.resolve_shot(c(3, 3)).unwrap();

        assert_eq!(result.outcome, ShotOutcome::Water);
        assert_eq!(result.ship, None);
        assert_eq!(state(&b, 3, 3), CellState::Water);
    }

    #[test]
    fn test_resolve_shot_hit_then_sunk() {
        let mut b = board();
        b.place_ship(&[c(0, 0), c(0, 1)]).unwrap();

        let hit = b.resolve_shot(c(0, 0)).unwrap();
        assert_eq!(hit.outcome, ShotOutcome::Hit);
        assert_eq!(state(&b, 0, 0), CellState::Hit);
        assert!(!b.all_sunk());

        let sunk = b.resolve_shot(c(0, 1)).unwrap();
        assert_eq!(sunk.outcome, ShotOutcome::Sunk);
        assert_eq!(sunk.ship, Some(ShipId(1)));
        assert_eq!(state(&b, 0, 0), CellState::Sunk);
        assert_eq!(state(&b, 0, 1), CellState::Sunk);
        assert!(b.ship(ShipId(1)).unwrap().is_sunk());
        assert!(b.all_sunk());
    }

    #[test]
    fn test_resolve_shot_single_cell_ship_sinks_immediately() {
        let mut b = board();
        b.place_ship(&[c(2, 2)]).unwrap();

        assert_eq!(b.resolve_shot(c(2, 2)).unwrap().outcome, ShotOutcome::Sunk);
    }

    #[test]
    fn test_resolve_shot_twice_is_already_shot() {
        let mut b = board();
        b.place_ship(&[c(0, 0), c(0, 1)]).unwrap();

        b.resolve_shot(c(0, 0)).unwrap();
        b.resolve_shot(c(5, 5)).unwrap();

        assert_eq!(
            b.resolve_shot(c(0, 0)),
            Err(EngineError::AlreadyShot(c(0, 0)))
        );
        assert_eq!(
            b.resolve_shot(c(5, 5)),
            Err(EngineError::AlreadyShot(c(5, 5)))
        );
    }

    #[test]
    fn test_resolve_shot_out_of_bounds() {
        let mut b = board();
        assert_eq!(
            b.resolve_shot(c(99, 99)),
            Err(EngineError::OutOfBounds(c(99, 99)))
        );
    }

    #[test]
    fn test_all_sunk_needs_every_ship() {
        let mut b = board();
        b.place_ship(&[c(0, 0)]).unwrap();
        b.place_ship(&[c(9, 9)]).unwrap();

        b.resolve_shot(c(0, 0)).unwrap();
        assert!(!b.all_sunk());
        b.resolve_shot(c(9, 9)).unwrap();
        assert!(b.all_sunk());
    }
}
