//! Ships: straight runs of cells on one board.

use battleship_protocol::{Coordinate, ShipId};

/// A placed ship.
///
/// Only a [`Board`](crate::Board) creates ships, and it does so in one
/// step: a `Ship` never exists with part of its cells assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ship {
    id: ShipId,
    cells: Vec<Coordinate>,
    sunk: bool,
}

impl Ship {
    pub(crate) fn new(id: ShipId, cells: Vec<Coordinate>) -> Self {
        Self {
            id,
            cells,
            sunk: false,
        }
    }

    pub fn id(&self) -> ShipId {
        self.id
    }

    /// The cells the ship occupies, in placement order.
    pub fn cells(&self) -> &[Coordinate] {
        &self.cells
    }

    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn is_sunk(&self) -> bool {
        self.sunk
    }

    pub(crate) fn mark_sunk(&mut self) {
        self.sunk = true;
    }
}
