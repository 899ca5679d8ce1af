//! The board: own-fleet occupancy, incoming shot records, and sinking
//! resolution.

use std::collections::HashSet;

use broadside_protocol::ResponseCode;

use crate::{Coordinate, GameError};

/// The classic five-ship fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShipKind {
    Carrier,
    Battleship,
    Cruiser,
    Submarine,
    Destroyer,
}

impl ShipKind {
    /// Every kind, in placement-listing order.
    pub const ALL: [Self; 5] = [
        Self::Carrier,
        Self::Battleship,
        Self::Cruiser,
        Self::Submarine,
        Self::Destroyer,
    ];

    /// Hull length in cells.
    pub fn length(self) -> u8 {
        match self {
            Self::Carrier => 5,
            Self::Battleship => 4,
            Self::Cruiser => 3,
            Self::Submarine => 3,
            Self::Destroyer => 2,
        }
    }

    /// Display name, as used in Sunk response messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Carrier => "Carrier",
            Self::Battleship => "Battleship",
            Self::Cruiser => "Cruiser",
            Self::Submarine => "Submarine",
            Self::Destroyer => "Destroyer",
        }
    }
}

/// Which way a ship extends from its bow cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Toward higher columns.
    Across,
    /// Toward higher rows.
    Down,
}

/// The result of one incoming shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOutcome {
    /// Open water.
    Miss,
    /// Struck a ship that still floats.
    Hit,
    /// Struck the last intact cell of this ship.
    Sunk(ShipKind),
    /// Sank the last remaining ship. The shooter has won.
    FleetSunk,
}

impl ShotOutcome {
    /// The response code reported back to the shooter.
    pub fn code(self) -> ResponseCode {
        match self {
            Self::Miss => ResponseCode::Miss,
            Self::Hit => ResponseCode::Hit,
            Self::Sunk(_) => ResponseCode::Sunk,
            Self::FleetSunk => ResponseCode::FleetSunk,
        }
    }
}

struct Ship {
    kind: ShipKind,
    cells: Vec<Coordinate>,
    hits: HashSet<Coordinate>,
}

impl Ship {
    fn is_sunk(&self) -> bool {
        self.hits.len() == self.cells.len()
    }
}

/// One player's own waters: the placed fleet plus every shot the peer
/// has taken at it.
#[derive(Default)]
pub struct Board {
    ships: Vec<Ship>,
    shots: HashSet<Coordinate>,
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places one ship with its bow at `bow`, extending `orientation`.
    ///
    /// # Errors
    /// - [`GameError::DuplicateShip`] if this kind is already placed
    /// - [`GameError::OutOfBounds`] if the hull runs off the grid
    /// - [`GameError::Overlap`] if the hull crosses another ship
    pub fn place_ship(
        &mut self,
        kind: ShipKind,
        bow: Coordinate,
        orientation: Orientation,
    ) -> Result<(), GameError> {
        if self.ships.iter().any(|s| s.kind == kind) {
            return Err(GameError::DuplicateShip(kind.name()));
        }

        let across = orientation == Orientation::Across;
        let mut cells = Vec::with_capacity(kind.length() as usize);
        for step in 0..kind.length() {
            let cell = bow
                .offset(across, step)
                .ok_or(GameError::OutOfBounds(kind.name()))?;
            cells.push(cell);
        }

        if cells
            .iter()
            .any(|cell| self.ships.iter().any(|s| s.cells.contains(cell)))
        {
            return Err(GameError::Overlap(kind.name()));
        }

        self.ships.push(Ship {
            kind,
            cells,
            hits: HashSet::new(),
        });
        Ok(())
    }

    /// True once every kind in [`ShipKind::ALL`] is on the board.
    pub fn all_ships_placed(&self) -> bool {
        self.ships.len() == ShipKind::ALL.len()
    }

    /// Whether the peer has already shot at this cell.
    pub fn is_shot_at(&self, coord: Coordinate) -> bool {
        self.shots.contains(&coord)
    }

    /// Resolves one incoming shot, recording it.
    ///
    /// The caller is responsible for rejecting repeats first (see
    /// [`is_shot_at`](Self::is_shot_at)); resolving the same cell twice
    /// just reports what is there.
    pub fn receive_shot(&mut self, coord: Coordinate) -> ShotOutcome {
        self.shots.insert(coord);

        let Some(ship) = self
            .ships
            .iter_mut()
            .find(|s| s.cells.contains(&coord))
        else {
            return ShotOutcome::Miss;
        };

        ship.hits.insert(coord);
        if !ship.is_sunk() {
            return ShotOutcome::Hit;
        }

        let kind = ship.kind;
        if self.ships.iter().all(Ship::is_sunk) {
            ShotOutcome::FleetSunk
        } else {
            ShotOutcome::Sunk(kind)
        }
    }

    /// Number of ships still afloat.
    pub fn ships_afloat(&self) -> usize {
        self.ships.iter().filter(|s| !s.is_sunk()).count()
    }
}
