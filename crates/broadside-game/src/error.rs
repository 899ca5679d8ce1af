/// Errors from the game layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// A coordinate string was not of the form `A1`..`J10`.
    #[error("bad coordinate {0:?}")]
    BadCoordinate(String),

    /// A ship placement ran off the grid.
    #[error("{0} does not fit on the board there")]
    OutOfBounds(&'static str),

    /// A ship placement crossed an already-occupied cell.
    #[error("{0} overlaps another ship")]
    Overlap(&'static str),

    /// The fleet already contains a ship of this kind.
    #[error("{0} is already placed")]
    DuplicateShip(&'static str),

    /// A connection was attempted before all ships were placed.
    #[error("fleet is not fully placed")]
    FleetNotPlaced,

    /// A player name was empty or contained line terminators.
    #[error("invalid player name {0:?}")]
    InvalidName(String),
}
