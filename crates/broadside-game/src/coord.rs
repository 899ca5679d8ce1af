//! Grid coordinates: `A1` (top-left) through `J10`.

use std::fmt;
use std::str::FromStr;

use crate::GameError;

/// The board is 10×10.
pub const GRID_SIZE: u8 = 10;

/// One cell of the grid, column `A`..`J`, row `1`..`10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coordinate {
    // Both zero-based internally.
    col: u8,
    row: u8,
}

impl Coordinate {
    /// A coordinate from zero-based column and row indices.
    pub fn new(col: u8, row: u8) -> Result<Self, GameError> {
        if col < GRID_SIZE && row < GRID_SIZE {
            Ok(Self { col, row })
        } else {
            Err(GameError::BadCoordinate(format!("col {col}, row {row}")))
        }
    }

    /// Parses the wire form: a column letter followed by a row number,
    /// case-insensitive (`b7`, `B7`, `J10`).
    pub fn parse(text: &str) -> Result<Self, GameError> {
        let bad = || GameError::BadCoordinate(text.to_string());
        let mut chars = text.chars();
        let letter = chars.next().ok_or_else(bad)?;
        if !letter.is_ascii_alphabetic() {
            return Err(bad());
        }
        let col = (letter.to_ascii_uppercase() as u8).wrapping_sub(b'A');
        let row: u8 = chars.as_str().parse().map_err(|_| bad())?;
        if row == 0 {
            return Err(bad());
        }
        Self::new(col, row - 1).map_err(|_| bad())
    }

    /// Zero-based column index.
    pub fn col(self) -> u8 {
        self.col
    }

    /// Zero-based row index.
    pub fn row(self) -> u8 {
        self.row
    }

    /// The cell `steps` away along `across` (true) or down (false),
    /// if it stays on the grid.
    pub(crate) fn offset(self, across: bool, steps: u8) -> Option<Self> {
        let (col, row) = if across {
            (self.col.checked_add(steps)?, self.row)
        } else {
            (self.col, self.row.checked_add(steps)?)
        };
        Self::new(col, row).ok()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'A' + self.col) as char, self.row + 1)
    }
}

impl FromStr for Coordinate {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_corners() {
        assert_eq!(Coordinate::parse("A1").unwrap(), Coordinate::new(0, 0).unwrap());
        assert_eq!(
            Coordinate::parse("J10").unwrap(),
            Coordinate::new(9, 9).unwrap()
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            Coordinate::parse("b7").unwrap(),
            Coordinate::parse("B7").unwrap()
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for text in ["", "7", "B", "B0", "B11", "K5", "BB7", "B 7", "Я1"] {
            assert!(
                matches!(
                    Coordinate::parse(text),
                    Err(GameError::BadCoordinate(_))
                ),
                "text {text:?}"
            );
        }
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["A1", "B7", "J10", "D4"] {
            let coord = Coordinate::parse(text).unwrap();
            assert_eq!(coord.to_string(), text);
        }
    }
}
