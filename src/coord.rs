//! Coordinates: flattened cell indices, row/column pairs, and GTP vertices.
//!
//! Cells are numbered `row * N + col` with row 0 at the top of the printed
//! board. GTP vertices label columns `A`..`J` (skipping `I`) and rows
//! `N`..`1` from top to bottom, so index 0 is `A9` and index 80 is `J1`.

use std::fmt;

use crate::constants::{COLUMN_LABELS, N, NN};
use crate::error::GoError;

/// A cell on the board, an index in `0..NN`.
pub type Point = usize;

/// A move: a stone placed on a cell, or a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    Play(Point),
    Pass,
}

impl Move {
    /// The cell this move places a stone on, if any.
    pub fn point(self) -> Option<Point> {
        match self {
            Move::Play(pt) => Some(pt),
            Move::Pass => None,
        }
    }

    pub fn is_pass(self) -> bool {
        self == Move::Pass
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Move::Pass => write!(f, "pass"),
            Move::Play(pt) => write!(f, "{}", str_coord(pt)),
        }
    }
}

/// Convert a row/column pair to a cell index.
pub fn to_index(row: usize, col: usize) -> Result<Point, GoError> {
    if row >= N || col >= N {
        return Err(GoError::OffBoard { row, col });
    }
    Ok(row * N + col)
}

/// Convert a cell index back to its row/column pair.
#[inline]
pub fn from_index(pt: Point) -> (usize, usize) {
    debug_assert!(pt < NN);
    (pt / N, pt % N)
}

/// The orthogonal neighbours of a cell that lie on the board.
#[inline]
pub fn neighbors(pt: Point) -> impl Iterator<Item = Point> {
    let (row, col) = from_index(pt);
    [
        (row > 0).then(|| pt - N),
        (col + 1 < N).then(|| pt + 1),
        (row + 1 < N).then(|| pt + N),
        (col > 0).then(|| pt - 1),
    ]
    .into_iter()
    .flatten()
}

/// Parse a GTP vertex (e.g. "D4", "j9", "pass") into a move.
pub fn parse_coord(s: &str) -> Result<Move, GoError> {
    let invalid = || GoError::InvalidVertex(s.to_string());
    if s.eq_ignore_ascii_case("pass") {
        return Ok(Move::Pass);
    }

    let bytes = s.as_bytes();
    if bytes.len() < 2 {
        return Err(invalid());
    }

    let col_char = bytes[0].to_ascii_uppercase();
    let col = COLUMN_LABELS
        .iter()
        .position(|&c| c == col_char)
        .ok_or_else(invalid)?;

    let number: usize = s[1..].parse().map_err(|_| invalid())?;
    if number == 0 || number > N {
        return Err(invalid());
    }

    to_index(N - number, col).map(Move::Play)
}

/// Convert a cell index to a GTP vertex string (e.g. "D4").
pub fn str_coord(pt: Point) -> String {
    let (row, col) = from_index(pt);
    format!("{}{}", COLUMN_LABELS[col] as char, N - row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_index_row_major() {
        assert_eq!(to_index(0, 0), Ok(0));
        assert_eq!(to_index(3, 3), Ok(30));
        assert_eq!(to_index(3, 4), Ok(31));
        assert_eq!(to_index(8, 8), Ok(80));
    }

    #[test]
    fn test_to_index_off_board() {
        assert_eq!(to_index(9, 0), Err(GoError::OffBoard { row: 9, col: 0 }));
        assert_eq!(to_index(0, 12), Err(GoError::OffBoard { row: 0, col: 12 }));
    }

    #[test]
    fn test_parse_str_coord_roundtrip() {
        for pt in 0..NN {
            let s = str_coord(pt);
            assert_eq!(parse_coord(&s), Ok(Move::Play(pt)), "Failed roundtrip for {s}");
        }
    }

    #[test]
    fn test_vertex_labels() {
        assert_eq!(str_coord(0), "A9");
        assert_eq!(str_coord(8), "J9");
        assert_eq!(str_coord(72), "A1");
        assert_eq!(parse_coord("h5"), Ok(Move::Play(4 * N + 7)));
        assert_eq!(parse_coord("J5"), Ok(Move::Play(4 * N + 8)));
    }

    #[test]
    fn test_parse_coord_rejects_garbage() {
        assert!(parse_coord("I5").is_err());
        assert!(parse_coord("A0").is_err());
        assert!(parse_coord("A10").is_err());
        assert!(parse_coord("Z").is_err());
        assert_eq!(parse_coord("PASS"), Ok(Move::Pass));
    }

    #[test]
    fn test_neighbors_at_edges() {
        let corner: Vec<_> = neighbors(0).collect();
        assert_eq!(corner, vec![1, N]);
        let center: Vec<_> = neighbors(40).collect();
        assert_eq!(center, vec![31, 41, 49, 39]);
        assert_eq!(neighbors(80).count(), 2);
        assert_eq!(neighbors(4).count(), 3);
    }
}
