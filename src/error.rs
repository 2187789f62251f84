//! Error kinds reported by the rules engine and the search engine.
//!
//! None of these are fatal. Front ends report them to the user (usually as
//! "illegal move") and carry on with the session.

use thiserror::Error;

use crate::coord::Point;

/// Errors produced by board, search, and record operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GoError {
    /// A row/column pair outside the 9x9 grid.
    #[error("coordinate ({row}, {col}) is off the board")]
    OffBoard { row: usize, col: usize },

    /// The target cell already holds a stone.
    #[error("Illegal move: point not EMPTY ({0})")]
    OccupiedCell(Point),

    /// The move immediately retakes the recorded ko point.
    #[error("Illegal move: retakes ko ({0})")]
    KoViolation(Point),

    /// The played group would have no liberties after captures resolve.
    #[error("Illegal move: suicide ({0})")]
    SuicideMove(Point),

    /// A reward was requested from a node that is still in play.
    #[error("reward requested on a non-terminal node")]
    NotTerminal,

    /// `choose` was called on a node that has no recorded children.
    #[error("node has no children to choose from")]
    NoChildren,

    /// A GTP vertex string that does not name a board point or a pass.
    #[error("invalid vertex: {0}")]
    InvalidVertex(String),

    /// A game record that could not be turned into a move list.
    #[error("invalid game record: {0}")]
    InvalidRecord(String),
}

impl GoError {
    /// True for the three rules violations a player can commit.
    pub fn is_illegal_move(&self) -> bool {
        matches!(
            self,
            GoError::OccupiedCell(_) | GoError::KoViolation(_) | GoError::SuicideMove(_)
        )
    }
}
