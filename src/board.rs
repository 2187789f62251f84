//! Immutable Go board and rules engine.
//!
//! A [`Board`] is a snapshot of a 9x9 position plus move metadata. Playing a
//! move never mutates a board; it returns a new one, so boards can be shared
//! freely between search nodes. The rules are:
//! - a stone may not be placed on an occupied cell or on the ko point
//! - opponent groups adjacent to the played stone that are left without
//!   liberties are removed (several groups may be captured at once)
//! - a move whose own group has no liberties after captures is suicide
//! - a stone played into a point surrounded by the opponent that captures
//!   exactly one stone records the captured cell as the new ko point
//!
//! Black moves on even turns, White on odd turns.

use std::fmt;

use crate::constants::{COLUMN_LABELS, DEFAULT_KOMI, N, NN, STAR_POINTS};
use crate::coord::{Move, Point, neighbors};
use crate::error::GoError;
use crate::group::{flood_fill, group_liberties};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}

impl Color {
    pub fn opponent(self) -> Color {
        match self {
            Color::Black => Color::White,
            Color::White => Color::Black,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Black => write!(f, "black"),
            Color::White => write!(f, "white"),
        }
    }
}

/// Contents of one cell: a stone of some colour, or empty.
pub type Cell = Option<Color>;

/// A Go position (board state plus move metadata).
#[derive(Clone, Debug, PartialEq)]
pub struct Board {
    cells: [Cell; NN],
    /// Number of moves (including passes) played so far.
    turn: u32,
    ko: Option<Point>,
    last_move: Option<Move>,
    history: Vec<Move>,
    komi: f64,
}

/// Outcome of placing a stone, before it is committed to a new board.
struct Placement {
    cells: [Cell; NN],
    ko: Option<Point>,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board with the default komi.
    pub fn new() -> Self {
        Self::with_komi(DEFAULT_KOMI)
    }

    pub fn with_komi(komi: f64) -> Self {
        Board {
            cells: [None; NN],
            turn: 0,
            ko: None,
            last_move: None,
            history: Vec::new(),
            komi,
        }
    }

    /// Replay a move list from an empty board.
    ///
    /// Fails with the error of the first illegal move.
    pub fn from_moves(komi: f64, moves: &[Move]) -> Result<Self, GoError> {
        moves
            .iter()
            .try_fold(Self::with_komi(komi), |board, &mv| board.play(mv))
    }

    pub fn cells(&self) -> &[Cell; NN] {
        &self.cells
    }

    #[inline]
    pub fn get(&self, pt: Point) -> Cell {
        self.cells[pt]
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn ko_point(&self) -> Option<Point> {
        self.ko
    }

    pub fn last_move(&self) -> Option<Move> {
        self.last_move
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn komi(&self) -> f64 {
        self.komi
    }

    /// The colour of the player to move.
    pub fn to_move(&self) -> Color {
        if self.turn % 2 == 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Number of passes at the end of the move history.
    pub fn trailing_passes(&self) -> usize {
        self.history.iter().rev().take_while(|m| m.is_pass()).count()
    }

    pub fn stone_count(&self, color: Color) -> usize {
        self.cells.iter().filter(|&&c| c == Some(color)).count()
    }

    /// Play a move or a pass, returning the resulting board.
    ///
    /// # Errors
    /// - [`GoError::KoViolation`] if the move retakes the ko point
    /// - [`GoError::OccupiedCell`] if the cell is not empty
    /// - [`GoError::SuicideMove`] if the played group would have no liberties
    pub fn play(&self, mv: Move) -> Result<Board, GoError> {
        let Move::Play(pt) = mv else {
            return Ok(self.pass());
        };
        let placement = self.place(pt)?;
        Ok(self.advance(mv, placement))
    }

    /// Pass: advance the turn and clear the ko point.
    pub fn pass(&self) -> Board {
        self.advance(
            Move::Pass,
            Placement {
                cells: self.cells,
                ko: None,
            },
        )
    }

    /// The board after `mv`, whose effect on the cells is `placement`.
    fn advance(&self, mv: Move, placement: Placement) -> Board {
        let mut history = self.history.clone();
        history.push(mv);
        Board {
            cells: placement.cells,
            turn: self.turn + 1,
            ko: placement.ko,
            last_move: Some(mv),
            history,
            komi: self.komi,
        }
    }

    /// Whether the player to move may place a stone at `pt`.
    pub fn is_legal(&self, pt: Point) -> bool {
        self.place(pt).is_ok()
    }

    /// Resolve a stone placement without building a new board.
    fn place(&self, pt: Point) -> Result<Placement, GoError> {
        if pt >= NN {
            return Err(GoError::OffBoard {
                row: pt / N,
                col: pt % N,
            });
        }
        if self.ko == Some(pt) {
            return Err(GoError::KoViolation(pt));
        }
        if self.cells[pt].is_some() {
            return Err(GoError::OccupiedCell(pt));
        }

        let me = self.to_move();
        let opp = me.opponent();
        let into_eye = neighbors(pt).all(|n| self.cells[n] == Some(opp));
        let mut cells = self.cells;
        cells[pt] = Some(me);

        let mut captured: Vec<Point> = Vec::new();
        for n in neighbors(pt) {
            if cells[n] != Some(opp) {
                continue;
            }
            let group = flood_fill(&cells, n);
            if group.liberties(&cells) == 0 {
                for &s in &group.stones {
                    cells[s] = None;
                }
                captured.extend(group.stones);
            }
        }

        if group_liberties(&cells, pt) == 0 {
            return Err(GoError::SuicideMove(pt));
        }

        // Only a lone stone played into the opponent's eye can be retaken.
        let ko = match captured.as_slice() {
            &[single] if into_eye => Some(single),
            _ => None,
        };

        Ok(Placement { cells, ko })
    }

    /// Liberty count of the enclosing group for every cell (0 for empty cells).
    pub fn liberties(&self) -> [usize; NN] {
        let mut libs = [0usize; NN];
        let mut seen = [false; NN];
        for pt in 0..NN {
            if self.cells[pt].is_none() || seen[pt] {
                continue;
            }
            let group = flood_fill(&self.cells, pt);
            let count = group.liberties(&self.cells);
            for &s in &group.stones {
                libs[s] = count;
                seen[s] = true;
            }
        }
        libs
    }

    /// Area score: positive favours Black.
    ///
    /// Every empty region bordered by a single colour counts as that colour's
    /// territory; regions bordered by both colours (or none) are neutral.
    /// Assumes dead stones have been removed and there is no seki.
    pub fn score(&self) -> f64 {
        let mut black = self.stone_count(Color::Black);
        let mut white = self.stone_count(Color::White);
        let mut seen = [false; NN];

        for pt in 0..NN {
            if self.cells[pt].is_some() || seen[pt] {
                continue;
            }
            let region = flood_fill(&self.cells, pt);
            for &s in &region.stones {
                seen[s] = true;
            }
            let touches = |color| region.boundary.iter().any(|&b| self.cells[b] == Some(color));
            match (touches(Color::Black), touches(Color::White)) {
                (true, false) => black += region.len(),
                (false, true) => white += region.len(),
                _ => {}
            }
        }

        black as f64 - (white as f64 + self.komi)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "  ")?;
        for &label in COLUMN_LABELS {
            write!(f, " {}", label as char)?;
        }
        writeln!(f)?;
        for row in 0..N {
            write!(f, "{:>2}", N - row)?;
            for col in 0..N {
                let pt = row * N + col;
                let ch = match self.cells[pt] {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None if STAR_POINTS.contains(&pt) => '+',
                    None => '.',
                };
                write!(f, " {ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let board = Board::new();
        assert_eq!(board.turn(), 0);
        assert_eq!(board.ko_point(), None);
        assert_eq!(board.last_move(), None);
        assert_eq!(board.to_move(), Color::Black);
        assert!(board.cells().iter().all(|c| c.is_none()));
    }

    #[test]
    fn test_play_returns_new_board() {
        let board = Board::new();
        let next = board.play(Move::Play(40)).unwrap();
        assert_eq!(board.get(40), None, "input board must be untouched");
        assert_eq!(next.get(40), Some(Color::Black));
        assert_eq!(next.turn(), 1);
        assert_eq!(next.to_move(), Color::White);
        assert_eq!(next.history(), &[Move::Play(40)]);
    }

    #[test]
    fn test_pass_clears_ko() {
        let board = Board::new().pass();
        assert_eq!(board.turn(), 1);
        assert_eq!(board.last_move(), Some(Move::Pass));
        assert_eq!(board.play(Move::Pass).unwrap(), board.pass());
        assert_eq!(board.pass().trailing_passes(), 2);
    }

    #[test]
    fn test_play_off_board_index() {
        let board = Board::new();
        assert!(matches!(board.play(Move::Play(81)), Err(GoError::OffBoard { .. })));
        assert!(!board.is_legal(200));
    }

    #[test]
    fn test_corner_suicide() {
        // Black at B9 and A8 make A9 an eye; White may not fill it.
        let board = Board::from_moves(DEFAULT_KOMI, &[Move::Play(1), Move::Play(40), Move::Play(9)])
            .unwrap();
        assert_eq!(board.to_move(), Color::White);
        assert_eq!(board.play(Move::Play(0)), Err(GoError::SuicideMove(0)));
        assert!(!board.is_legal(0));
    }

    #[test]
    fn test_liberties_per_cell() {
        let board = Board::from_moves(DEFAULT_KOMI, &[Move::Play(0), Move::Play(1)]).unwrap();
        let libs = board.liberties();
        assert_eq!(libs[0], 1);
        assert_eq!(libs[1], 2);
        assert_eq!(libs[40], 0);
    }

    #[test]
    fn test_empty_score_is_minus_komi() {
        assert_eq!(Board::new().score(), -DEFAULT_KOMI);
        assert_eq!(Board::with_komi(7.5).score(), -7.5);
    }

    #[test]
    fn test_display_marks_star_points() {
        let board = Board::new().play(Move::Play(40)).unwrap();
        let text = board.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "   A B C D E F G H J");
        assert_eq!(lines[1], " 9 . . . . . . . . .");
        assert_eq!(lines[3], " 7 . . + . . . + . .");
        assert_eq!(lines[5], " 5 . . . . X . . . .");
    }
}
