//! Game-record import.
//!
//! Reads the moves of a 9x9 SGF game record so that a [`Board`] can replay
//! them. Only the main line is read: every `B[..]` / `W[..]` property in the
//! file, in order. Setup properties (`AB`, `AW`), comments, and variations
//! are skipped. An SGF point is two letters, column first, `a` = 0; an empty
//! value or `tt` is a pass.

use crate::board::{Board, Color};
use crate::constants::N;
use crate::coord::{Move, to_index};
use crate::error::GoError;

/// Moves and game info read from a record.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    /// Komi from the `KM` property, if present.
    pub komi: Option<f64>,
    /// Moves in file order with the colour that played them.
    pub moves: Vec<(Color, Move)>,
}

impl GameRecord {
    /// The moves as a strictly alternating list starting with Black.
    ///
    /// A pass is inserted wherever the record has the same colour move
    /// twice in a row (e.g. handicap stones).
    pub fn move_list(&self) -> Vec<Move> {
        let mut to_move = Color::Black;
        let mut out = Vec::with_capacity(self.moves.len());
        for &(color, mv) in &self.moves {
            if color != to_move {
                out.push(Move::Pass);
            }
            out.push(mv);
            to_move = color.opponent();
        }
        out
    }

    /// Replay the record, using its komi if it has one.
    pub fn replay(&self, default_komi: f64) -> Result<Board, GoError> {
        Board::from_moves(self.komi.unwrap_or(default_komi), &self.move_list())
    }
}

/// Parse an SGF game record.
pub fn parse_sgf(text: &str) -> Result<GameRecord, GoError> {
    let mut record = GameRecord {
        komi: None,
        moves: Vec::new(),
    };

    for (ident, value) in properties(text)? {
        match ident.as_str() {
            "B" => record.moves.push((Color::Black, parse_point(&value)?)),
            "W" => record.moves.push((Color::White, parse_point(&value)?)),
            "SZ" => {
                if value.trim() != N.to_string() {
                    return Err(GoError::InvalidRecord(format!(
                        "board size {value} is not supported"
                    )));
                }
            }
            "KM" => {
                let komi = value
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| GoError::InvalidRecord(format!("bad komi {value:?}")))?;
                record.komi = Some(komi);
            }
            _ => {}
        }
    }

    Ok(record)
}

/// Parse only the move list of an SGF record.
pub fn parse_sgf_moves(text: &str) -> Result<Vec<Move>, GoError> {
    parse_sgf(text).map(|r| r.move_list())
}

/// Convert an SGF point value into a move.
fn parse_point(value: &str) -> Result<Move, GoError> {
    let bad = || GoError::InvalidRecord(format!("bad point {value:?}"));
    match value.as_bytes() {
        b"" | b"tt" => Ok(Move::Pass),
        &[c, r] if c.is_ascii_lowercase() && r.is_ascii_lowercase() => {
            let col = (c - b'a') as usize;
            let row = (r - b'a') as usize;
            to_index(row, col).map(Move::Play).map_err(|_| bad())
        }
        _ => Err(bad()),
    }
}

/// Split SGF text into `(identifier, value)` pairs.
///
/// A property with several values (`AB[aa][bb]`) yields one pair per value.
fn properties(text: &str) -> Result<Vec<(String, String)>, GoError> {
    let mut out = Vec::new();
    let mut ident = String::new();
    let mut after_value = false;
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        match ch {
            'A'..='Z' => {
                if after_value {
                    ident.clear();
                    after_value = false;
                }
                ident.push(ch);
            }
            '[' => {
                if ident.is_empty() {
                    return Err(GoError::InvalidRecord("value without a property".into()));
                }
                let mut value = String::new();
                let mut closed = false;
                while let Some(v) = chars.next() {
                    match v {
                        '\\' => {
                            if let Some(escaped) = chars.next() {
                                value.push(escaped);
                            }
                        }
                        ']' => {
                            closed = true;
                            break;
                        }
                        _ => value.push(v),
                    }
                }
                if !closed {
                    return Err(GoError::InvalidRecord("unterminated property value".into()));
                }
                out.push((ident.clone(), value));
                after_value = true;
            }
            c if c.is_whitespace() => {}
            _ => {
                ident.clear();
                after_value = false;
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_game() {
        let sgf = "(;GM[1]SZ[9]KM[6.5];B[dd];W[ee];B[])";
        let record = parse_sgf(sgf).unwrap();
        assert_eq!(record.komi, Some(6.5));
        assert_eq!(
            record.move_list(),
            vec![Move::Play(3 * N + 3), Move::Play(4 * N + 4), Move::Pass]
        );
    }

    #[test]
    fn test_sgf_column_comes_first() {
        // "ba": column b (1), row a (0).
        assert_eq!(parse_sgf_moves("(;B[ba])").unwrap(), vec![Move::Play(1)]);
    }

    #[test]
    fn test_tt_is_pass() {
        assert_eq!(parse_sgf_moves("(;B[tt];W[aa])").unwrap(), vec![Move::Pass, Move::Play(0)]);
    }

    #[test]
    fn test_comments_and_setup_are_skipped() {
        let sgf = "(;SZ[9]AB[aa][bb]C[not a move: B[cc\\]];B[ii])";
        let moves = parse_sgf_moves(sgf).unwrap();
        assert_eq!(moves, vec![Move::Play(80)]);
    }

    #[test]
    fn test_same_colour_twice_inserts_pass() {
        let moves = parse_sgf_moves("(;B[aa];B[bb];W[cc])").unwrap();
        assert_eq!(
            moves,
            vec![Move::Play(0), Move::Pass, Move::Play(N + 1), Move::Play(2 * N + 2)]
        );
        let moves = parse_sgf_moves("(;W[aa])").unwrap();
        assert_eq!(moves, vec![Move::Pass, Move::Play(0)]);
    }

    #[test]
    fn test_rejects_bad_records() {
        assert!(matches!(parse_sgf("(;SZ[19];B[aa])"), Err(GoError::InvalidRecord(_))));
        assert!(matches!(parse_sgf("(;B[zz])"), Err(GoError::InvalidRecord(_))));
        assert!(matches!(parse_sgf("(;B[jj])"), Err(GoError::InvalidRecord(_))));
        assert!(matches!(parse_sgf("(;B[aa"), Err(GoError::InvalidRecord(_))));
        assert!(matches!(parse_sgf("(;KM[lots])"), Err(GoError::InvalidRecord(_))));
    }

    #[test]
    fn test_replay_uses_record_komi() {
        let record = parse_sgf("(;KM[7.5];B[ee];W[dd])").unwrap();
        let board = record.replay(5.5).unwrap();
        assert_eq!(board.komi(), 7.5);
        assert_eq!(board.turn(), 2);
        assert_eq!(board.get(4 * N + 4), Some(Color::Black));
    }
}
