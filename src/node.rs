//! Search-node adapter: exposes a [`Board`] to the tree search.
//!
//! A [`SearchNode`] wraps a board and answers the questions the search asks:
//! is the game over, which positions follow, which move would a rollout play,
//! and who won. Nodes compare and hash by position (cells, ko point, turn,
//! trailing passes), so move orders that transpose into the same position
//! share statistics in the search tree.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::board::{Board, Cell, Color};
use crate::constants::{MAX_TURNS, NN, POLICY_ATTEMPTS};
use crate::coord::{Move, Point};
use crate::error::GoError;
use crate::mcts::Node;
use crate::policy::{Policy, sample_index};

/// Identity of a position for the search tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PositionKey {
    cells: [Cell; NN],
    ko: Option<Point>,
    turn: u32,
    passes: u8,
}

impl PositionKey {
    fn of(board: &Board) -> Self {
        PositionKey {
            cells: *board.cells(),
            ko: board.ko_point(),
            turn: board.turn(),
            passes: board.trailing_passes().min(2) as u8,
        }
    }
}

/// A board position as seen by the search engine.
#[derive(Clone)]
pub struct SearchNode {
    board: Board,
    key: PositionKey,
    policy: Option<Arc<dyn Policy>>,
    legal: OnceLock<Vec<Point>>,
}

impl SearchNode {
    /// A node for `board` with uniform move sampling.
    pub fn new(board: Board) -> Self {
        let key = PositionKey::of(&board);
        SearchNode {
            board,
            key,
            policy: None,
            legal: OnceLock::new(),
        }
    }

    /// A node whose rollouts sample moves from `policy`.
    pub fn with_policy(board: Board, policy: Arc<dyn Policy>) -> Self {
        let mut node = Self::new(board);
        node.policy = Some(policy);
        node
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Color {
        self.board.to_move()
    }

    pub fn policy(&self) -> Option<&Arc<dyn Policy>> {
        self.policy.as_ref()
    }

    /// Play `mv` and wrap the result, keeping this node's policy.
    pub fn apply_move(&self, mv: Move) -> Result<SearchNode, GoError> {
        let board = self.board.play(mv)?;
        let mut child = SearchNode::new(board);
        child.policy = self.policy.clone();
        Ok(child)
    }

    /// Whether the game at this node is over.
    ///
    /// The turn cap stands in for resignation and end-of-game detection; two
    /// consecutive passes also end the game.
    pub fn is_terminal(&self) -> bool {
        self.board.turn() > MAX_TURNS || self.board.trailing_passes() >= 2
    }

    /// Every cell where the player to move may legally play.
    ///
    /// Computed once per node.
    pub fn legal_moves(&self) -> &[Point] {
        self.legal
            .get_or_init(|| (0..NN).filter(|&pt| self.board.is_legal(pt)).collect())
    }

    /// One node per legal move; empty for terminal nodes.
    pub fn children(&self) -> Vec<SearchNode> {
        if self.is_terminal() {
            return Vec::new();
        }
        self.legal_moves()
            .iter()
            .filter_map(|&pt| self.apply_move(Move::Play(pt)).ok())
            .collect()
    }

    /// Draw a legal move for a rollout.
    ///
    /// With a policy attached, moves are drawn from its distribution and
    /// illegal draws are retried up to `POLICY_ATTEMPTS` times. Without one,
    /// the move is uniform over the legal moves. `None` means no move was
    /// found, not that the position breaks a rule.
    pub fn sample_move(&self, rng: &mut fastrand::Rng) -> Option<Point> {
        if self.is_terminal() {
            return None;
        }
        match &self.policy {
            Some(policy) => {
                let weights = policy.distribution(&self.board);
                (0..POLICY_ATTEMPTS)
                    .map_while(|_| sample_index(&weights, rng))
                    .find(|&pt| self.board.is_legal(pt))
            }
            None => self.sample_uniform(rng),
        }
    }

    fn sample_uniform(&self, rng: &mut fastrand::Rng) -> Option<Point> {
        if let Some(legal) = self.legal.get() {
            return (!legal.is_empty()).then(|| legal[rng.usize(..legal.len())]);
        }

        let mut candidates: Vec<Point> = (0..NN)
            .filter(|&pt| self.board.get(pt).is_none() && self.board.ko_point() != Some(pt))
            .collect();

        // Partial Fisher-Yates: test candidates in random order until one is legal.
        let n = candidates.len();
        for i in 0..n {
            let j = rng.usize(i..n);
            candidates.swap(i, j);
            if self.board.is_legal(candidates[i]) {
                return Some(candidates[i]);
            }
        }
        None
    }

    /// 1.0 if the position's score favours Black, else 0.0.
    pub fn outcome(&self) -> f64 {
        if self.board.score() > 0.0 { 1.0 } else { 0.0 }
    }

    /// The final result for Black.
    ///
    /// # Errors
    /// [`GoError::NotTerminal`] if the game is not over.
    pub fn reward(&self) -> Result<f64, GoError> {
        if !self.is_terminal() {
            return Err(GoError::NotTerminal);
        }
        Ok(self.outcome())
    }
}

impl PartialEq for SearchNode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for SearchNode {}

impl Hash for SearchNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl fmt::Debug for SearchNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchNode")
            .field("turn", &self.board.turn())
            .field("last_move", &self.board.last_move())
            .field("terminal", &self.is_terminal())
            .field("policy", &self.policy.is_some())
            .finish()
    }
}

impl Node for SearchNode {
    fn is_terminal(&self) -> bool {
        SearchNode::is_terminal(self)
    }

    fn children(&self) -> Vec<Self> {
        SearchNode::children(self)
    }

    fn random_child(&self, rng: &mut fastrand::Rng) -> Option<Self> {
        let pt = self.sample_move(rng)?;
        self.apply_move(Move::Play(pt)).ok()
    }

    fn reward(&self) -> Result<f64, GoError> {
        SearchNode::reward(self)
    }

    fn evaluate(&self) -> f64 {
        self.outcome()
    }

    fn value_estimate(&self) -> Option<f64> {
        self.policy.as_ref().and_then(|p| p.value(&self.board))
    }

    fn moved_by_first_player(&self) -> bool {
        self.to_move() == Color::White
    }
}
