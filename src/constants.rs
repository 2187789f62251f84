//! Constants for board dimensions, search parameters, and engine policy.
//!
//! The board is a flat array of `N * N` cells in row-major order. Row 0 is
//! the top row as printed, which is row `N` in GTP notation.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). Only 9x9 is supported.
pub const N: usize = 9;

/// Number of playable cells.
pub const NN: usize = N * N;

/// Star points (hoshi) marked on an empty board when printed.
pub const STAR_POINTS: [usize; 5] = [20, 24, 40, 56, 60];

/// Column labels in GTP order (no 'I').
pub const COLUMN_LABELS: &[u8; N] = b"ABCDEFGHJ";

// =============================================================================
// Game Parameters
// =============================================================================

/// Default compensation for White.
pub const DEFAULT_KOMI: f64 = 5.5;

/// A search node is terminal once the turn count exceeds this cap.
pub const MAX_TURNS: u32 = 60;

// =============================================================================
// MCTS Parameters
// =============================================================================

/// Default exploration weight for UCB1.
pub const EXPLORATION_WEIGHT: f64 = 0.5;

/// Default number of rollouts per engine move.
pub const N_ROLLOUTS: usize = 100;

/// Rollouts used while the game is still in its opening.
pub const OPENING_ROLLOUTS: usize = 13;

/// Turns that count as the opening for `OPENING_ROLLOUTS`.
pub const OPENING_TURNS: u32 = 12;

/// Number of policy draws before a sampler gives up on finding a legal move.
pub const POLICY_ATTEMPTS: usize = 16;

// =============================================================================
// Resignation
// =============================================================================

/// Winrate below which the engine resigns.
pub const RESIGN_THRES: f64 = 0.1;

/// The engine never resigns before this turn.
pub const RESIGN_AFTER_TURN: u32 = 40;
