//! Policy/value collaborator interface.
//!
//! A policy biases move sampling during simulations and may also supply a
//! position value used in place of a random rollout. How the numbers are
//! produced (a trained network, a heuristic, a table) is up to the
//! implementation; the search only sees this trait.

use crate::board::Board;
use crate::constants::NN;

/// Move weights and an optional position value for a board.
pub trait Policy: Send + Sync {
    /// Non-negative weights over the 81 cells for the player to move.
    ///
    /// Weights need not be normalised. Illegal cells may carry weight; the
    /// sampler rejects them.
    fn distribution(&self, board: &Board) -> [f32; NN];

    /// Estimated probability that Black wins from `board`, if known.
    fn value(&self, _board: &Board) -> Option<f64> {
        None
    }
}

/// Draw a cell index from `weights` (roulette-wheel selection).
///
/// Returns `None` when every weight is zero, negative, or not finite.
pub fn sample_index(weights: &[f32; NN], rng: &mut fastrand::Rng) -> Option<usize> {
    let usable = |w: f32| w.is_finite() && w > 0.0;
    let total: f32 = weights.iter().copied().filter(|&w| usable(w)).sum();
    if total <= 0.0 {
        return None;
    }

    let mut target = rng.f32() * total;
    let mut last = None;
    for (i, &w) in weights.iter().enumerate() {
        if !usable(w) {
            continue;
        }
        if target < w {
            return Some(i);
        }
        target -= w;
        last = Some(i);
    }
    // Rounding can leave a sliver of mass past the final weight.
    last
}
