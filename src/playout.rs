//! Monte Carlo playouts (the simulation phase of a rollout).
//!
//! A playout follows random (or policy-guided) moves from a leaf until the
//! game ends, then reports the result for the first player. Positions
//! visited by a playout are not added to the search tree.

use log::trace;

use crate::error::GoError;
use crate::mcts::Node;

/// Play out the game from `leaf` and return the first player's reward.
///
/// If the node carries a value estimate, that estimate is returned without
/// playing. If the sampler finds no move before the game ends, the position
/// reached is evaluated as it stands.
pub fn simulate<S: Node>(leaf: &S, rng: &mut fastrand::Rng) -> Result<f64, GoError> {
    if let Some(value) = leaf.value_estimate() {
        return Ok(value);
    }

    let mut node = leaf.clone();
    let mut plies = 0usize;
    loop {
        if node.is_terminal() {
            let reward = node.reward()?;
            trace!("playout finished after {plies} plies, reward {reward}");
            return Ok(reward);
        }
        match node.random_child(rng) {
            Some(next) => {
                node = next;
                plies += 1;
            }
            None => {
                trace!("playout ran out of moves after {plies} plies");
                return Ok(node.evaluate());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::constants::NN;
    use crate::node::SearchNode;
    use crate::policy::Policy;
    use std::sync::Arc;

    struct Oracle(f64);

    impl Policy for Oracle {
        fn distribution(&self, _board: &Board) -> [f32; NN] {
            [1.0; NN]
        }

        fn value(&self, _board: &Board) -> Option<f64> {
            Some(self.0)
        }
    }

    struct Nowhere;

    impl Policy for Nowhere {
        fn distribution(&self, _board: &Board) -> [f32; NN] {
            [0.0; NN]
        }
    }

    #[test]
    fn test_playout_reaches_terminal() {
        let mut rng = fastrand::Rng::with_seed(42);
        let leaf = SearchNode::new(Board::new());
        let reward = simulate(&leaf, &mut rng).unwrap();
        assert!(reward == 0.0 || reward == 1.0);
    }

    #[test]
    fn test_playout_is_reproducible() {
        let leaf = SearchNode::new(Board::new());
        let a = simulate(&leaf, &mut fastrand::Rng::with_seed(9)).unwrap();
        let b = simulate(&leaf, &mut fastrand::Rng::with_seed(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_value_estimate_short_circuits() {
        let mut rng = fastrand::Rng::with_seed(1);
        let leaf = SearchNode::with_policy(Board::new(), Arc::new(Oracle(0.75)));
        assert_eq!(simulate(&leaf, &mut rng).unwrap(), 0.75);
    }

    #[test]
    fn test_dead_end_is_scored() {
        // A policy with no mass never yields a move; the empty board is a
        // loss for Black on komi.
        let mut rng = fastrand::Rng::with_seed(1);
        let leaf = SearchNode::with_policy(Board::new(), Arc::new(Nowhere));
        assert_eq!(simulate(&leaf, &mut rng).unwrap(), 0.0);
    }
}
