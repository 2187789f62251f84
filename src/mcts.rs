//! Monte Carlo Tree Search (MCTS) with UCB1 selection.
//!
//! Each rollout has four phases:
//! 1. Selection: descend from the root through expanded nodes, taking an
//!    unvisited child if there is one and the UCB1 maximiser otherwise
//! 2. Expansion: record the children of the leaf that was reached
//! 3. Simulation: play the game out from the leaf without recording it
//! 4. Backpropagation: add a visit and the reward to every node on the path
//!
//! Statistics are keyed by node equality, so a position reached by different
//! move orders accumulates a single set of statistics. A node's reward total
//! is kept from the point of view of the player who moved into it; choosing
//! the child with the best average therefore picks the best move for the
//! player at the root.

use std::collections::HashMap;
use std::hash::Hash;

use log::{debug, info, trace};

use crate::constants::{
    EXPLORATION_WEIGHT, N_ROLLOUTS, OPENING_ROLLOUTS, OPENING_TURNS, RESIGN_AFTER_TURN,
    RESIGN_THRES,
};
use crate::error::GoError;
use crate::playout::simulate;

/// What the search needs from a game position.
///
/// Rewards are in `[0, 1]` and always measured for the first player.
pub trait Node: Clone + Eq + Hash {
    fn is_terminal(&self) -> bool;

    /// Positions reachable in one move; empty for terminal nodes.
    fn children(&self) -> Vec<Self>;

    /// A single sampled successor for playouts, or `None` if the sampler
    /// found no move.
    fn random_child(&self, rng: &mut fastrand::Rng) -> Option<Self>;

    /// Final reward of a terminal node.
    fn reward(&self) -> Result<f64, GoError>;

    /// Reward of a non-terminal node where a playout had to stop.
    fn evaluate(&self) -> f64;

    /// A learned estimate that replaces the playout, if available.
    fn value_estimate(&self) -> Option<f64> {
        None
    }

    /// Whether the move leading to this node was made by the first player.
    fn moved_by_first_player(&self) -> bool;
}

/// Configuration for the search and the engine that drives it.
#[derive(Debug, Clone, PartialEq)]
pub struct MctsConfig {
    /// Rollouts per engine move.
    pub rollouts: usize,

    /// Rollouts per move while `turn < opening_turns`.
    pub opening_rollouts: usize,
    pub opening_turns: u32,

    /// Weight of the exploration term in UCB1.
    pub exploration_weight: f64,

    /// Seed for the rollout RNG. `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Winrate after the chosen move below which the engine resigns.
    pub resign_threshold: f64,
    /// No resignation at or before this turn.
    pub resign_after_turn: u32,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            rollouts: N_ROLLOUTS,
            opening_rollouts: OPENING_ROLLOUTS,
            opening_turns: OPENING_TURNS,
            exploration_weight: EXPLORATION_WEIGHT,
            seed: None,
            resign_threshold: RESIGN_THRES,
            resign_after_turn: RESIGN_AFTER_TURN,
        }
    }
}

impl MctsConfig {
    /// A small, seeded configuration for tests.
    pub fn for_testing() -> Self {
        Self {
            rollouts: 30,
            opening_rollouts: 30,
            opening_turns: 0,
            seed: Some(42),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_rollouts(mut self, rollouts: usize) -> Self {
        self.rollouts = rollouts;
        self
    }

    /// Number of rollouts to run for a move at `turn`.
    pub fn rollouts_for(&self, turn: u32) -> usize {
        if turn < self.opening_turns {
            self.opening_rollouts
        } else {
            self.rollouts
        }
    }

    /// Whether a player with `winrate` at `turn` should resign.
    pub fn should_resign(&self, turn: u32, winrate: f64) -> bool {
        turn > self.resign_after_turn && winrate < self.resign_threshold
    }
}

/// Search tree statistics for one session.
pub struct Mcts<S: Node> {
    children: HashMap<S, Vec<S>>,
    visits: HashMap<S, u32>,
    total_reward: HashMap<S, f64>,
    exploration_weight: f64,
    rng: fastrand::Rng,
}

impl<S: Node> Mcts<S> {
    pub fn new(config: &MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        Self {
            children: HashMap::new(),
            visits: HashMap::new(),
            total_reward: HashMap::new(),
            exploration_weight: config.exploration_weight,
            rng,
        }
    }

    /// Forget all statistics (e.g. when a new game starts).
    pub fn clear(&mut self) {
        self.children.clear();
        self.visits.clear();
        self.total_reward.clear();
    }

    /// Number of nodes with recorded statistics.
    pub fn tree_size(&self) -> usize {
        self.visits.len()
    }

    pub fn visits(&self, node: &S) -> u32 {
        self.visits.get(node).copied().unwrap_or(0)
    }

    pub fn total_reward(&self, node: &S) -> f64 {
        self.total_reward.get(node).copied().unwrap_or(0.0)
    }

    /// Recorded children of `node`, if it has been expanded.
    pub fn children_of(&self, node: &S) -> Option<&[S]> {
        self.children.get(node).map(Vec::as_slice)
    }

    /// Average reward of `node` for the player who moved into it.
    pub fn winrate(&self, node: &S) -> Option<f64> {
        match self.visits(node) {
            0 => None,
            v => Some(self.total_reward(node) / v as f64),
        }
    }

    /// Run `count` rollouts from `root`.
    pub fn run_rollouts(&mut self, root: &S, count: usize) -> Result<(), GoError> {
        for _ in 0..count {
            self.rollout(root)?;
        }
        debug!(
            "ran {count} rollouts: root visits {}, tree size {}",
            self.visits(root),
            self.tree_size()
        );
        Ok(())
    }

    /// One selection/expansion/simulation/backpropagation pass.
    pub fn rollout(&mut self, root: &S) -> Result<(), GoError> {
        let path = self.select(root);
        let leaf = path[path.len() - 1].clone();
        self.expand(&leaf);
        let reward = simulate(&leaf, &mut self.rng)?;
        trace!("rollout depth {}, reward {reward}", path.len());
        self.backpropagate(&path, reward);
        Ok(())
    }

    /// The child of `root` with the best average reward.
    ///
    /// # Errors
    /// [`GoError::NoChildren`] if `root` is terminal or was never expanded.
    pub fn choose(&self, root: &S) -> Result<S, GoError> {
        if root.is_terminal() {
            return Err(GoError::NoChildren);
        }
        let children = self
            .children
            .get(root)
            .filter(|c| !c.is_empty())
            .ok_or(GoError::NoChildren)?;

        first_max(children, |c| self.winrate(c).unwrap_or(f64::NEG_INFINITY))
            .cloned()
            .ok_or(GoError::NoChildren)
    }

    /// Descend to a leaf, returning the path from `root` to it.
    fn select<'a>(&'a self, root: &'a S) -> Vec<S> {
        let mut path = vec![root.clone()];
        let mut node = root;
        loop {
            let Some(children) = self.children.get(node) else {
                break;
            };
            if children.is_empty() {
                break;
            }
            if let Some(unvisited) = children.iter().find(|c| self.visits(c) == 0) {
                path.push(unvisited.clone());
                break;
            }
            let log_n = (self.visits(node) as f64).ln();
            let Some(best) = first_max(children, |c| self.ucb1(log_n, c)) else {
                break;
            };
            path.push(best.clone());
            node = best;
        }
        path
    }

    /// UCB1 score of a visited child.
    fn ucb1(&self, log_parent_visits: f64, child: &S) -> f64 {
        let n = self.visits(child) as f64;
        self.total_reward(child) / n + self.exploration_weight * (log_parent_visits / n).sqrt()
    }

    fn expand(&mut self, node: &S) {
        if node.is_terminal() || self.children.contains_key(node) {
            return;
        }
        let children = node.children();
        self.children.insert(node.clone(), children);
    }

    fn backpropagate(&mut self, path: &[S], reward: f64) {
        for node in path.iter().rev() {
            let value = if node.moved_by_first_player() {
                reward
            } else {
                1.0 - reward
            };
            *self.visits.entry(node.clone()).or_insert(0) += 1;
            *self.total_reward.entry(node.clone()).or_insert(0.0) += value;
        }
    }

    /// Log the statistics of every recorded child of `root`.
    pub fn dump_children(&self, root: &S, label: impl Fn(&S) -> String) {
        for child in self.children_of(root).unwrap_or_default() {
            info!(
                "move {} v={} w={:.1} wr={:.3}",
                label(child),
                self.visits(child),
                self.total_reward(child),
                self.winrate(child).unwrap_or(-0.1)
            );
        }
    }
}

/// The first item with the largest key; later ties lose.
fn first_max<'a, T>(items: &'a [T], key: impl Fn(&T) -> f64) -> Option<&'a T> {
    let mut best: Option<(&T, f64)> = None;
    for item in items {
        let k = key(item);
        if best.is_none_or(|(_, b)| k > b) {
            best = Some((item, k));
        }
    }
    best.map(|(item, _)| item)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A two-ply toy game: the first player picks 0 or 1, then the game
    /// ends. Picking 1 wins.
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Toy(Vec<u8>);

    impl Node for Toy {
        fn is_terminal(&self) -> bool {
            self.0.len() == 1
        }

        fn children(&self) -> Vec<Self> {
            if self.is_terminal() {
                return Vec::new();
            }
            vec![Toy(vec![0]), Toy(vec![1])]
        }

        fn random_child(&self, rng: &mut fastrand::Rng) -> Option<Self> {
            let mut c = self.children();
            if c.is_empty() {
                return None;
            }
            let i = rng.usize(..c.len());
            Some(c.swap_remove(i))
        }

        fn reward(&self) -> Result<f64, GoError> {
            match self.0.as_slice() {
                [m] => Ok(f64::from(*m)),
                _ => Err(GoError::NotTerminal),
            }
        }

        fn evaluate(&self) -> f64 {
            0.5
        }

        fn moved_by_first_player(&self) -> bool {
            self.0.len() % 2 == 1
        }
    }

    #[test]
    fn test_first_max_prefers_earliest() {
        let items = [1.0, 3.0, 3.0, 2.0];
        let best = first_max(&items, |&x| x).unwrap();
        assert!(std::ptr::eq(best, &items[1]));
        assert!(first_max(&[] as &[f64], |&x| x).is_none());
    }

    #[test]
    fn test_toy_game_picks_winning_move() {
        let mut tree = Mcts::new(&MctsConfig::for_testing());
        let root = Toy(Vec::new());
        tree.run_rollouts(&root, 20).unwrap();
        assert_eq!(tree.visits(&root), 20);
        assert_eq!(tree.choose(&root).unwrap(), Toy(vec![1]));
        assert_eq!(tree.winrate(&Toy(vec![1])), Some(1.0));
        assert_eq!(tree.winrate(&Toy(vec![0])), Some(0.0));
    }

    #[test]
    fn test_unvisited_children_are_tried_in_order() {
        let mut tree = Mcts::new(&MctsConfig::for_testing());
        let root = Toy(Vec::new());
        tree.run_rollouts(&root, 2).unwrap();
        assert_eq!(tree.visits(&Toy(vec![0])), 1);
        tree.run_rollouts(&root, 1).unwrap();
        assert_eq!(tree.visits(&Toy(vec![0])), 1);
        assert_eq!(tree.visits(&Toy(vec![1])), 1);
    }

    #[test]
    fn test_choose_errors() {
        let tree: Mcts<Toy> = Mcts::new(&MctsConfig::for_testing());
        assert_eq!(tree.choose(&Toy(Vec::new())), Err(GoError::NoChildren));
        assert_eq!(tree.choose(&Toy(vec![1])), Err(GoError::NoChildren));
    }

    #[test]
    fn test_clear_forgets_statistics() {
        let mut tree = Mcts::new(&MctsConfig::for_testing());
        let root = Toy(Vec::new());
        tree.run_rollouts(&root, 5).unwrap();
        assert!(tree.tree_size() > 0);
        tree.clear();
        assert_eq!(tree.tree_size(), 0);
        assert!(tree.children_of(&root).is_none());
    }

    #[test]
    fn test_config_helpers() {
        let config = MctsConfig::default();
        assert_eq!(config.rollouts_for(0), OPENING_ROLLOUTS);
        assert_eq!(config.rollouts_for(OPENING_TURNS), N_ROLLOUTS);
        assert!(!config.should_resign(RESIGN_AFTER_TURN, 0.0));
        assert!(config.should_resign(RESIGN_AFTER_TURN + 1, 0.05));
        assert!(!config.should_resign(RESIGN_AFTER_TURN + 1, 0.5));
        assert_eq!(config.clone().with_seed(3).seed, Some(3));
    }
}
