//! Boke-Go: a 9x9 Go engine built on Monte Carlo Tree Search.
//!
//! The crate has two halves. The rules engine ([`board`], [`group`],
//! [`coord`]) implements legal moves, captures, ko, and area scoring on
//! immutable boards. The search engine ([`mcts`], [`node`], [`playout`])
//! runs UCB1 tree search over positions wrapped as search nodes.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions and engine parameters
//! - [`coord`] - Cell indices, moves, and GTP vertices
//! - [`group`] - Flood fill for groups, liberties, and regions
//! - [`board`] - Immutable board and rules
//! - [`policy`] - Interface for an external move policy / value estimate
//! - [`node`] - Adapter exposing a board to the search
//! - [`playout`] - Rollout simulation
//! - [`mcts`] - Tree search engine
//! - [`record`] - SGF game-record import
//! - [`gtp`] - Go Text Protocol front end
//!
//! ## Example
//!
//! ```
//! use boke_go::board::Board;
//! use boke_go::coord::parse_coord;
//! use boke_go::mcts::{Mcts, MctsConfig};
//! use boke_go::node::SearchNode;
//!
//! // Black opens at the centre
//! let board = Board::new().play(parse_coord("E5").unwrap()).unwrap();
//!
//! // Search for White's reply
//! let root = SearchNode::new(board);
//! let mut tree = Mcts::new(&MctsConfig::default().with_seed(1));
//! tree.run_rollouts(&root, 20).unwrap();
//! let reply = tree.choose(&root).unwrap();
//! println!("White plays {}", reply.board().last_move().unwrap());
//! ```

pub mod board;
pub mod constants;
pub mod coord;
pub mod error;
pub mod group;
pub mod gtp;
pub mod mcts;
pub mod node;
pub mod playout;
pub mod policy;
pub mod record;

pub use error::GoError;
