//! Connected-component analysis over board cells.
//!
//! A flood fill from a seed cell collects every orthogonally connected cell in
//! the same state (same colour, or empty) together with the distinct cells
//! that border the component. Capture detection counts the empty boundary
//! cells of a stone group; scoring inspects the colours bordering an empty
//! region.

use crate::board::Cell;
use crate::constants::NN;
use crate::coord::{Point, neighbors};

/// A maximal connected component and its boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// Cells in the component, in discovery order.
    pub stones: Vec<Point>,
    /// Distinct adjacent cells in a different state.
    pub boundary: Vec<Point>,
}

impl Group {
    /// Number of boundary cells that are empty.
    pub fn liberties(&self, cells: &[Cell; NN]) -> usize {
        self.boundary.iter().filter(|&&b| cells[b].is_none()).count()
    }

    pub fn len(&self) -> usize {
        self.stones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stones.is_empty()
    }
}

/// Collect the component containing `start` and its boundary.
pub fn flood_fill(cells: &[Cell; NN], start: Point) -> Group {
    let state = cells[start];
    let mut stack = vec![start];
    let mut visited = [false; NN];
    let mut on_boundary = [false; NN];
    let mut stones = Vec::new();
    let mut boundary = Vec::new();

    visited[start] = true;
    while let Some(pt) = stack.pop() {
        stones.push(pt);
        for n in neighbors(pt) {
            if cells[n] == state {
                if !visited[n] {
                    visited[n] = true;
                    stack.push(n);
                }
            } else if !on_boundary[n] {
                on_boundary[n] = true;
                boundary.push(n);
            }
        }
    }

    Group { stones, boundary }
}

/// Count the liberties of the group containing `start`.
///
/// Returns 0 for an empty cell.
pub fn group_liberties(cells: &[Cell; NN], start: Point) -> usize {
    if cells[start].is_none() {
        return 0;
    }
    flood_fill(cells, start).liberties(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Color;

    fn cells_with(black: &[Point], white: &[Point]) -> [Cell; NN] {
        let mut cells = [None; NN];
        for &b in black {
            cells[b] = Some(Color::Black);
        }
        for &w in white {
            cells[w] = Some(Color::White);
        }
        cells
    }

    #[test]
    fn test_single_stone_liberties() {
        let cells = cells_with(&[40], &[]);
        assert_eq!(group_liberties(&cells, 40), 4);
        let corner = cells_with(&[0], &[]);
        assert_eq!(group_liberties(&corner, 0), 2);
    }

    #[test]
    fn test_chain_shares_liberties() {
        // Two stones side by side in the middle: 6 distinct liberties.
        let cells = cells_with(&[40, 41], &[]);
        let group = flood_fill(&cells, 40);
        assert_eq!(group.len(), 2);
        assert_eq!(group.liberties(&cells), 6);
    }

    #[test]
    fn test_boundary_is_distinct() {
        // An L shape whose inner corner touches both stones counts once.
        let cells = cells_with(&[0, 1, 9], &[]);
        let group = flood_fill(&cells, 0);
        assert_eq!(group.len(), 3);
        assert_eq!(group.boundary.len(), 3);
        assert!(group.boundary.contains(&10));
    }

    #[test]
    fn test_opponent_stones_remove_liberties() {
        let cells = cells_with(&[40], &[31, 41, 49]);
        assert_eq!(group_liberties(&cells, 40), 1);
        let group = flood_fill(&cells, 40);
        assert_eq!(group.boundary.len(), 4);
    }

    #[test]
    fn test_empty_region_fill() {
        let cells = cells_with(&[], &[]);
        let region = flood_fill(&cells, 0);
        assert_eq!(region.len(), NN);
        assert!(region.boundary.is_empty());
        assert_eq!(group_liberties(&cells, 0), 0);
    }
}
