use std::collections::HashSet;

use crate::game::grid::Board;
use crate::game::types::Position;

use super::vacant_neighbours;

/// Tiles each side reaches strictly first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Territory {
    pub own: usize,
    pub opponent: usize,
}

impl Territory {
    pub fn score(&self) -> i32 {
        self.own as i32 - self.opponent as i32
    }
}

/// Expand both heads one layer at a time. A vacant tile reached by both sides
/// in the same layer counts for nobody; heads themselves are not counted.
pub fn voronoi(board: &Board, own: Position, opponent: Option<Position>) -> Territory {
    let mut seen: HashSet<Position> = HashSet::new();
    seen.insert(own);
    let mut own_frontier = vec![own];
    let mut opponent_frontier = Vec::new();
    if let Some(opponent) = opponent {
        seen.insert(opponent);
        opponent_frontier.push(opponent);
    }

    let mut territory = Territory::default();
    while !own_frontier.is_empty() || !opponent_frontier.is_empty() {
        let own_layer = expand(board, &own_frontier, &seen);
        let opponent_layer = expand(board, &opponent_frontier, &seen);

        own_frontier = Vec::new();
        for position in &own_layer {
            if !opponent_layer.contains(position) {
                own_frontier.push(*position);
            }
        }
        opponent_frontier = Vec::new();
        for position in &opponent_layer {
            if !own_layer.contains(position) {
                opponent_frontier.push(*position);
            }
        }

        territory.own += own_frontier.len();
        territory.opponent += opponent_frontier.len();
        seen.extend(own_layer);
        seen.extend(opponent_layer);
    }
    territory
}

fn expand(board: &Board, frontier: &[Position], seen: &HashSet<Position>) -> HashSet<Position> {
    frontier
        .iter()
        .flat_map(|position| vacant_neighbours(board, *position))
        .map(|(_, neighbour)| neighbour)
        .filter(|neighbour| !seen.contains(neighbour))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::TileStatus;

    #[test]
    fn lone_head_owns_its_whole_region() {
        let mut board = Board::new(3, 3);
        let head = Position::new(1, 1);
        board.set_tile_status(head, TileStatus::Taken);
        // 3 + 2 + 3 playable tiles, minus the head.
        assert_eq!(voronoi(&board, head, None), Territory { own: 7, opponent: 0 });
    }

    #[test]
    fn symmetric_heads_split_the_row() {
        let mut board = Board::new(1, 5);
        let (own, opponent) = (Position::new(1, 1), Position::new(1, 5));
        board.set_tile_status(own, TileStatus::Taken);
        board.set_tile_status(opponent, TileStatus::Taken);

        let territory = voronoi(&board, own, Some(opponent));
        assert_eq!(territory, Territory { own: 1, opponent: 1 });
        assert_eq!(territory.score(), 0);
    }

    #[test]
    fn closer_head_wins_more_tiles() {
        let mut board = Board::new(1, 6);
        let (own, opponent) = (Position::new(1, 2), Position::new(1, 6));
        board.set_tile_status(own, TileStatus::Taken);
        board.set_tile_status(opponent, TileStatus::Taken);

        // Column 1 and 3 go to us, 5 to them, 4 is contested.
        let territory = voronoi(&board, own, Some(opponent));
        assert_eq!(territory, Territory { own: 2, opponent: 1 });
    }

    #[test]
    fn walled_in_head_owns_nothing() {
        let mut board = Board::new(1, 3);
        let head = Position::new(1, 2);
        board.set_tile_status(Position::new(1, 1), TileStatus::Taken);
        board.set_tile_status(head, TileStatus::Taken);
        board.set_tile_status(Position::new(1, 3), TileStatus::Taken);
        assert_eq!(voronoi(&board, head, None), Territory::default());
    }
}
