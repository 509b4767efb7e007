use log::trace;

use crate::game::entities::{Player, PlayerFuture, PlayerState};
use crate::game::grid::Board;
use crate::game::systems::{AbsoluteDisplacement, Displacement};
use crate::game::types::{BoardSize, PlayerInfo, PlayerKind, Position, TileStatus};

use super::AiView;

/// Steers towards the vacant neighbour that is most enclosed, so it keeps
/// running along walls and trails.
pub struct WallHuggerAi {
    info: PlayerInfo,
    view: AiView,
}

impl WallHuggerAi {
    pub fn new(info: PlayerInfo, size: BoardSize) -> Self {
        Self {
            info,
            view: AiView::new(size),
        }
    }

    fn choose(&self, position: Position) -> Option<AbsoluteDisplacement> {
        self.view
            .vacant_neighbours(position)
            .into_iter()
            .max_by_key(|(_, neighbour)| blocked_neighbours(self.view.board(), *neighbour))
            .map(|(direction, _)| direction)
    }
}

fn blocked_neighbours(board: &Board, position: Position) -> usize {
    AbsoluteDisplacement::ALL
        .into_iter()
        .filter(|direction| board.status(direction.apply(position)) != TileStatus::Vacant)
        .count()
}

impl Player for WallHuggerAi {
    fn info(&self) -> &PlayerInfo {
        &self.info
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Ai
    }

    fn setup(&mut self, state: PlayerState) -> PlayerFuture<'_, ()> {
        self.view.reset(&state);
        Box::pin(async {})
    }

    fn next_move(&mut self, state: PlayerState) -> PlayerFuture<'_, Displacement> {
        self.view.observe(&state);
        let movement = match self.choose(state.player_position) {
            Some(direction) => self.view.turn_to(direction),
            None => Displacement::default(),
        };
        trace!("[WallHuggerAi] {} -> {:?}", self.info.id, movement);
        Box::pin(async move { movement })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::systems::RelativeDisplacement;

    fn ai(rows: usize, columns: usize) -> WallHuggerAi {
        WallHuggerAi::new(PlayerInfo::new("bot", "WallHuggerAI 1"), BoardSize { rows, columns })
    }

    #[tokio::test]
    async fn trapped_ai_keeps_going() {
        let mut ai = ai(1, 3);
        let start = PlayerState::new(Position::new(1, 2), vec![Position::new(1, 1)]);
        ai.setup(start).await;
        let state = PlayerState::new(Position::new(1, 2), vec![Position::new(1, 3)]);
        assert_eq!(ai.next_move(state).await, Displacement::default());
    }

    #[tokio::test]
    async fn hugs_the_top_wall_when_starting_in_a_corner() {
        let mut ai = ai(5, 6);
        let start = PlayerState::new(Position::new(1, 1), vec![Position::new(5, 6)]);
        ai.setup(start.clone()).await;

        // (1, 2) has the top wall and our head around it, (2, 1) only the left wall and our head.
        let movement = ai.next_move(start).await;
        assert_eq!(movement, Displacement::Relative(RelativeDisplacement::KeepGoing));
    }

    #[tokio::test]
    async fn chosen_move_is_always_vacant() {
        let mut ai = ai(4, 5);
        let mut position = Position::new(1, 1);
        let mut board = Board::new(4, 5);
        board.set_tile_status(position, TileStatus::Taken);
        ai.setup(PlayerState::new(position, vec![])).await;

        let mut heading = AbsoluteDisplacement::Right;
        for _ in 0..6 {
            let Displacement::Relative(turn) = ai.next_move(PlayerState::new(position, vec![])).await else {
                panic!("wall hugger answers with relative turns");
            };
            let direction = heading.rotate(turn.offset());
            let next = direction.apply(position);
            assert!(board.check_position_validity(next), "{next:?} should be vacant");
            board.set_tile_status(next, TileStatus::Taken);
            position = next;
            heading = direction;
        }
    }
}
