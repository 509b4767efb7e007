//! Computer-controlled players.
//!
//! Every AI keeps its own copy of the board, rebuilt from the positions it is
//! shown each tick, and answers with a relative turn like a human would.

pub mod minimax;
pub mod voronoi;
pub mod wall_hugger;

pub use minimax::*;
pub use voronoi::*;
pub use wall_hugger::*;

use serde::{Serialize, Deserialize};

use crate::game::entities::{Player, PlayerState};
use crate::game::grid::Board;
use crate::game::systems::{initial_heading, AbsoluteDisplacement, Displacement, RelativeDisplacement};
use crate::game::types::{BoardSize, PlayerInfo, Position, TileStatus};

/// Which AI fills empty seats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AiStrategy {
    #[default]
    #[serde(alias = "minimax")]
    MiniMax,
    #[serde(alias = "wallhugger")]
    WallHugger,
}

impl AiStrategy {
    pub fn build(self, info: PlayerInfo, size: BoardSize) -> Box<dyn Player> {
        match self {
            AiStrategy::MiniMax => Box::new(MiniMaxAi::new(info, size)),
            AiStrategy::WallHugger => Box::new(WallHuggerAi::new(info, size)),
        }
    }

    /// Display name prefix for generated seats.
    pub fn label(self) -> &'static str {
        match self {
            AiStrategy::MiniMax => "MiniMaxAI",
            AiStrategy::WallHugger => "WallHuggerAI",
        }
    }
}

/// What an AI knows about the current round.
#[derive(Debug, Clone)]
pub struct AiView {
    board: Board,
    previous: Option<Position>,
    heading: AbsoluteDisplacement,
}

impl AiView {
    pub fn new(size: BoardSize) -> Self {
        Self {
            board: Board::with_size(size),
            previous: None,
            heading: AbsoluteDisplacement::Right,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn heading(&self) -> AbsoluteDisplacement {
        self.heading
    }

    /// Forget the previous round.
    pub fn reset(&mut self, state: &PlayerState) {
        self.board.initialize();
        self.previous = None;
        self.observe(state);
    }

    /// Mark every visible head as taken and update our own heading.
    pub fn observe(&mut self, state: &PlayerState) {
        let current = state.player_position;
        for position in std::iter::once(current).chain(state.other_positions.iter().copied()) {
            self.board.set_tile_status(position, TileStatus::Taken);
        }

        self.heading = match self.previous {
            // Same tile twice or a jump keeps what we had.
            Some(previous) => AbsoluteDisplacement::between(previous, current).unwrap_or(self.heading),
            None => initial_heading(current),
        };
        self.previous = Some(current);
    }

    /// Neighbours a move could land on right now.
    pub fn vacant_neighbours(&self, position: Position) -> Vec<(AbsoluteDisplacement, Position)> {
        vacant_neighbours(&self.board, position)
    }

    /// Express a chosen direction as a turn from the current heading.
    pub fn turn_to(&self, direction: AbsoluteDisplacement) -> Displacement {
        RelativeDisplacement::between(self.heading, direction)
            .map(Displacement::Relative)
            .unwrap_or_default()
    }
}

pub fn vacant_neighbours(board: &Board, position: Position) -> Vec<(AbsoluteDisplacement, Position)> {
    AbsoluteDisplacement::ALL
        .into_iter()
        .map(|direction| (direction, direction.apply(position)))
        .filter(|(_, neighbour)| board.check_position_validity(*neighbour))
        .collect()
}
