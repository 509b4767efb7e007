use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{trace, warn};

use crate::config::game::{MINIMAX_DEPTH, MINIMAX_SEARCH_BUDGET};
use crate::game::entities::{Player, PlayerFuture, PlayerState};
use crate::game::grid::Board;
use crate::game::systems::{AbsoluteDisplacement, Displacement};
use crate::game::types::{BoardSize, PlayerInfo, PlayerKind, Position, TileStatus};

use super::{vacant_neighbours, voronoi, AiView};

const WIN: i32 = 100_000;
const LOSS: i32 = -100_000;
const COLLISION: i32 = -50_000;

/// Looks a few moves ahead, assuming the opponent answers with its best move,
/// and scores the leaves by who controls more of the board.
pub struct MiniMaxAi {
    info: PlayerInfo,
    view: AiView,
    depth: u32,
}

impl MiniMaxAi {
    pub fn new(info: PlayerInfo, size: BoardSize) -> Self {
        Self::with_depth(info, size, search_depth(size, MINIMAX_DEPTH))
    }

    /// `depth` counts plies, one per side per move.
    pub fn with_depth(info: PlayerInfo, size: BoardSize, depth: u32) -> Self {
        Self {
            info,
            view: AiView::new(size),
            depth: depth.max(2),
        }
    }

    #[cfg(test)]
    fn choose(&self, own: Position, opponent: Option<Position>) -> Option<AbsoluteDisplacement> {
        search(self.view.board().clone(), own, opponent, self.depth, &AtomicBool::new(false))
    }
}

/// Deepest search, between 2 and `max_depth` plies, that fits the budget on a board of `size`.
pub fn search_depth(size: BoardSize, max_depth: u32) -> u32 {
    let tiles = (size.rows * size.columns).max(1);
    let mut depth = max_depth.max(2);
    while depth > 2 && tiles.saturating_mul(5usize.saturating_pow(depth)) > MINIMAX_SEARCH_BUDGET {
        depth -= 1;
    }
    depth
}

/// Set when the pending move is dropped, so an abandoned search stops early.
#[derive(Default)]
struct CancelOnDrop(Arc<AtomicBool>);

impl CancelOnDrop {
    fn flag(&self) -> Arc<AtomicBool> {
        self.0.clone()
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

fn search(
    mut board: Board,
    own: Position,
    opponent: Option<Position>,
    depth: u32,
    cancelled: &AtomicBool,
) -> Option<AbsoluteDisplacement> {
    let mut best: Option<(i32, AbsoluteDisplacement)> = None;

    for (direction, next) in vacant_neighbours(&board, own) {
        board.set_tile_status(next, TileStatus::Taken);
        let score = match opponent {
            Some(opponent) => opponent_reply(&mut board, next, opponent, depth - 1, cancelled),
            None => voronoi(&board, next, None).score(),
        };
        board.set_tile_status(next, TileStatus::Vacant);

        trace!("[MiniMaxAi] {:?} scores {}", direction, score);
        if best.is_none_or(|(best_score, _)| score > best_score) {
            best = Some((score, direction));
        }
    }
    best.map(|(_, direction)| direction)
}

/// Our move, maximising.
fn own_move(board: &mut Board, own: Position, opponent: Position, depth: u32, cancelled: &AtomicBool) -> i32 {
    if cancelled.load(Ordering::Relaxed) {
        return 0;
    }
    if depth == 0 {
        return voronoi(board, own, Some(opponent)).score();
    }

    let moves = vacant_neighbours(board, own);
    if moves.is_empty() {
        return LOSS;
    }

    let mut best = i32::MIN;
    for (_, next) in moves {
        board.set_tile_status(next, TileStatus::Taken);
        best = best.max(opponent_reply(board, next, opponent, depth - 1, cancelled));
        board.set_tile_status(next, TileStatus::Vacant);
    }
    best
}

/// Opponent's answer to our move onto `own`, minimising. Landing on the tile we
/// just claimed means both moved there at once.
fn opponent_reply(board: &mut Board, own: Position, opponent: Position, depth: u32, cancelled: &AtomicBool) -> i32 {
    if cancelled.load(Ordering::Relaxed) {
        return 0;
    }
    if depth == 0 {
        return voronoi(board, own, Some(opponent)).score();
    }

    let mut moves: Vec<Position> = vacant_neighbours(board, opponent)
        .into_iter()
        .map(|(_, next)| next)
        .collect();
    if AbsoluteDisplacement::between(opponent, own).is_some() {
        moves.push(own);
    }
    if moves.is_empty() {
        return WIN;
    }

    let mut worst = i32::MAX;
    for next in moves {
        let score = if next == own {
            COLLISION
        } else {
            board.set_tile_status(next, TileStatus::Taken);
            let score = own_move(board, own, next, depth - 1, cancelled);
            board.set_tile_status(next, TileStatus::Vacant);
            score
        };
        worst = worst.min(score);
    }
    worst
}

impl Player for MiniMaxAi {
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

    /// The search runs on the blocking pool. Dropping the returned future
    /// (the engine timed out) stops it.
    fn next_move(&mut self, state: PlayerState) -> PlayerFuture<'_, Displacement> {
        self.view.observe(&state);
        let board = self.view.board().clone();
        let (own, opponent, depth) = (state.player_position, state.opponent_position, self.depth);
        let cancel = CancelOnDrop::default();
        let cancelled = cancel.flag();
        let pending = tokio::task::spawn_blocking(move || search(board, own, opponent, depth, &cancelled));

        Box::pin(async move {
            let _cancel = cancel;
            let movement = match pending.await {
                Ok(Some(direction)) => self.view.turn_to(direction),
                Ok(None) => Displacement::default(),
                Err(error) => {
                    warn!("[MiniMaxAi] {}: search task failed: {}", self.info.id, error);
                    Displacement::default()
                }
            };
            trace!("[MiniMaxAi] {} heading {:?} -> {:?}", self.info.id, self.view.heading(), movement);
            movement
        })
    }
}
