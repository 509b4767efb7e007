use std::collections::{HashMap, HashSet};

use log::debug;
use rand::Rng;

use crate::config::game::MAX_PLAYERS;
use crate::error::GameError;
use crate::game::entities::{share, Player, SharedPlayer};
use crate::game::grid::Board;
use crate::game::types::{GameType, PlayerId, PlayerInfo, PlayerKind, Position};

/// One seat of the roster.
#[derive(Clone)]
pub struct PlayerEntry {
    pub info: PlayerInfo,
    pub kind: PlayerKind,
    pub handle: SharedPlayer,
}

impl PlayerEntry {
    pub fn new(player: Box<dyn Player>) -> Self {
        Self {
            info: player.info().clone(),
            kind: player.kind(),
            handle: share(player),
        }
    }

    pub fn id(&self) -> &PlayerId {
        &self.info.id
    }
}

impl std::fmt::Debug for PlayerEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerEntry")
            .field("info", &self.info)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// One match: board, roster, positions and round counter.
#[derive(Debug)]
pub struct Game {
    game_type: GameType,
    board: Board,
    players: Vec<PlayerEntry>,
    players_positions: HashMap<PlayerId, Position>,
    rounds_count: u32,
    current_round: u32,
}

impl Game {
    pub fn new(
        game_type: GameType,
        rows: usize,
        columns: usize,
        players: Vec<PlayerEntry>,
        rounds_count: u32,
    ) -> Result<Self, GameError> {
        if players.is_empty() || players.len() > MAX_PLAYERS {
            return Err(GameError::UnsupportedPlayersCount(players.len()));
        }

        let mut seen = HashSet::new();
        for entry in &players {
            if !seen.insert(entry.id().clone()) {
                return Err(GameError::DuplicatePlayer(entry.id().clone()));
            }
        }

        let board = Board::new(rows, columns);
        if eligible_anchors(&board, players.len()).is_empty() {
            return Err(GameError::BoardTooSmall {
                rows,
                columns,
                players: players.len(),
            });
        }

        Ok(Self {
            game_type,
            board,
            players,
            players_positions: HashMap::new(),
            rounds_count,
            current_round: 0,
        })
    }

    pub fn game_type(&self) -> GameType {
        self.game_type
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Roster in seating order.
    pub fn players(&self) -> &[PlayerEntry] {
        &self.players
    }

    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|entry| entry.id().clone()).collect()
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerEntry> {
        self.players.iter().find(|entry| entry.id() == player_id)
    }

    pub fn player_position(&self, player_id: &str) -> Option<Position> {
        self.players_positions.get(player_id).copied()
    }

    pub fn players_positions(&self) -> &HashMap<PlayerId, Position> {
        &self.players_positions
    }

    pub fn rounds_count(&self) -> u32 {
        self.rounds_count
    }

    /// Zero-based index of the round being played.
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn advance_round(&mut self) {
        self.current_round += 1;
    }

    /// Move a player and claim the tile. The tile must be playable.
    pub fn set_player_position(&mut self, player_id: &str, position: Position) -> Result<(), GameError> {
        let entry = self
            .player(player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        if !self.board.is_in_bounds(position) {
            return Err(GameError::InvalidPosition {
                row: position.row,
                column: position.column,
            });
        }

        let id = entry.id().clone();
        self.board.take_tile(position, &id);
        self.players_positions.insert(id, position);
        Ok(())
    }

    /// Fresh board for the next round. Players stay seated.
    pub fn reset_board(&mut self) {
        self.board.initialize();
        self.players_positions.clear();
    }

    pub fn set_players_start_positions(&mut self) -> Result<(), GameError> {
        let mut rng = rand::rng();
        self.set_players_start_positions_with(&mut rng)
    }

    /// Seat every player on the start layout of a random anchor row.
    pub fn set_players_start_positions_with<R: Rng>(&mut self, rng: &mut R) -> Result<(), GameError> {
        let count = self.players.len();
        if count == 0 || count > MAX_PLAYERS {
            return Err(GameError::UnsupportedPlayersCount(count));
        }

        let anchors = eligible_anchors(&self.board, count);
        if anchors.is_empty() {
            let size = self.board.size();
            return Err(GameError::BoardTooSmall {
                rows: size.rows,
                columns: size.columns,
                players: count,
            });
        }

        let anchor = anchors[rng.random_range(0..anchors.len())];
        let layout = start_layout(&self.board, anchor);
        debug!("[Game] Start anchor row {} -> {:?}", anchor, &layout[..count]);

        for (index, position) in layout.into_iter().take(count).enumerate() {
            let id = self.players[index].id().clone();
            self.set_player_position(&id, position)?;
        }
        Ok(())
    }
}

/// Four start tiles derived from anchor row `anchor`: the two edges of that
/// row and of its mirror row.
pub fn start_layout(board: &Board, anchor: i32) -> [Position; 4] {
    let rows = board.size().rows as i32;
    let mirror = rows + 1 - anchor;
    [
        Position::new(anchor, 1),
        Position::new(mirror, board.last_column(mirror)),
        Position::new(mirror, 1),
        Position::new(anchor, board.last_column(anchor)),
    ]
}

/// Odd anchor rows whose first `count` start tiles are playable and distinct.
pub fn eligible_anchors(board: &Board, count: usize) -> Vec<i32> {
    let rows = board.size().rows as i32;
    (1..=rows)
        .step_by(2)
        .filter(|&anchor| {
            let layout = start_layout(board, anchor);
            let seats = &layout[..count.min(layout.len())];
            seats.iter().all(|position| board.check_position_validity(*position))
                && seats.iter().collect::<HashSet<_>>().len() == seats.len()
        })
        .collect()
}
