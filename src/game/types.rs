use serde::{Serialize, Deserialize};

use crate::error::GameError;

/// Player identifier, as supplied by the client (or a UUID for AI seats).
pub type PlayerId = String;

/// A tile coordinate on the offset hexagonal grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub column: i32,
}

impl Position {
    pub fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// Even rows are staggered relative to odd rows.
    pub fn is_even_row(&self) -> bool {
        self.row.rem_euclid(2) == 0
    }
}

/// Playable dimensions of a board (walls excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSize {
    pub rows: usize,
    pub columns: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileStatus {
    Wall,
    Vacant,
    Taken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    status: TileStatus,
    taken_by: Option<PlayerId>,
}

impl Tile {
    pub fn new(status: TileStatus) -> Self {
        Self { status, taken_by: None }
    }

    pub fn status(&self) -> TileStatus {
        self.status
    }

    /// Owner of a taken tile. `None` for tiles marked without an owner (AI lookahead).
    pub fn taken_by(&self) -> Result<Option<&PlayerId>, GameError> {
        if self.status != TileStatus::Taken {
            return Err(GameError::TileNotTaken);
        }
        Ok(self.taken_by.as_ref())
    }

    pub fn set_status(&mut self, status: TileStatus) {
        self.status = status;
        if status != TileStatus::Taken {
            self.taken_by = None;
        }
    }

    pub fn take(&mut self, player_id: &PlayerId) {
        self.status = TileStatus::Taken;
        self.taken_by = Some(player_id.clone());
    }
}

/// Who drives a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    Local,
    Remote,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PlayerInfo {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameType {
    Local,
    Ai,
    Ranked,
}

impl TryFrom<u8> for GameType {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameType::Local),
            1 => Ok(GameType::Ai),
            2 => Ok(GameType::Ranked),
            other => Err(GameError::UnsupportedGameType(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taken_by_requires_taken_status() {
        let mut tile = Tile::new(TileStatus::Vacant);
        assert_eq!(tile.taken_by(), Err(GameError::TileNotTaken));

        tile.take(&"p1".to_string());
        assert_eq!(tile.taken_by(), Ok(Some(&"p1".to_string())));

        tile.set_status(TileStatus::Vacant);
        assert_eq!(tile.taken_by(), Err(GameError::TileNotTaken));
    }

    #[test]
    fn friendly_game_type_is_unsupported() {
        assert_eq!(GameType::try_from(1), Ok(GameType::Ai));
        assert_eq!(GameType::try_from(3), Err(GameError::UnsupportedGameType(3)));
    }
}
