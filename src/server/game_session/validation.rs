//! Checks run on `start` before anything is built.

use std::collections::HashSet;

use crate::config::game::MAX_GRID_DIMENSION;
use crate::error::StartError;
use crate::game::ai::AiStrategy;
use crate::game::game_loop::MatchSettings;
use crate::game::types::GameType;

use super::messages::{StartRequest, UserRequest};

/// A `start` request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidStart {
    pub settings: MatchSettings,
    pub users: Vec<UserRequest>,
    pub ai_strategy: AiStrategy,
}

pub fn validate_start(request: StartRequest) -> Result<ValidStart, StartError> {
    let game_type = request
        .game_type
        .ok_or_else(|| invalid("gameType is required"))?;
    let rows = positive("rowNumber", request.row_number)?;
    let columns = positive("columnNumber", request.column_number)?;
    let rounds_count = positive("roundsCount", request.rounds_count)?;
    let players_count = positive("playersCount", request.players_count)?;

    if rows > MAX_GRID_DIMENSION || columns > MAX_GRID_DIMENSION {
        return Err(invalid(format!(
            "grid dimensions must not exceed {MAX_GRID_DIMENSION}, received {rows}x{columns}"
        )));
    }

    if request.users.is_empty() {
        return Err(invalid("users must not be empty"));
    }
    let mut seen = HashSet::new();
    for user in &request.users {
        if user.id.trim().is_empty() {
            return Err(invalid("every user needs an id"));
        }
        if !seen.insert(user.id.as_str()) {
            return Err(invalid(format!("user id {} appears twice", user.id)));
        }
    }

    // Values that do not even fit a type code are just as unsupported as 3.
    let game_type = GameType::try_from(u8::try_from(game_type).unwrap_or(u8::MAX))?;

    Ok(ValidStart {
        settings: MatchSettings {
            game_type,
            rows,
            columns,
            rounds_count: u32::try_from(rounds_count).map_err(|_| invalid("roundsCount is too large"))?,
            players_count,
        },
        users: request.users,
        ai_strategy: request.ai_strategy.unwrap_or_default(),
    })
}

fn positive(field: &str, value: Option<i64>) -> Result<usize, StartError> {
    let value = value.ok_or_else(|| invalid(format!("{field} is required")))?;
    if value <= 0 {
        return Err(invalid(format!("{field} must be positive, received {value}")));
    }
    usize::try_from(value).map_err(|_| invalid(format!("{field} is too large")))
}

fn invalid(message: impl Into<String>) -> StartError {
    StartError::InvalidInput(message.into())
}
