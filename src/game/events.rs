//! Updates pushed by the engine while a match runs.

use std::collections::HashMap;

use serde::{Serialize, Deserialize};

use crate::game::types::{PlayerId, Position};

/// How a round ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RoundResult {
    Winner { winner: PlayerId },
    Tie { ties: Vec<Vec<PlayerId>> },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    #[serde(flatten)]
    pub result: RoundResult,
    /// Zero-based round index.
    pub round: u32,
}

/// Payload of every `refreshStatus` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "camelCase")]
pub enum GameUpdate {
    NewPositions {
        #[serde(rename = "newPositions")]
        new_positions: HashMap<PlayerId, Position>,
    },
    RoundEnd(RoundReport),
    End { results: Vec<RoundResult> },
}
