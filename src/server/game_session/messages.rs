use actix::prelude::*;
use serde::{Serialize, Deserialize};
use uuid::Uuid;

use crate::error::{SessionError, StartError};
use crate::game::ai::AiStrategy;
use crate::game::events::GameUpdate;
use crate::game::systems::{Displacement, RelativeDisplacement};
use crate::game::types::{PlayerId, PlayerInfo};

/// One human seat as described by the client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserRequest {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Four keys for a shared-keyboard player (local games only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,
}

/// Body of `start`. Every field is optional on the wire so that missing
/// values can be reported as input errors instead of parse errors.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub game_type: Option<i64>,
    pub row_number: Option<i64>,
    pub column_number: Option<i64>,
    pub rounds_count: Option<i64>,
    pub players_count: Option<i64>,
    #[serde(default)]
    pub users: Vec<UserRequest>,
    #[serde(default)]
    pub ai_strategy: Option<AiStrategy>,
}

/// A move as sent by a client: a full displacement or just a turn label.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum MoveInput {
    Displacement(Displacement),
    Turn(RelativeDisplacement),
}

impl From<MoveInput> for Displacement {
    fn from(input: MoveInput) -> Self {
        match input {
            MoveInput::Displacement(displacement) => displacement,
            MoveInput::Turn(turn) => Displacement::Relative(turn),
        }
    }
}

// Client -> server
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum ClientWsMessage {
    Start(StartRequest),
    #[serde(rename_all = "camelCase")]
    NextMove {
        #[serde(alias = "gameId")]
        match_id: Uuid,
        player_id: PlayerId,
        #[serde(rename = "move")]
        movement: MoveInput,
    },
    /// Attach this socket to a seat of a running match.
    #[serde(rename_all = "camelCase")]
    Join {
        #[serde(alias = "gameId")]
        match_id: Uuid,
        player_id: PlayerId,
    },
    #[serde(rename_all = "camelCase")]
    KeyPress { match_id: Uuid, key: String },
    #[serde(rename_all = "camelCase")]
    LeaveGame { player_id: PlayerId },
    #[serde(rename_all = "camelCase")]
    Disconnect {
        #[serde(alias = "gameId")]
        match_id: Uuid,
        player_id: PlayerId,
    },
    Ping,
}

// Server -> client
#[derive(Message, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[rtype(result = "()")]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum ServerWsMessage {
    #[serde(rename_all = "camelCase")]
    GameCreated { match_id: Uuid, players: Vec<PlayerInfo> },
    RefreshStatus(GameUpdate),
    Error {
        #[serde(rename = "type")]
        code: String,
        message: String,
    },
}

impl ServerWsMessage {
    pub fn game_created(created: MatchCreated) -> Self {
        Self::GameCreated {
            match_id: created.match_id,
            players: created.players,
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCreated {
    pub match_id: Uuid,
    /// Full roster, generated AI seats included.
    pub players: Vec<PlayerInfo>,
}

#[derive(Message)]
#[rtype(result = "Result<MatchCreated, StartError>")]
pub struct StartMatch {
    pub request: StartRequest,
    pub addr: Recipient<ServerWsMessage>,
}

/// Subscribes `addr` to a match on behalf of one of its human seats.
#[derive(Message)]
#[rtype(result = "Result<(), SessionError>")]
pub struct JoinMatch {
    pub match_id: Uuid,
    pub player_id: PlayerId,
    pub addr: Recipient<ServerWsMessage>,
}

/// Returns whether a pending tick took the move.
#[derive(Message)]
#[rtype(result = "Result<bool, SessionError>")]
pub struct SubmitMove {
    pub match_id: Uuid,
    pub player_id: PlayerId,
    pub movement: Displacement,
    pub addr: Recipient<ServerWsMessage>,
}

#[derive(Message)]
#[rtype(result = "Result<bool, SessionError>")]
pub struct PressKey {
    pub match_id: Uuid,
    pub key: String,
    pub addr: Recipient<ServerWsMessage>,
}

/// Returns whether the match is now empty.
#[derive(Message)]
#[rtype(result = "Result<bool, SessionError>")]
pub struct Disconnect {
    pub match_id: Uuid,
    pub player_id: PlayerId,
}

#[derive(Message)]
#[rtype(result = "Result<bool, SessionError>")]
pub struct LeaveGame {
    pub player_id: PlayerId,
}

/// Sent by a match's forwarder for every engine update.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RelayUpdate {
    pub match_id: Uuid,
    pub update: GameUpdate,
}

/// Sent once a match's update stream is closed.
#[derive(Message)]
#[rtype(result = "()")]
pub struct MatchFinished {
    pub match_id: Uuid,
}

#[derive(Message)]
#[rtype(result = "Vec<Uuid>")]
pub struct ListMatches;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn next_move_accepts_game_id_and_a_full_displacement() {
        let id = Uuid::new_v4();
        let message: ClientWsMessage = serde_json::from_value(json!({
            "action": "nextMove",
            "data": {"gameId": id, "playerId": "p1", "move": {"type": "relative", "value": "LIGHT_LEFT"}}
        }))
        .unwrap();
        assert_eq!(
            message,
            ClientWsMessage::NextMove {
                match_id: id,
                player_id: "p1".to_string(),
                movement: MoveInput::Displacement(Displacement::Relative(RelativeDisplacement::LightLeft)),
            }
        );
    }

    #[test]
    fn next_move_accepts_a_bare_turn_label() {
        let id = Uuid::new_v4();
        let message: ClientWsMessage = serde_json::from_value(json!({
            "action": "nextMove",
            "data": {"matchId": id, "playerId": "p1", "move": "HEAVY_RIGHT"}
        }))
        .unwrap();
        let ClientWsMessage::NextMove { movement, .. } = message else {
            panic!("expected nextMove");
        };
        assert_eq!(Displacement::from(movement), Displacement::Relative(RelativeDisplacement::HeavyRight));
    }

    #[test]
    fn start_keeps_missing_fields_as_none() {
        let message: ClientWsMessage = serde_json::from_value(json!({
            "action": "start",
            "data": {"gameType": 1, "rowNumber": 9, "users": [{"id": "p1", "name": "Alice"}]}
        }))
        .unwrap();
        let ClientWsMessage::Start(request) = message else {
            panic!("expected start");
        };
        assert_eq!(request.game_type, Some(1));
        assert_eq!(request.column_number, None);
        assert_eq!(request.users.len(), 1);
        assert_eq!(request.ai_strategy, None);
    }

    #[test]
    fn join_names_the_match_and_the_seat() {
        let id = Uuid::new_v4();
        let message: ClientWsMessage = serde_json::from_value(json!({
            "action": "join",
            "data": {"gameId": id, "playerId": "p2"}
        }))
        .unwrap();
        assert_eq!(
            message,
            ClientWsMessage::Join {
                match_id: id,
                player_id: "p2".to_string(),
            }
        );
    }

    #[test]
    fn ping_needs_no_data() {
        let message: ClientWsMessage = serde_json::from_value(json!({"action": "ping"})).unwrap();
        assert_eq!(message, ClientWsMessage::Ping);
    }

    #[test]
    fn error_uses_type_for_the_code() {
        let message = ServerWsMessage::error("INVALID_INPUT", "users must not be empty");
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({"action": "error", "data": {"type": "INVALID_INPUT", "message": "users must not be empty"}})
        );
    }
}
