/// Centralized helpers for WebSocket error payloads.
///
/// Registry errors carry their own code (see `StartError::code` and
/// `SessionError::code`); the constants below cover failures raised by the
/// socket itself.
use crate::server::game_session::messages::ServerWsMessage;

pub const INVALID_INPUT: &str = "INVALID_INPUT";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Formats a WebSocket error message as a JSON string:
/// `{"action":"error","data":{"type":code,"message":message}}`.
pub fn ws_error_message(code: &str, message: &str) -> String {
    serde_json::to_string(&ServerWsMessage::error(code, message)).unwrap_or_else(|_| {
        format!(r#"{{"action":"error","data":{{"type":"{}","message":"internal error"}}}}"#, INTERNAL_ERROR)
    })
}
