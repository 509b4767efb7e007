use log::debug;

use crate::game::ai::AiStrategy;
use crate::game::types::{BoardSize, GameType, PlayerInfo};

use super::local::LocalPlayer;
use super::mailbox::{KeyBinding, MoveMailbox, PlayerInput};
use super::player::Player;
use super::remote::RemotePlayer;

/// Builds seats for a match.
pub struct PlayerFactory;

impl PlayerFactory {
    /// Human seat. Local games give keyboard players a `LocalPlayer`,
    /// everyone else plays through the socket.
    pub fn create(game_type: GameType, info: PlayerInfo, keys: Option<&[String]>) -> (Box<dyn Player>, PlayerInput) {
        let mailbox = MoveMailbox::new();
        let binding = match game_type {
            GameType::Local => keys.and_then(KeyBinding::from_keys),
            _ => None,
        };

        match binding {
            Some(binding) => {
                debug!("[PlayerFactory] Local player {} on keys {:?}", info.id, binding);
                let player = LocalPlayer::new(info, mailbox, binding);
                let input = player.input();
                (Box::new(player), input)
            }
            None => {
                let input = PlayerInput {
                    mailbox: mailbox.clone(),
                    keys: None,
                };
                (Box::new(RemotePlayer::new(info, mailbox)), input)
            }
        }
    }

    pub fn create_ai(strategy: AiStrategy, info: PlayerInfo, size: BoardSize) -> Box<dyn Player> {
        strategy.build(info, size)
    }
}
