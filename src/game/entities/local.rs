use crate::game::systems::Displacement;
use crate::game::types::{PlayerInfo, PlayerKind};

use super::mailbox::{KeyBinding, MoveMailbox, PlayerInput};
use super::player::{Player, PlayerFuture, PlayerState};
use super::remote::await_move;

/// A human sharing the keyboard of the hosting client.
pub struct LocalPlayer {
    info: PlayerInfo,
    input: PlayerInput,
}

impl LocalPlayer {
    pub fn new(info: PlayerInfo, mailbox: MoveMailbox, keys: KeyBinding) -> Self {
        Self {
            info,
            input: PlayerInput {
                mailbox,
                keys: Some(keys),
            },
        }
    }

    pub fn input(&self) -> PlayerInput {
        self.input.clone()
    }

    pub fn press_key(&self, key: &str) -> bool {
        self.input.press_key(key)
    }
}

impl Player for LocalPlayer {
    fn info(&self) -> &PlayerInfo {
        &self.info
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Local
    }

    fn setup(&mut self, _state: PlayerState) -> PlayerFuture<'_, ()> {
        Box::pin(async {})
    }

    fn next_move(&mut self, _state: PlayerState) -> PlayerFuture<'_, Displacement> {
        await_move(&self.input.mailbox)
    }
}
