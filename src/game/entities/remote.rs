use crate::game::systems::Displacement;
use crate::game::types::{PlayerInfo, PlayerKind};

use super::mailbox::MoveMailbox;
use super::player::{Player, PlayerFuture, PlayerState};

/// Wait for the armed slot. A slot dropped without a move behaves like
/// silence: the engine's timer decides.
pub(crate) fn await_move(mailbox: &MoveMailbox) -> PlayerFuture<'static, Displacement> {
    let receiver = mailbox.arm();
    Box::pin(async move {
        match receiver.await {
            Ok(movement) => movement,
            Err(_) => std::future::pending().await,
        }
    })
}

/// A human on the other end of a socket.
pub struct RemotePlayer {
    info: PlayerInfo,
    mailbox: MoveMailbox,
}

impl RemotePlayer {
    pub fn new(info: PlayerInfo, mailbox: MoveMailbox) -> Self {
        Self { info, mailbox }
    }
}

impl Player for RemotePlayer {
    fn info(&self) -> &PlayerInfo {
        &self.info
    }

    fn kind(&self) -> PlayerKind {
        PlayerKind::Remote
    }

    fn setup(&mut self, _state: PlayerState) -> PlayerFuture<'_, ()> {
        Box::pin(async {})
    }

    fn next_move(&mut self, _state: PlayerState) -> PlayerFuture<'_, Displacement> {
        await_move(&self.mailbox)
    }
}
