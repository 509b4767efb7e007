//! Inbound move delivery for human players.
//!
//! Each tick the player arms a one-shot slot; the transport fills it when the
//! client's move arrives. A slot is filled at most once, and writes that find
//! no armed slot (or a slot whose tick already timed out) are dropped.

use std::sync::{Arc, Mutex, PoisonError};

use log::debug;
use tokio::sync::oneshot;

use crate::game::systems::{Displacement, RelativeDisplacement};

#[derive(Debug, Clone, Default)]
pub struct MoveMailbox {
    slot: Arc<Mutex<Option<oneshot::Sender<Displacement>>>>,
}

impl MoveMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the slot for the current tick. Any stale slot is discarded.
    pub fn arm(&self) -> oneshot::Receiver<Displacement> {
        let (sender, receiver) = oneshot::channel();
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(sender);
        receiver
    }

    /// Deliver a move. Returns whether a waiting tick received it.
    pub fn resolve(&self, movement: Displacement) -> bool {
        let sender = self.slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        match sender {
            Some(sender) => {
                let delivered = sender.send(movement).is_ok();
                if !delivered {
                    debug!("[MoveMailbox] Dropped {:?}: tick already timed out", movement);
                }
                delivered
            }
            None => false,
        }
    }

}

/// Four keys of a shared keyboard, in order: light left, heavy left, light right, heavy right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    keys: [String; 4],
}

impl KeyBinding {
    /// `None` unless exactly four keys are given.
    pub fn from_keys(keys: &[String]) -> Option<Self> {
        let keys: [String; 4] = keys
            .iter()
            .map(|key| key.to_lowercase())
            .collect::<Vec<_>>()
            .try_into()
            .ok()?;
        Some(Self { keys })
    }

    pub fn turn_for(&self, key: &str) -> Option<RelativeDisplacement> {
        let key = key.to_lowercase();
        let index = self.keys.iter().position(|bound| *bound == key)?;
        Some(match index {
            0 => RelativeDisplacement::LightLeft,
            1 => RelativeDisplacement::HeavyLeft,
            2 => RelativeDisplacement::LightRight,
            _ => RelativeDisplacement::HeavyRight,
        })
    }
}

/// Transport-side handle on a human seat.
#[derive(Debug, Clone)]
pub struct PlayerInput {
    pub mailbox: MoveMailbox,
    pub keys: Option<KeyBinding>,
}

impl PlayerInput {
    pub fn submit(&self, movement: Displacement) -> bool {
        self.mailbox.resolve(movement)
    }

    /// Translate a key press through the binding. Unbound keys are ignored.
    pub fn press_key(&self, key: &str) -> bool {
        self.keys
            .as_ref()
            .and_then(|binding| binding.turn_for(key))
            .is_some_and(|turn| self.mailbox.resolve(Displacement::Relative(turn)))
    }

    pub fn is_bound_to(&self, key: &str) -> bool {
        self.keys.as_ref().is_some_and(|binding| binding.turn_for(key).is_some())
    }
}
