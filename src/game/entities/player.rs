//! Player contract shared by humans and AIs.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::game::systems::Displacement;
use crate::game::types::{PlayerInfo, PlayerKind, Position};

/// Boxed future returned by player callbacks.
pub type PlayerFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Player handle shared between the game aggregate and the per-tick tasks.
pub type SharedPlayer = Arc<tokio::sync::Mutex<Box<dyn Player>>>;

/// What a player is told before each decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub player_position: Position,
    /// First other player still in the round, in roster order.
    pub opponent_position: Option<Position>,
    /// Every other player still in the round (includes `opponent_position`).
    pub other_positions: Vec<Position>,
}

impl PlayerState {
    pub fn new(player_position: Position, other_positions: Vec<Position>) -> Self {
        Self {
            player_position,
            opponent_position: other_positions.first().copied(),
            other_positions,
        }
    }
}

/// A seat in a match.
///
/// Both callbacks may take as long as they like: the engine races them against
/// its own timers and substitutes a default when they are late.
pub trait Player: Send {
    fn info(&self) -> &PlayerInfo;

    fn kind(&self) -> PlayerKind;

    /// Called once per round with the start positions.
    fn setup(&mut self, state: PlayerState) -> PlayerFuture<'_, ()>;

    /// Called once per tick.
    fn next_move(&mut self, state: PlayerState) -> PlayerFuture<'_, Displacement>;
}

pub fn share(player: Box<dyn Player>) -> SharedPlayer {
    Arc::new(tokio::sync::Mutex::new(player))
}
